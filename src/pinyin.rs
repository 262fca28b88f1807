//! Reading normalisation for raw CC-CEDICT pinyin.
//!
//! Raw readings look like `ni3 hao3`, `lu:4`, `nv3` or `Zhong1 guo2`. Two
//! readings are homophones when they agree syllable by syllable after
//! normalisation: lowercase, `u:` / `v` / `ü` unified, a missing tone number
//! treated as neutral tone `5`.

/// Normalise a raw reading into a comparison key.
///
/// ```rust
/// use zilin_rs::pinyin::normalize_reading;
///
/// assert_eq!(normalize_reading("Lu:4 shi1"), "lü4 shi1");
/// assert_eq!(normalize_reading("nv3  ren2"), "nü3 ren2");
/// assert_eq!(normalize_reading("ma"), "ma5");
/// ```
pub fn normalize_reading(pinyin: &str) -> String {
    let mut out = String::with_capacity(pinyin.len());
    for syllable in pinyin.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        push_syllable(&mut out, syllable);
    }
    out
}

fn push_syllable(out: &mut String, syllable: &str) {
    let lower = syllable.to_lowercase();
    let mut chars = lower.chars().peekable();
    let mut last = None;
    while let Some(ch) = chars.next() {
        let mapped = match ch {
            'u' if chars.peek() == Some(&':') => {
                chars.next();
                'ü'
            }
            'v' => 'ü',
            other => other,
        };
        out.push(mapped);
        last = Some(mapped);
    }
    // Syllables made only of symbols (e.g. "," or "·" in names) carry no tone.
    if let Some(last) = last {
        if last.is_alphabetic() {
            out.push('5');
        }
    }
}
