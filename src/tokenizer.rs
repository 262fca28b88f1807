use std::ops::Range;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug_span;
use unicode_segmentation::UnicodeSegmentation;

use crate::word::{grapheme_bounds, WordIndex};
use crate::PARALLEL_THRESHOLD;

/// Punctuation that is emitted one grapheme per token, like a Han character.
pub const CHINESE_PUNCTUATION: &[char] = &[
    '·', '×', '—', '‘', '’', '“', '”', '…', '、', '。', '《', '》', '『', '』', '【', '】', '！',
    '（', '）', '，', '：', '；', '？', '「', '」', '〈', '〉', '～', '．', '－',
];

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    /// Grapheme index of the first grapheme of `value` in the input.
    pub offset: usize,
    #[serde(rename = "hasEntries")]
    pub has_entries: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphemeClass {
    Whitespace,
    Han,
    CjkPunctuation,
    /// Latin letters, digits, ASCII punctuation and anything else.
    Other,
}

/// Classify a grapheme cluster by its first scalar value.
pub fn classify(grapheme: &str) -> GraphemeClass {
    let Some(ch) = grapheme.chars().next() else {
        return GraphemeClass::Other;
    };
    if ch.is_whitespace() {
        GraphemeClass::Whitespace
    } else if is_han(ch) {
        GraphemeClass::Han
    } else if is_cjk_punctuation(ch) {
        GraphemeClass::CjkPunctuation
    } else {
        GraphemeClass::Other
    }
}

pub fn is_han(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'     // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}'   // Extension A
        | '\u{20000}'..='\u{2EBEF}' // Extensions B-F
        | '\u{30000}'..='\u{3134F}' // Extension G
        | '\u{F900}'..='\u{FAFF}'   // Compatibility Ideographs
        | '\u{2F800}'..='\u{2FA1F}' // Compatibility Supplement
        | '\u{2E80}'..='\u{2FDF}'   // Radicals
        | '\u{3005}' | '\u{3007}'
    )
}

fn is_cjk_punctuation(ch: char) -> bool {
    CHINESE_PUNCTUATION.contains(&ch)
        || matches!(ch, '\u{3000}'..='\u{303F}' | '\u{FE10}'..='\u{FE1F}' | '\u{FE30}'..='\u{FE4F}')
        || (matches!(ch, '\u{FF00}'..='\u{FFEF}') && !ch.is_alphanumeric())
}

/// Segment `input` into tokens by greedy longest dictionary match.
///
/// Han text takes the longest key (simplified or traditional) starting at the
/// current grapheme, scanning up to the next whitespace; unknown Han graphemes
/// become single-grapheme tokens. Whitespace runs and other non-Han runs are
/// single tokens. Concatenating the token values gives back `input`.
pub fn tokenize(words: &WordIndex, input: &str) -> Vec<Token> {
    let _span = debug_span!("tokenize", bytes = input.len()).entered();

    if input.len() < PARALLEL_THRESHOLD {
        return tokenize_chunk(words, input, 0);
    }

    let ranges = split_chunk_ranges(input);
    let mut chunks = Vec::with_capacity(ranges.len());
    let mut offset = 0;
    for range in ranges {
        let chunk = &input[range];
        chunks.push((chunk, offset));
        offset += chunk.graphemes(true).count();
    }

    chunks
        .into_par_iter()
        .map(|(chunk, offset)| tokenize_chunk(words, chunk, offset))
        .collect::<Vec<_>>()
        .concat()
}

fn tokenize_chunk(words: &WordIndex, text: &str, base_offset: usize) -> Vec<Token> {
    let bounds = grapheme_bounds(text);
    let n = bounds.len() - 1;
    let classes: Vec<GraphemeClass> = (0..n)
        .map(|i| classify(&text[bounds[i]..bounds[i + 1]]))
        .collect();
    let max_len = words.max_key_len() as usize;

    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < n {
        let class = classes[pos];
        let (len, has_entries) = match class {
            GraphemeClass::Han => {
                let mut limit = pos;
                while limit < n && limit - pos < max_len && classes[limit] != GraphemeClass::Whitespace {
                    limit += 1;
                }
                match words.longest_match(text, &bounds, pos, limit) {
                    Some(len) => (len, true),
                    None => (1, false),
                }
            }
            GraphemeClass::CjkPunctuation => {
                (1, words.contains(&text[bounds[pos]..bounds[pos + 1]]))
            }
            GraphemeClass::Whitespace | GraphemeClass::Other => {
                let mut end = pos + 1;
                while end < n && classes[end] == class {
                    end += 1;
                }
                (end - pos, words.contains(&text[bounds[pos]..bounds[end]]))
            }
        };

        tokens.push(Token {
            value: text[bounds[pos]..bounds[pos + len]].to_owned(),
            offset: base_offset + pos,
            has_entries,
        });
        pos += len;
    }
    tokens
}

/// Byte ranges of independently tokenizable chunks: each chunk ends with the
/// whitespace run that follows its text. No dictionary match crosses
/// whitespace, so tokenizing the chunks one by one gives the same tokens as
/// tokenizing the whole input.
pub fn split_chunk_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut prev_whitespace = false;

    for (i, grapheme) in text.grapheme_indices(true) {
        let whitespace = classify(grapheme) == GraphemeClass::Whitespace;
        if prev_whitespace && !whitespace && i > start {
            ranges.push(start..i);
            start = i;
        }
        prev_whitespace = whitespace;
    }
    if start < text.len() {
        ranges.push(start..text.len());
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_graphemes() {
        assert_eq!(classify("中"), GraphemeClass::Han);
        assert_eq!(classify("𠀀"), GraphemeClass::Han);
        assert_eq!(classify("。"), GraphemeClass::CjkPunctuation);
        assert_eq!(classify("，"), GraphemeClass::CjkPunctuation);
        assert_eq!(classify("\u{3000}"), GraphemeClass::Whitespace);
        assert_eq!(classify("\r\n"), GraphemeClass::Whitespace);
        assert_eq!(classify("Ａ"), GraphemeClass::Other);
        assert_eq!(classify("!"), GraphemeClass::Other);
    }

    #[test]
    fn chunk_ranges_end_after_whitespace() {
        assert_eq!(split_chunk_ranges("你好 世界"), vec![0..7, 7..13]);
        assert_eq!(split_chunk_ranges("  a\n\nb"), vec![0..2, 2..5, 5..6]);
        assert_eq!(split_chunk_ranges("abc"), vec![0..3]);
        assert!(split_chunk_ranges("").is_empty());
    }
}
