use std::collections::{HashMap, HashSet};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frequency {
    count: f64,
    rank: u32,
}

/// Word frequency table.
///
/// Lines are `word count ...`: the first field is the word, the second a count.
/// SUBTLEX-CH word lists fit this shape (their header lines are skipped because
/// the second field is not numeric).
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    data: HashMap<String, Frequency>,
    max_log_count: f64,
}

impl FrequencyTable {
    pub fn new(data: &str) -> Self {
        let mut counts: Vec<(String, f64)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut skipped = 0usize;

        for line in data.lines() {
            let mut fields = line.split_whitespace();
            let (Some(word), Some(count)) = (fields.next(), fields.next()) else {
                continue;
            };
            match count.replace(',', "").parse::<f64>() {
                // A repeated word keeps its first count.
                Ok(count) if count.is_finite() && count >= 0.0 => {
                    if seen.insert(word.to_owned()) {
                        counts.push((word.to_owned(), count));
                    }
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "skipped non-numeric frequency lines");
        }

        // Rank by descending count; equal counts keep file order.
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|&a, &b| counts[b].1.total_cmp(&counts[a].1));

        let mut table = FrequencyTable {
            data: HashMap::with_capacity(counts.len()),
            max_log_count: 0.0,
        };
        for (position, id) in order.into_iter().enumerate() {
            let (word, count) = &counts[id];
            table.max_log_count = table.max_log_count.max(log_count(*count));
            table.data.insert(
                word.clone(),
                Frequency {
                    count: *count,
                    rank: position as u32 + 1,
                },
            );
        }
        table
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 1-based rank, 1 being the most frequent word.
    pub fn rank(&self, word: &str) -> Option<u32> {
        self.data.get(word).map(|f| f.rank)
    }

    pub fn count(&self, word: &str) -> Option<f64> {
        self.data.get(word).map(|f| f.count)
    }

    /// Display score in `0..=100` on a log scale. Words missing from the table
    /// fall back to their rarest known character; 0 when nothing is known.
    pub fn score(&self, word: &str) -> u8 {
        if self.max_log_count <= 0.0 {
            return 0;
        }
        self.count(word)
            .or_else(|| {
                let mut buf = [0u8; 4];
                word.chars()
                    .filter_map(|ch| self.count(ch.encode_utf8(&mut buf)))
                    .min_by(|x, y| x.total_cmp(y))
            })
            .map(|count| log_count(count) / self.max_log_count * 100.0)
            .map(|x| x.clamp(0.0, 100.0) as u8)
            .unwrap_or(0)
    }
}

#[inline]
fn log_count(count: f64) -> f64 {
    (count + 1.0).log10()
}
