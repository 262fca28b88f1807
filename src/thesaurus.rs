use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::word::{WordEntry, WordIndex};
use crate::{DictionaryType, PARALLEL_THRESHOLD};

/// Weight of shared characters relative to shared gloss keywords.
const CHARACTER_OVERLAP_WEIGHT: f32 = 0.25;

/// A related word and its similarity score (higher is closer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarWord {
    pub word: String,
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
struct ScriptThesaurus {
    /// Surface forms in the order they first appear in the dictionary.
    surfaces: Vec<String>,
    keywords: Vec<HashSet<String>>,
    by_surface: HashMap<String, usize>,
    by_keyword: HashMap<String, Vec<usize>>,
}

impl ScriptThesaurus {
    fn insert(&mut self, surface: &str, keywords: &HashSet<String>) {
        let slot = match self.by_surface.get(surface) {
            Some(&slot) => slot,
            None => {
                let slot = self.surfaces.len();
                self.surfaces.push(surface.to_owned());
                self.keywords.push(HashSet::new());
                self.by_surface.insert(surface.to_owned(), slot);
                slot
            }
        };
        for keyword in keywords {
            if self.keywords[slot].insert(keyword.clone()) {
                self.by_keyword.entry(keyword.clone()).or_default().push(slot);
            }
        }
    }
}

/// English gloss keywords per surface form, used to rank similar words.
///
/// Proper nouns (capitalised pinyin) are left out, as are senses that only
/// point at another word ("variant of", "see ...") or name a classifier.
#[derive(Debug, Clone, Default)]
pub struct Thesaurus {
    simplified: ScriptThesaurus,
    traditional: ScriptThesaurus,
}

impl Thesaurus {
    pub fn new(words: &WordIndex) -> Self {
        let entries: Vec<&WordEntry> = words
            .iter()
            .filter(|entry| {
                entry
                    .pinyin
                    .chars()
                    .next()
                    .is_some_and(|ch| !ch.is_ascii_uppercase())
            })
            .collect();

        let keywords: Vec<HashSet<String>> = if entries.len() >= PARALLEL_THRESHOLD {
            entries
                .par_iter()
                .map(|entry| extract_keywords(&entry.english))
                .collect()
        } else {
            entries
                .iter()
                .map(|entry| extract_keywords(&entry.english))
                .collect()
        };

        let mut thesaurus = Thesaurus::default();
        for (entry, keywords) in entries.iter().zip(&keywords) {
            if keywords.is_empty() {
                continue;
            }
            thesaurus.simplified.insert(&entry.simplified, keywords);
            thesaurus.traditional.insert(&entry.traditional, keywords);
        }
        thesaurus
    }

    fn script(&self, ty: DictionaryType) -> &ScriptThesaurus {
        match ty {
            DictionaryType::Simplified => &self.simplified,
            DictionaryType::Traditional => &self.traditional,
        }
    }

    /// Words sharing at least one keyword with `word`, best first.
    ///
    /// Score is the Jaccard index of the keyword sets plus a quarter of the
    /// character overlap (shared distinct characters over the longer word).
    /// The sort is stable, so equal scores keep dictionary order.
    pub fn similar_words(&self, word: &str, limit: usize, ty: DictionaryType) -> Vec<SimilarWord> {
        let script = self.script(ty);
        let Some(&slot) = script.by_surface.get(word) else {
            return Vec::new();
        };
        let keywords = &script.keywords[slot];

        let mut candidates: Vec<usize> = keywords
            .iter()
            .filter_map(|keyword| script.by_keyword.get(keyword))
            .flatten()
            .copied()
            .filter(|&other| other != slot)
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let word_chars: HashSet<char> = word.chars().collect();
        let word_len = word.chars().count();

        let mut ranked: Vec<SimilarWord> = candidates
            .into_iter()
            .map(|other| {
                let surface = &script.surfaces[other];
                let other_keywords = &script.keywords[other];
                let shared = keywords.intersection(other_keywords).count();
                let union = keywords.len() + other_keywords.len() - shared;
                let jaccard = shared as f32 / union as f32;

                let shared_chars = surface
                    .chars()
                    .collect::<HashSet<_>>()
                    .intersection(&word_chars)
                    .count();
                let longest = word_len.max(surface.chars().count());
                let overlap = shared_chars as f32 / longest as f32;

                SimilarWord {
                    word: surface.clone(),
                    score: jaccard + CHARACTER_OVERLAP_WEIGHT * overlap,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }
}

/// Content words of a `/`-delimited CC-CEDICT gloss.
///
/// Words of fewer than three bytes, a few stop words and anything inside
/// parentheses or brackets are dropped.
pub fn extract_keywords(gloss: &str) -> HashSet<String> {
    let mut keywords = HashSet::new();

    for sense in gloss.split('/') {
        if sense.contains("classifier for") || sense.contains("surname ") || sense.contains("CL:") {
            continue;
        }
        if [
            "variant of",
            "abbr. for",
            "also written",
            "also called",
            "also named",
            "also pr.",
        ]
        .iter()
        .any(|marker| sense.contains(marker))
            || sense.starts_with("see ")
        {
            continue;
        }

        let cleaned = sense.replace(
            |ch: char| ch.is_ascii_punctuation() && !matches!(ch, '(' | ')' | '[' | ']'),
            " ",
        );
        let mut in_parentheses = false;
        let mut in_brackets = false;

        for word in cleaned.split_ascii_whitespace() {
            if word.len() < 3 || matches!(word, "the" | "are" | "sth") {
                continue;
            }
            if (word.starts_with('(') && word.ends_with(')'))
                || (word.starts_with('[') && word.ends_with(']'))
            {
                continue;
            }
            if word.starts_with('(') {
                in_parentheses = true;
            } else if word.starts_with('[') {
                in_brackets = true;
            } else if word.ends_with(')') {
                in_parentheses = false;
                continue;
            } else if word.ends_with(']') {
                in_brackets = false;
                continue;
            }
            if !in_parentheses && !in_brackets {
                keywords.insert(word.to_owned());
            }
        }
    }
    keywords
}
