use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::dictionary_lib::DictMap;
use crate::error::{CorpusError, Result};
use crate::pinyin::normalize_reading;
use crate::DictionaryType;

static CEDICT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\s+(\S+)\s+\[([^\]]*)\]\s+/(.*)/\s*$").unwrap());

/// One CC-CEDICT sense line.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub traditional: String,
    pub simplified: String,
    pub pinyin: String,
    pub english: String,
}

impl WordEntry {
    /// The headword in the requested script.
    #[inline]
    pub fn word(&self, ty: DictionaryType) -> &str {
        match ty {
            DictionaryType::Simplified => &self.simplified,
            DictionaryType::Traditional => &self.traditional,
        }
    }
}

/// Parse `Traditional Simplified [pin1 yin1] /gloss/gloss/`.
///
/// Returns `None` for comments, blank lines, stray formatting and entries whose
/// headwords are plain ASCII.
pub fn parse_cedict_line(line: &str) -> Option<WordEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let caps = CEDICT_LINE.captures(line)?;
    let (traditional, simplified) = (&caps[1], &caps[2]);
    if traditional.is_ascii() || simplified.is_ascii() {
        return None;
    }
    Some(WordEntry {
        traditional: traditional.to_owned(),
        simplified: simplified.to_owned(),
        pinyin: caps[3].trim().to_owned(),
        english: caps[4].to_owned(),
    })
}

#[inline]
pub(crate) fn grapheme_len(s: &str) -> u16 {
    s.graphemes(true).count().min(u16::MAX as usize) as u16
}

/// Word Index: every dictionary entry, reachable by simplified and by
/// traditional headword.
///
/// Entries live once in `entries` in corpus order; the two [`DictMap`]s hold
/// ids into it, so a lookup returns entries in insertion order.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    entries: Vec<WordEntry>,
    simplified: DictMap,
    traditional: DictMap,
    readings: HashMap<String, Vec<usize>>,
}

impl WordIndex {
    /// Build the index from CC-CEDICT text. Malformed lines are skipped; the
    /// text as a whole must contain at least one entry.
    pub fn from_cedict(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Err(CorpusError::EmptyCorpus("cedict"));
        }

        let mut index = WordIndex {
            entries: Vec::with_capacity(131_072),
            simplified: DictMap::with_capacity(131_072),
            traditional: DictMap::with_capacity(131_072),
            readings: HashMap::new(),
        };
        let mut skipped = 0usize;

        for line in data.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_cedict_line(trimmed) {
                Some(entry) => index.push(entry),
                None => skipped += 1,
            }
        }

        if index.entries.is_empty() {
            return Err(CorpusError::NoEntries("cedict"));
        }
        if skipped > 0 {
            debug!(skipped, "skipped malformed cedict lines");
        }
        Ok(index)
    }

    fn push(&mut self, entry: WordEntry) {
        let id = self.entries.len();
        self.simplified
            .push_with_len(&entry.simplified, id, grapheme_len(&entry.simplified));
        self.traditional
            .push_with_len(&entry.traditional, id, grapheme_len(&entry.traditional));
        self.readings
            .entry(normalize_reading(&entry.pinyin))
            .or_default()
            .push(id);
        self.entries.push(entry);
    }

    fn map(&self, ty: DictionaryType) -> &DictMap {
        match ty {
            DictionaryType::Simplified => &self.simplified,
            DictionaryType::Traditional => &self.traditional,
        }
    }

    /// Number of entries (senses) in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact headword lookup in corpus order; empty when absent.
    pub fn lookup(&self, word: &str, ty: DictionaryType) -> Vec<&WordEntry> {
        self.map(ty).get(word).iter().map(|&id| &self.entries[id]).collect()
    }

    /// Ids of the entries for `word`, in corpus order.
    pub(crate) fn ids(&self, word: &str, ty: DictionaryType) -> &[usize] {
        self.map(ty).get(word)
    }

    pub(crate) fn entry(&self, id: usize) -> &WordEntry {
        &self.entries[id]
    }

    /// Whether `word` is a simplified or traditional headword.
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.simplified.contains_key(word) || self.traditional.contains_key(word)
    }

    /// Every entry once, in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = &WordEntry> {
        self.entries.iter()
    }

    /// Ids of entries whose normalised reading equals `reading`.
    pub(crate) fn ids_with_reading(&self, reading: &str) -> &[usize] {
        self.readings.get(reading).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Longest key length (in graphemes) across both scripts.
    #[inline]
    pub fn max_key_len(&self) -> u16 {
        self.simplified.max_len.max(self.traditional.max_len)
    }

    #[inline]
    fn has_key_len(&self, n: u16) -> bool {
        self.simplified.has_key_len(n) || self.traditional.has_key_len(n)
    }

    /// Longest dictionary key matching `text` at grapheme `start_offset`.
    ///
    /// Returns all simplified and traditional entries for that span and its
    /// length in graphemes, or `(vec![], 0)` when no key starts there.
    ///
    /// Convenience wrapper for single lookups: it walks `text` up to
    /// `start_offset` on every call. The tokenizer segments a whole input once
    /// and matches against precomputed boundaries instead.
    pub fn longest_prefix_entries(&self, text: &str, start_offset: usize) -> (Vec<&WordEntry>, usize) {
        let Some((start, _)) = text.grapheme_indices(true).nth(start_offset) else {
            return (Vec::new(), 0);
        };
        let rest = &text[start..];
        let window = self.max_key_len() as usize;
        let mut bounds: Vec<usize> = rest
            .grapheme_indices(true)
            .map(|(i, _)| i)
            .take(window + 1)
            .collect();
        if bounds.len() <= window {
            bounds.push(rest.len());
        }
        let end = bounds.len() - 1;
        match self.longest_match(rest, &bounds, 0, end) {
            Some(len) => (self.entries_for_span(&rest[..bounds[len]]), len),
            None => (Vec::new(), 0),
        }
    }

    /// Simplified matches first, then traditional matches not already listed.
    fn entries_for_span(&self, span: &str) -> Vec<&WordEntry> {
        let simplified = self.simplified.get(span);
        let mut ids = simplified.to_vec();
        ids.extend(
            self.traditional
                .get(span)
                .iter()
                .copied()
                .filter(|id| !simplified.contains(id)),
        );
        ids.into_iter().map(|id| &self.entries[id]).collect()
    }

    /// Longest key length `len` such that `text[bounds[pos]..bounds[pos + len]]`
    /// is a key, with `pos + len <= limit`. Only lengths present in either map
    /// are probed.
    pub(crate) fn longest_match(
        &self,
        text: &str,
        bounds: &[usize],
        pos: usize,
        limit: usize,
    ) -> Option<usize> {
        let available = limit.saturating_sub(pos);
        let longest = available.min(self.max_key_len() as usize);
        (1..=longest).rev().find(|&len| {
            self.has_key_len(len as u16) && self.contains(&text[bounds[pos]..bounds[pos + len]])
        })
    }

    /// Entries whose headword in `ty` contains `slice` as a contiguous
    /// substring, excluding `slice` itself, in corpus order.
    pub fn iter_including_subslice<'a>(
        &'a self,
        slice: &'a str,
        ty: DictionaryType,
    ) -> impl Iterator<Item = &'a WordEntry> + 'a {
        self.entries.iter().filter(move |entry| {
            let word = entry.word(ty);
            !slice.is_empty() && word != slice && word.contains(slice)
        })
    }
}

/// Byte offsets of every grapheme boundary in `text`, including `text.len()`.
pub(crate) fn grapheme_bounds(text: &str) -> Vec<usize> {
    let mut bounds: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
    bounds.push(text.len());
    bounds
}
