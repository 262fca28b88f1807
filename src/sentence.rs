use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tokenizer::tokenize;
use crate::word::WordIndex;
use crate::DictionaryType;

/// An example sentence and its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    pub sentence: String,
    pub translation: String,
}

#[derive(Debug, Clone)]
struct SentenceEntry {
    simplified: String,
    traditional: String,
    translation: String,
}

/// Example sentences indexed by the words they contain.
///
/// Two row shapes are accepted:
///
/// | Fields | Meaning |
/// |---|---|
/// | `word<TAB>sentence<TAB>translation` | the sentence is filed under `word` |
/// | `id<TAB>sentence<TAB>id<TAB>translation` | Tatoeba export; the sentence is tokenized and filed under every token |
///
/// Sentences are rendered in either script by mapping each token to the
/// first dictionary entry for it.
#[derive(Debug, Clone, Default)]
pub struct SentenceTable {
    entries: Vec<SentenceEntry>,
    simplified: HashMap<String, Vec<usize>>,
    traditional: HashMap<String, Vec<usize>>,
}

impl SentenceTable {
    pub fn new(data: &str, words: &WordIndex) -> Self {
        let mut table = SentenceTable::default();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut skipped = 0usize;

        for line in data.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let (sentence, translation, headword) = match fields.as_slice() {
                [word, sentence, translation] => (*sentence, *translation, Some(word.trim())),
                [_, sentence, _, translation] => (*sentence, *translation, None),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }

            // A headword row may repeat a known sentence under another word;
            // a repeated Tatoeba row adds nothing.
            match (headword, seen.get(sentence).copied()) {
                (Some(word), Some(id)) => {
                    let (simplified, traditional) = script_forms(words, word);
                    table.file(id, simplified, traditional);
                }
                (None, Some(_)) => {}
                (Some(word), None) => {
                    seen.insert(sentence, table.entries.len());
                    table.push_with_headword(words, word, sentence, translation.trim());
                }
                (None, None) => {
                    seen.insert(sentence, table.entries.len());
                    table.push_tokenized(words, sentence, translation.trim());
                }
            }
        }

        if skipped > 0 {
            debug!(skipped, "skipped malformed sentence lines");
        }
        table
    }

    fn push_with_headword(&mut self, words: &WordIndex, word: &str, sentence: &str, translation: &str) {
        let id = self.entries.len();
        self.entries.push(SentenceEntry {
            simplified: sentence.to_owned(),
            traditional: sentence.to_owned(),
            translation: translation.to_owned(),
        });
        let (simplified, traditional) = script_forms(words, word);
        self.file(id, simplified, traditional);
    }

    fn push_tokenized(&mut self, words: &WordIndex, sentence: &str, translation: &str) {
        let id = self.entries.len();
        let mut entry = SentenceEntry {
            simplified: String::with_capacity(sentence.len()),
            traditional: String::with_capacity(sentence.len()),
            translation: translation.to_owned(),
        };
        let mut forms = Vec::new();

        for token in tokenize(words, sentence) {
            let (simplified, traditional) = script_forms(words, &token.value);
            entry.simplified.push_str(simplified);
            entry.traditional.push_str(traditional);
            if token.has_entries {
                forms.push((simplified.to_owned(), traditional.to_owned()));
            }
        }

        self.entries.push(entry);
        for (simplified, traditional) in &forms {
            self.file(id, simplified, traditional);
        }
    }

    fn file(&mut self, id: usize, simplified: &str, traditional: &str) {
        for (map, key) in [
            (&mut self.simplified, simplified),
            (&mut self.traditional, traditional),
        ] {
            let ids = map.entry(key.to_owned()).or_default();
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sentences filed under `word`, in source order, rendered in `ty`.
    pub fn iter_sentences_including_word<'a>(
        &'a self,
        word: &str,
        ty: DictionaryType,
    ) -> impl Iterator<Item = SentencePair> + 'a {
        let map = match ty {
            DictionaryType::Simplified => &self.simplified,
            DictionaryType::Traditional => &self.traditional,
        };
        map.get(word)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&id| {
                let entry = &self.entries[id];
                SentencePair {
                    sentence: match ty {
                        DictionaryType::Simplified => entry.simplified.clone(),
                        DictionaryType::Traditional => entry.traditional.clone(),
                    },
                    translation: entry.translation.clone(),
                }
            })
    }
}

/// Simplified and traditional forms of `word` from its first dictionary entry,
/// looking it up as traditional first. Unknown words map to themselves.
fn script_forms<'a>(words: &'a WordIndex, word: &'a str) -> (&'a str, &'a str) {
    let ids = match words.ids(word, DictionaryType::Traditional) {
        [] => words.ids(word, DictionaryType::Simplified),
        ids => ids,
    };
    match ids.first() {
        Some(&id) => {
            let entry = words.entry(id);
            (&entry.simplified, &entry.traditional)
        }
        None => (word, word),
    }
}
