//! Chinese dictionary and dictionary-driven tokenizer.
//!
//! [`Zilin`] owns every index built from a [`Corpus`]: CC-CEDICT words,
//! character decompositions, word frequencies, example sentences and a gloss
//! thesaurus. Loading is the only fallible step; every query afterwards is
//! read-only and returns an empty result when nothing matches.
//!
//! ```no_run
//! use zilin_rs::{DictionaryType, Zilin};
//!
//! let zilin = Zilin::from_dir("data").unwrap();
//! for token in zilin.tokenize("你好吗？") {
//!     println!("{} {}", token.value, token.has_entries);
//! }
//! let entries = zilin.get_word("你好", DictionaryType::Simplified);
//! ```

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug_span, info};

pub mod character;
pub mod command;
pub mod dictionary_lib;
pub mod dictionary_type;
pub mod error;
pub mod frequency;
pub mod pinyin;
pub mod sentence;
pub mod thesaurus;
pub mod tokenizer;
pub mod word;

pub use character::{CharacterDecomposition, CharacterEntry, CharacterIndex};
pub use command::{Request, Response};
pub use dictionary_lib::{Corpus, CorpusPaths};
pub use dictionary_type::DictionaryType;
pub use error::{CorpusError, Result};
pub use frequency::FrequencyTable;
pub use sentence::{SentencePair, SentenceTable};
pub use thesaurus::{SimilarWord, Thesaurus};
pub use tokenizer::Token;
pub use word::{WordEntry, WordIndex};

use pinyin::normalize_reading;

/// Inputs (in bytes) and index sizes from which work is spread over rayon.
pub const PARALLEL_THRESHOLD: usize = 500;

pub struct Zilin {
    words: WordIndex,
    characters: CharacterIndex,
    frequencies: FrequencyTable,
    sentences: SentenceTable,
    thesaurus: Thesaurus,
}

impl Zilin {
    /// Build every index from raw corpus texts.
    pub fn load(corpus: &Corpus) -> Result<Self> {
        Self::from_texts(
            &corpus.cedict,
            &corpus.decomposition,
            corpus.frequency.as_deref(),
            corpus.sentences.as_deref(),
        )
    }

    /// Like [`Zilin::load`], for texts that are not held in a [`Corpus`].
    pub fn from_texts(
        cedict: &str,
        decomposition: &str,
        frequency: Option<&str>,
        sentences: Option<&str>,
    ) -> Result<Self> {
        let words = {
            let _span = debug_span!("load_words").entered();
            WordIndex::from_cedict(cedict)?
        };
        let characters = {
            let _span = debug_span!("load_characters").entered();
            CharacterIndex::from_text(decomposition)
        };
        let frequencies = frequency.map(FrequencyTable::new).unwrap_or_default();
        let sentences = {
            let _span = debug_span!("load_sentences").entered();
            sentences
                .map(|data| SentenceTable::new(data, &words))
                .unwrap_or_default()
        };
        let thesaurus = {
            let _span = debug_span!("load_thesaurus").entered();
            Thesaurus::new(&words)
        };

        info!(
            words = words.len(),
            characters = characters.len(),
            frequencies = frequencies.len(),
            sentences = sentences.len(),
            "corpus loaded"
        );

        Ok(Zilin {
            words,
            characters,
            frequencies,
            sentences,
            thesaurus,
        })
    }

    /// Load from a data directory laid out as described by [`CorpusPaths::from_dir`].
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(&Corpus::from_dir(dir)?)
    }

    /// Load from a bundle written by [`Corpus::save_compressed`].
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(&Corpus::from_bundle(path)?)
    }

    pub fn words(&self) -> &WordIndex {
        &self.words
    }

    pub fn characters(&self) -> &CharacterIndex {
        &self.characters
    }

    /// Split `text` into dictionary-backed tokens; see [`tokenizer::tokenize`].
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenizer::tokenize(&self.words, text)
    }

    /// All entries for `word` in the given script, in corpus order.
    pub fn get_word(&self, word: &str, ty: DictionaryType) -> Vec<WordEntry> {
        self.words.lookup(word, ty).into_iter().cloned().collect()
    }

    pub fn get_character(&self, character: char) -> Option<CharacterEntry> {
        self.characters.get(character).cloned()
    }

    pub fn decompose(&self, character: char) -> CharacterDecomposition {
        self.characters.decompose(character)
    }

    /// Frequency rank of each word (1 = most frequent), same order as `words`.
    pub fn get_word_frequencies<S: AsRef<str>>(&self, words: &[S]) -> Vec<Option<u32>> {
        words
            .iter()
            .map(|word| self.frequencies.rank(word.as_ref()))
            .collect()
    }

    /// Log-scaled display score in `0..=100` of each word. Words missing from
    /// the table use their rarest known character.
    pub fn get_word_frequency_scores<S: AsRef<str>>(&self, words: &[S]) -> Vec<u8> {
        words
            .iter()
            .map(|word| self.frequencies.score(word.as_ref()))
            .collect()
    }

    pub fn get_sentences_including_word(
        &self,
        word: &str,
        limit: usize,
        ty: DictionaryType,
    ) -> Vec<SentencePair> {
        self.sentences
            .iter_sentences_including_word(word, ty)
            .take(limit)
            .collect()
    }

    /// Entries pronounced like `word`.
    ///
    /// For each of `word`'s entries, the entries with the same normalised
    /// reading (tone included) are listed in corpus order. `word` itself is
    /// left out and consecutive entries with the same headword collapse into
    /// the first one.
    pub fn get_homophones(&self, word: &str, ty: DictionaryType) -> Vec<WordEntry> {
        let mut readings = HashSet::new();
        let mut result: Vec<WordEntry> = Vec::new();

        for &id in self.words.ids(word, ty) {
            let reading = normalize_reading(&self.words.entry(id).pinyin);
            if !readings.insert(reading.clone()) {
                continue;
            }
            for &other in self.words.ids_with_reading(&reading) {
                let entry = self.words.entry(other);
                let surface = entry.word(ty);
                if surface == word || result.last().is_some_and(|last| last.word(ty) == surface) {
                    continue;
                }
                result.push(entry.clone());
            }
        }
        result
    }

    pub fn get_similar_words(&self, word: &str, limit: usize, ty: DictionaryType) -> Vec<SimilarWord> {
        self.thesaurus.similar_words(word, limit, ty)
    }

    /// The first `limit` entries (in corpus order) whose headword contains
    /// `substring` and is not equal to it, ordered by headword stroke count.
    /// Headwords with a character lacking a record sort last; ties keep
    /// corpus order.
    pub fn get_words_including_subslice(
        &self,
        substring: &str,
        limit: usize,
        ty: DictionaryType,
    ) -> Vec<WordEntry> {
        let mut words: Vec<WordEntry> = self
            .words
            .iter_including_subslice(substring, ty)
            .take(limit)
            .cloned()
            .collect();
        words.sort_by_key(|entry| self.stroke_count(entry.word(ty)).unwrap_or(usize::MAX));
        words
    }

    /// Characters built from `component` that are also words in `ty`.
    pub fn get_characters_including_component(
        &self,
        component: char,
        ty: DictionaryType,
    ) -> Vec<CharacterEntry> {
        let mut buf = [0u8; 4];
        self.characters
            .characters_including_component(component)
            .filter(|entry| !self.words.ids(entry.character.encode_utf8(&mut buf), ty).is_empty())
            .cloned()
            .collect()
    }

    /// Total strokes of `text`; `None` when any character has no record.
    pub fn stroke_count(&self, text: &str) -> Option<usize> {
        self.characters.stroke_count(text)
    }

    pub fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::Tokenize { text } => Response::Tokens(self.tokenize(&text)),
            Request::GetWord { word, script } => Response::Words(self.get_word(&word, script)),
            Request::GetCharacter { character } => {
                Response::Character(self.get_character(character))
            }
            Request::Decompose { character } => {
                Response::Decomposition(self.decompose(character))
            }
            Request::GetWordFrequencies { words } => {
                Response::Frequencies(self.get_word_frequencies(&words))
            }
            Request::GetWordFrequencyScores { words } => {
                Response::FrequencyScores(self.get_word_frequency_scores(&words))
            }
            Request::GetSentencesIncludingWord {
                word,
                limit,
                script,
            } => Response::Sentences(self.get_sentences_including_word(&word, limit, script)),
            Request::GetHomophones { word, script } => {
                Response::Words(self.get_homophones(&word, script))
            }
            Request::GetSimilarWords {
                word,
                limit,
                script,
            } => Response::SimilarWords(self.get_similar_words(&word, limit, script)),
            Request::GetWordsIncludingSubslice {
                substring,
                limit,
                script,
            } => Response::Words(self.get_words_including_subslice(&substring, limit, script)),
            Request::GetCharactersIncludingComponent { component, script } => {
                Response::Characters(self.get_characters_including_component(component, script))
            }
        }
    }

    /// [`Zilin::dispatch`] over JSON text.
    pub fn dispatch_json(&self, request: &str) -> serde_json::Result<String> {
        let request: Request = serde_json::from_str(request)?;
        serde_json::to_string(&self.dispatch(request))
    }
}
