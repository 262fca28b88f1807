//! Serializable request set covering every query of [`crate::Zilin`].
//!
//! A request is `{"fn": "<name>", "args": {...}}` with camelCase names, e.g.
//!
//! ```json
//! {"fn": "getWord", "args": {"word": "你好", "script": "simplified"}}
//! ```
//!
//! `script` defaults to `"simplified"` and `limit` to [`DEFAULT_LIMIT`]. The
//! response is the bare result value. [`crate::Zilin::dispatch`] maps one to
//! the other.

use serde::{Deserialize, Serialize};

use crate::character::{CharacterDecomposition, CharacterEntry};
use crate::sentence::SentencePair;
use crate::thesaurus::SimilarWord;
use crate::tokenizer::Token;
use crate::word::WordEntry;
use crate::DictionaryType;

pub const DEFAULT_LIMIT: usize = 10;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fn", content = "args", rename_all = "camelCase")]
pub enum Request {
    Tokenize {
        text: String,
    },
    GetWord {
        word: String,
        #[serde(default)]
        script: DictionaryType,
    },
    GetCharacter {
        character: char,
    },
    Decompose {
        character: char,
    },
    GetWordFrequencies {
        words: Vec<String>,
    },
    GetWordFrequencyScores {
        words: Vec<String>,
    },
    GetSentencesIncludingWord {
        word: String,
        #[serde(default = "default_limit")]
        limit: usize,
        #[serde(default)]
        script: DictionaryType,
    },
    GetHomophones {
        word: String,
        #[serde(default)]
        script: DictionaryType,
    },
    GetSimilarWords {
        word: String,
        #[serde(default = "default_limit")]
        limit: usize,
        #[serde(default)]
        script: DictionaryType,
    },
    GetWordsIncludingSubslice {
        substring: String,
        #[serde(default = "default_limit")]
        limit: usize,
        #[serde(default)]
        script: DictionaryType,
    },
    GetCharactersIncludingComponent {
        component: char,
        #[serde(default)]
        script: DictionaryType,
    },
}

/// Result of a [`Request`], serialized as the bare value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Tokens(Vec<Token>),
    Words(Vec<WordEntry>),
    Character(Option<CharacterEntry>),
    Characters(Vec<CharacterEntry>),
    Decomposition(CharacterDecomposition),
    Frequencies(Vec<Option<u32>>),
    FrequencyScores(Vec<u8>),
    Sentences(Vec<SentencePair>),
    SimilarWords(Vec<SimilarWord>),
}
