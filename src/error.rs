use std::io;
use std::path::PathBuf;

/// Errors raised while loading a corpus.
///
/// Only load time can fail. Individual malformed lines are skipped by the
/// parsers; an error means the corpus is unusable as a whole.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} corpus is empty")]
    EmptyCorpus(&'static str),

    #[error("{0} corpus contains no parseable entries")]
    NoEntries(&'static str),

    #[error("corpus bundle error: {0}")]
    Bundle(#[from] serde_json::Error),
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CorpusError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CorpusError>;
