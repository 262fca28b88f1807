use std::fs::File;
use std::io::{BufWriter, Cursor, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use zstd::stream::read::Decoder;
use zstd::Encoder;

use crate::error::{CorpusError, Result};

pub mod dict_map;

pub use dict_map::DictMap;

/// Frame magic that starts every zstd stream.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Default file name of a packed corpus bundle.
pub const BUNDLE_FILE_NAME: &str = "zilin-corpus.json.zst";

/// Raw corpus texts, exactly as read from disk.
///
/// This is the input of [`crate::Zilin::load`]. Frequency and sentence data are
/// optional; when absent the corresponding queries return empty results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub cedict: String,
    pub decomposition: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub sentences: Option<String>,
}

/// Where the corpus files live.
///
/// Every file may be plain UTF-8 or zstd-compressed; compression is detected
/// from the `.zst` extension or the zstd frame magic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusPaths {
    pub cedict: PathBuf,
    pub decomposition: PathBuf,
    #[serde(default)]
    pub frequency: Option<PathBuf>,
    #[serde(default)]
    pub sentences: Option<PathBuf>,
}

impl CorpusPaths {
    pub const CEDICT_FILE: &'static str = "cedict_1_0_ts_utf-8_mdbg.txt";
    pub const DECOMPOSITION_FILE: &'static str = "dictionary.txt";
    pub const FREQUENCY_FILE: &'static str = "SUBTLEX-CH-WF.txt";
    pub const SENTENCES_FILE: &'static str = "sentences.txt";

    /// Standard file names inside `dir`. Each name also matches its `.zst`
    /// variant when only the compressed file exists.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        CorpusPaths {
            cedict: resolve(dir, Self::CEDICT_FILE),
            decomposition: resolve(dir, Self::DECOMPOSITION_FILE),
            frequency: Some(resolve(dir, Self::FREQUENCY_FILE)),
            sentences: Some(resolve(dir, Self::SENTENCES_FILE)),
        }
    }
}

fn resolve(dir: &Path, name: &str) -> PathBuf {
    let plain = dir.join(name);
    if plain.exists() {
        return plain;
    }
    let compressed = dir.join(format!("{name}.zst"));
    if compressed.exists() {
        compressed
    } else {
        plain
    }
}

impl Corpus {
    pub fn new(
        cedict: impl Into<String>,
        decomposition: impl Into<String>,
        frequency: Option<String>,
        sentences: Option<String>,
    ) -> Self {
        Corpus {
            cedict: cedict.into(),
            decomposition: decomposition.into(),
            frequency,
            sentences,
        }
    }

    /// Read all corpus files. The dictionary and decomposition files are
    /// required; optional files that do not exist are skipped.
    pub fn from_paths(paths: &CorpusPaths) -> Result<Self> {
        Ok(Corpus {
            cedict: read_corpus_file(&paths.cedict)?,
            decomposition: read_corpus_file(&paths.decomposition)?,
            frequency: read_optional(paths.frequency.as_deref())?,
            sentences: read_optional(paths.sentences.as_deref())?,
        })
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_paths(&CorpusPaths::from_dir(dir))
    }

    /// Load a bundle written by [`Corpus::save_compressed`].
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let json = read_corpus_file(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the corpus as zstd-compressed JSON.
    pub fn save_compressed(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let write = || -> std::io::Result<()> {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            let mut encoder = Encoder::new(writer, 19)?;
            serde_json::to_writer(&mut encoder, self)?;
            encoder.finish()?;
            Ok(())
        };
        write().map_err(|e| CorpusError::io(path, e))
    }
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) if path.exists() => read_corpus_file(path).map(Some),
        Some(path) => {
            debug!(path = %path.display(), "optional corpus file not found");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Read a UTF-8 corpus file, transparently decompressing zstd input.
pub fn read_corpus_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(|e| CorpusError::io(path, e))?;

    let compressed = path.extension().map_or(false, |ext| ext == "zst")
        || bytes.starts_with(&ZSTD_MAGIC);
    if compressed {
        decompress(&bytes).map_err(|e| CorpusError::io(path, e))
    } else {
        String::from_utf8(bytes)
            .map_err(|e| CorpusError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

fn decompress(bytes: &[u8]) -> std::io::Result<String> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let mut decompressed = String::new();
    decoder.read_to_string(&mut decompressed)?;
    Ok(decompressed)
}
