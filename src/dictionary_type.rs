use serde::{Deserialize, Serialize};

/// Which headword column of the dictionary a query runs against.
///
/// Every CC-CEDICT entry carries both a traditional and a simplified form, and
/// most queries (word lookup, sentences, homophones, similar words, substring
/// search) are answered against one of the two.
///
/// # ABI / FFI
///
/// `DictionaryType` is marked with `#[repr(u32)]`, so each variant has a stable
/// numeric value for C callers. When accepting values from FFI, use
/// [`DictionaryType::from_ffi`] to validate them.
///
/// # String parsing
///
/// `TryFrom<&str>` accepts `"simplified"`, `"s"`, `"traditional"` and `"t"`
/// (case-insensitive), which is what the CLI uses.
///
/// | Variant | Name          | Column used          |
/// |--------:|---------------|----------------------|
/// | 1       | `Simplified`  | `WordEntry::simplified`  |
/// | 2       | `Traditional` | `WordEntry::traditional` |
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryType {
    /// Simplified Chinese headwords.
    Simplified = 1,

    /// Traditional Chinese headwords.
    Traditional = 2,
}

impl DictionaryType {
    /// Converts an FFI numeric value into [`DictionaryType`].
    ///
    /// Returns `None` for unknown values.
    ///
    /// ```rust
    /// use zilin_rs::DictionaryType;
    ///
    /// assert_eq!(DictionaryType::from_ffi(1), Some(DictionaryType::Simplified));
    /// assert_eq!(DictionaryType::from_ffi(999), None);
    /// ```
    #[inline]
    pub fn from_ffi(v: u32) -> Option<Self> {
        Some(match v {
            1 => Self::Simplified,
            2 => Self::Traditional,
            _ => return None,
        })
    }
}

impl Default for DictionaryType {
    fn default() -> Self {
        Self::Simplified
    }
}

/// `true` selects the simplified column, mirroring the `wantSimplified` flag of
/// the request API.
impl From<bool> for DictionaryType {
    fn from(simplified: bool) -> Self {
        if simplified {
            Self::Simplified
        } else {
            Self::Traditional
        }
    }
}

impl TryFrom<&str> for DictionaryType {
    type Error = ();

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_lowercase().as_str() {
            "simplified" | "s" => Ok(Self::Simplified),
            "traditional" | "t" => Ok(Self::Traditional),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DictionaryType;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(DictionaryType::try_from("Simplified"), Ok(DictionaryType::Simplified));
        assert_eq!(DictionaryType::try_from("T"), Ok(DictionaryType::Traditional));
        assert_eq!(DictionaryType::try_from("hk"), Err(()));
    }

    #[test]
    fn bool_flag_selects_column() {
        assert_eq!(DictionaryType::from(true), DictionaryType::Simplified);
        assert_eq!(DictionaryType::from(false), DictionaryType::Traditional);
    }
}
