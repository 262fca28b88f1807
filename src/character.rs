use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::PARALLEL_THRESHOLD;

/// Ideographic description characters that combine two components.
pub const BINARY_DECOMPOSITION_TYPES: &[char] =
    &['⿰', '⿱', '⿴', '⿵', '⿶', '⿷', '⿸', '⿹', '⿺', '⿻'];

/// Ideographic description characters that combine three components.
pub const TERNARY_DECOMPOSITION_TYPES: &[char] = &['⿲', '⿳'];

/// Placeholder for a component with no known encoding.
pub const UNKNOWN_COMPONENT: char = '？';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EtymologyType {
    Pictophonetic,
    Ideographic,
    Pictographic,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEtymology {
    #[serde(rename = "type")]
    pub ty: EtymologyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub character: char,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub pinyin: Vec<String>,
    #[serde(default, skip_serializing)]
    pub decomposition: String,
    #[serde(default)]
    pub etymology: Option<CharacterEtymology>,
    #[serde(default)]
    pub radical: Option<String>,
    #[serde(default)]
    pub strokes: usize,
}

/// makemeahanzi `dictionary.txt` record; `matches` has one item per stroke.
#[derive(Deserialize)]
struct RawCharacterRecord {
    character: char,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    pinyin: Vec<String>,
    #[serde(default)]
    decomposition: String,
    #[serde(default)]
    etymology: Option<CharacterEtymology>,
    #[serde(default)]
    radical: Option<String>,
    #[serde(default)]
    matches: Vec<serde_json::Value>,
}

impl From<RawCharacterRecord> for CharacterEntry {
    fn from(raw: RawCharacterRecord) -> Self {
        CharacterEntry {
            character: raw.character,
            definition: raw.definition,
            pinyin: raw.pinyin,
            decomposition: raw.decomposition,
            etymology: raw.etymology,
            radical: raw.radical,
            strokes: raw.matches.len(),
        }
    }
}

/// Parse one decomposition row.
///
/// Accepts a makemeahanzi JSON record, or `char<TAB>ids[<TAB>etymologyJSON]`.
pub fn parse_character_line(line: &str) -> Option<CharacterEntry> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }
    if line.trim_start().starts_with('{') {
        return serde_json::from_str::<RawCharacterRecord>(line)
            .ok()
            .map(CharacterEntry::from);
    }

    let mut fields = line.split('\t');
    let character = single_char(fields.next()?.trim())?;
    let decomposition = fields.next().map(str::trim).unwrap_or_default().to_owned();
    let etymology = match fields.next().map(str::trim).filter(|f| !f.is_empty()) {
        Some(json) => Some(serde_json::from_str(json).ok()?),
        None => None,
    };
    Some(CharacterEntry {
        character,
        definition: None,
        pinyin: Vec::new(),
        decomposition,
        etymology,
        radical: None,
        strokes: 0,
    })
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}

/// How a character breaks into components.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum CharacterDecomposition {
    #[default]
    Unknown,
    Leaf(char),
    Composite {
        #[serde(rename = "type")]
        kind: char,
        value: Option<char>,
        parts: Vec<CharacterDecomposition>,
    },
}

impl CharacterDecomposition {
    /// Every component below this node: leaves and the surface value of each
    /// nested composite, depth first.
    pub fn iter_parts(&self) -> impl Iterator<Item = char> + '_ {
        let mut out = Vec::new();
        self.collect_parts(&mut out);
        out.into_iter()
    }

    fn collect_parts(&self, out: &mut Vec<char>) {
        match self {
            CharacterDecomposition::Unknown => {}
            CharacterDecomposition::Leaf(ch) => out.push(*ch),
            CharacterDecomposition::Composite { value, parts, .. } => {
                out.extend(value.iter().copied());
                for part in parts {
                    part.collect_parts(out);
                }
            }
        }
    }
}

/// Character Index: character records in corpus order plus a reverse
/// component index.
#[derive(Debug, Clone, Default)]
pub struct CharacterIndex {
    entries: Vec<CharacterEntry>,
    by_char: HashMap<char, usize>,
    components: HashMap<char, Vec<usize>>,
}

impl CharacterIndex {
    /// Build from the decomposition file. Unparseable rows are skipped; a later
    /// row for the same character replaces the earlier one.
    pub fn from_text(data: &str) -> Self {
        let mut index = CharacterIndex {
            entries: Vec::with_capacity(16_384),
            by_char: HashMap::with_capacity(16_384),
            components: HashMap::new(),
        };
        let mut skipped = 0usize;

        for line in data.lines() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_character_line(line) {
                Some(entry) => match index.by_char.get(&entry.character) {
                    Some(&id) => index.entries[id] = entry,
                    None => {
                        index.by_char.insert(entry.character, index.entries.len());
                        index.entries.push(entry);
                    }
                },
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "skipped malformed decomposition rows");
        }

        index.components = index.build_component_index();
        index
    }

    fn build_component_index(&self) -> HashMap<char, Vec<usize>> {
        let parts_of = |entry: &CharacterEntry| self.reachable_components(entry.character);

        let parts: Vec<Vec<char>> = if self.entries.len() >= PARALLEL_THRESHOLD {
            self.entries.par_iter().map(parts_of).collect()
        } else {
            self.entries.iter().map(parts_of).collect()
        };

        let mut components: HashMap<char, Vec<usize>> = HashMap::new();
        for (id, parts) in parts.into_iter().enumerate() {
            for part in parts {
                components.entry(part).or_default().push(id);
            }
        }
        components
    }

    /// Every character reachable from `character` through decomposition
    /// rows, excluding itself, sorted. This is the component set of the
    /// resolved tree, found without building the tree: shared sub-characters
    /// are visited once.
    fn reachable_components(&self, character: char) -> Vec<char> {
        let mut seen = HashSet::from([character]);
        let mut stack = vec![character];
        while let Some(ch) = stack.pop() {
            for part in self.direct_components(ch) {
                if seen.insert(part) {
                    stack.push(part);
                }
            }
        }
        seen.remove(&character);
        let mut parts: Vec<char> = seen.into_iter().collect();
        parts.sort_unstable();
        parts
    }

    /// Component characters named in `character`'s own row, limited to the
    /// operands the operators consume.
    fn direct_components(&self, character: char) -> Vec<char> {
        let Some(entry) = self.get(character) else {
            return Vec::new();
        };
        let mut parts = Vec::new();
        let mut pending = 1usize;
        for token in entry.decomposition.chars() {
            if pending == 0 {
                break;
            }
            pending -= 1;
            if BINARY_DECOMPOSITION_TYPES.contains(&token) {
                pending += 2;
            } else if TERNARY_DECOMPOSITION_TYPES.contains(&token) {
                pending += 3;
            } else if token != UNKNOWN_COMPONENT {
                parts.push(token);
            }
        }
        parts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, character: char) -> Option<&CharacterEntry> {
        self.by_char.get(&character).map(|&id| &self.entries[id])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterEntry> {
        self.entries.iter()
    }

    /// Sum of stroke counts; `None` when any character is unknown.
    pub fn stroke_count(&self, characters: &str) -> Option<usize> {
        characters
            .chars()
            .map(|ch| self.get(ch).map(|entry| entry.strokes))
            .sum()
    }

    /// Characters whose decomposition contains `component`, in corpus order.
    pub fn characters_including_component(
        &self,
        component: char,
    ) -> impl Iterator<Item = &CharacterEntry> {
        self.components
            .get(&component)
            .into_iter()
            .flatten()
            .map(|&id| &self.entries[id])
    }

    /// Resolve the decomposition tree of `character`.
    pub fn decompose(&self, character: char) -> CharacterDecomposition {
        let mut expanding = vec![character];
        self.decompose_with(character, &mut expanding)
    }

    /// `expanding` holds the characters currently being expanded on this
    /// path; meeting one of them again yields a leaf instead of recursing.
    fn decompose_with(&self, character: char, expanding: &mut Vec<char>) -> CharacterDecomposition {
        let Some(entry) = self.get(character) else {
            return CharacterDecomposition::Unknown;
        };
        let mut tokens = entry.decomposition.chars();
        self.parse_node(Some(character), &mut tokens, expanding)
    }

    fn parse_node(
        &self,
        value: Option<char>,
        tokens: &mut dyn Iterator<Item = char>,
        expanding: &mut Vec<char>,
    ) -> CharacterDecomposition {
        let Some(token) = tokens.next() else {
            return CharacterDecomposition::Unknown;
        };

        if token == UNKNOWN_COMPONENT {
            return value
                .map(CharacterDecomposition::Leaf)
                .unwrap_or(CharacterDecomposition::Unknown);
        }

        let arity = if BINARY_DECOMPOSITION_TYPES.contains(&token) {
            2
        } else if TERNARY_DECOMPOSITION_TYPES.contains(&token) {
            3
        } else {
            0
        };
        if arity > 0 {
            let parts = (0..arity)
                .map(|_| self.parse_node(None, tokens, expanding))
                .collect();
            return CharacterDecomposition::Composite {
                kind: token,
                value,
                parts,
            };
        }

        if expanding.contains(&token) {
            return CharacterDecomposition::Leaf(token);
        }
        expanding.push(token);
        let nested = self.decompose_with(token, expanding);
        expanding.pop();

        match nested {
            CharacterDecomposition::Unknown => CharacterDecomposition::Leaf(token),
            decomposition => decomposition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::CharacterDecomposition::{Composite, Leaf, Unknown};

    const DATA: &str = "\
好\t⿰女子
女\t？\t{\"type\":\"pictographic\",\"hint\":\"a woman\"}
子\t？
㚩\t⿰好子
三\t⿱一⿱一一
";

    #[test]
    fn parses_tab_rows_with_etymology() {
        let index = CharacterIndex::from_text(DATA);
        let etymology = index.get('女').unwrap().etymology.clone().unwrap();
        assert_eq!(etymology.ty, EtymologyType::Pictographic);
        assert_eq!(etymology.hint.as_deref(), Some("a woman"));
        assert!(index.get('好').unwrap().etymology.is_none());
    }

    #[test]
    fn parses_json_records() {
        let line = r#"{"character":"好","definition":"good","pinyin":["hǎo"],"decomposition":"⿰女子","etymology":{"type":"ideographic","hint":"A woman 女 with a son 子"},"radical":"女","matches":[[0],[0],[0],[1],[1],[1]]}"#;
        let entry = parse_character_line(line).unwrap();
        assert_eq!(entry.character, '好');
        assert_eq!(entry.strokes, 6);
        assert_eq!(entry.etymology.unwrap().ty, EtymologyType::Ideographic);
    }

    #[test]
    fn unknown_etymology_kinds_are_other() {
        let entry = parse_character_line("丶\t？\t{\"type\":\"ancient\"}").unwrap();
        assert_eq!(entry.etymology.unwrap().ty, EtymologyType::Other);
    }

    #[test]
    fn splices_nested_decompositions() {
        let index = CharacterIndex::from_text(DATA);
        assert_eq!(
            index.decompose('㚩'),
            Composite {
                kind: '⿰',
                value: Some('㚩'),
                parts: vec![
                    Composite {
                        kind: '⿰',
                        value: Some('好'),
                        parts: vec![Leaf('女'), Leaf('子')],
                    },
                    Leaf('子'),
                ],
            }
        );
    }

    #[test]
    fn ternary_and_missing_records() {
        let index = CharacterIndex::from_text(DATA);
        match index.decompose('三') {
            Composite { parts, .. } => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(&parts[1], Composite { parts, .. } if parts.len() == 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(index.decompose('龘'), Unknown);
        assert_eq!(index.decompose('女'), Leaf('女'));
        // "一" has no record, so it stays a leaf.
        assert!(index.decompose('三').iter_parts().any(|ch| ch == '一'));
    }

    #[test]
    fn truncated_streams_fill_with_unknown() {
        let index = CharacterIndex::from_text("口\t⿲口");
        assert_eq!(
            index.decompose('口'),
            Composite {
                kind: '⿲',
                value: Some('口'),
                parts: vec![Leaf('口'), Unknown, Unknown],
            }
        );
    }

    #[test]
    fn cycles_terminate() {
        let index = CharacterIndex::from_text("甲\t⿰乙丁\n乙\t⿱甲丁\n");
        let tree = index.decompose('甲');
        assert_eq!(
            tree,
            Composite {
                kind: '⿰',
                value: Some('甲'),
                parts: vec![
                    Composite {
                        kind: '⿱',
                        value: Some('乙'),
                        parts: vec![Leaf('甲'), Leaf('丁')],
                    },
                    Leaf('丁'),
                ],
            }
        );
    }

    #[test]
    fn reverse_component_index_in_corpus_order() {
        let index = CharacterIndex::from_text(DATA);
        let chars: Vec<char> = index
            .characters_including_component('子')
            .map(|e| e.character)
            .collect();
        assert_eq!(chars, vec!['好', '㚩']);

        let chars: Vec<char> = index
            .characters_including_component('好')
            .map(|e| e.character)
            .collect();
        assert_eq!(chars, vec!['㚩']);

        for entry in index.iter() {
            let ch = entry.character;
            let mut tree: Vec<char> = index.decompose(ch).iter_parts().filter(|&p| p != ch).collect();
            tree.sort_unstable();
            tree.dedup();
            assert_eq!(tree, index.reachable_components(ch), "{ch}");
        }
    }

    #[test]
    fn shared_components_build_in_linear_time() {
        let chain: Vec<char> = (0..48)
            .map(|i| char::from_u32(0x4E00 + i).unwrap())
            .collect();
        let data: String = chain
            .windows(2)
            .map(|pair| format!("{}\t⿰{}{}\n", pair[0], pair[1], pair[1]))
            .collect();
        let index = CharacterIndex::from_text(&data);
        assert_eq!(index.len(), 47);

        let users: Vec<char> = index
            .characters_including_component(chain[47])
            .map(|e| e.character)
            .collect();
        assert_eq!(users, chain[..47].to_vec());

        let users: Vec<char> = index
            .characters_including_component(chain[1])
            .map(|e| e.character)
            .collect();
        assert_eq!(users, vec![chain[0]]);
    }

    #[test]
    fn component_index_follows_cycles_once() {
        let index = CharacterIndex::from_text("甲\t⿰乙丁\n乙\t⿱甲丁\n");
        let users: Vec<char> = index
            .characters_including_component('甲')
            .map(|e| e.character)
            .collect();
        assert_eq!(users, vec!['乙']);
        let users: Vec<char> = index
            .characters_including_component('丁')
            .map(|e| e.character)
            .collect();
        assert_eq!(users, vec!['甲', '乙']);
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&Composite {
            kind: '⿰',
            value: None,
            parts: vec![Leaf('女'), Unknown],
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"⿰","value":null,"parts":["女",null]}"#);
    }
}
