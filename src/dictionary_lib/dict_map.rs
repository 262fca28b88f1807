use std::collections::{HashMap, HashSet};

/// Exact-match key map that also records which key lengths exist.
///
/// Values are ids into an owning entry arena (see [`crate::WordIndex`]), so the
/// same entry can be reachable from several maps without cloning. Key lengths
/// are counted in grapheme clusters, the unit the tokenizer advances by.
#[derive(Debug, Clone, Default)]
pub struct DictMap {
    pub map: HashMap<String, Vec<usize>>,

    pub max_len: u16,
    pub key_len_mask: u64,          // lengths 1..=64 → bit n-1
    pub long_lengths: HashSet<u16>, // >64
}

impl DictMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append `id` under `key` and update the length stats incrementally.
    #[inline]
    pub fn push_with_len(&mut self, key: &str, id: usize, len: u16) {
        if len != 0 {
            if len <= 64 {
                self.key_len_mask |= 1u64 << (len - 1);
            } else {
                self.long_lengths.insert(len);
            }
            if len > self.max_len {
                self.max_len = len;
            }
        }
        match self.map.get_mut(key) {
            Some(ids) => ids.push(id),
            None => {
                self.map.insert(key.to_owned(), vec![id]);
            }
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> &[usize] {
        self.map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    #[inline]
    pub fn has_key_len(&self, n: u16) -> bool {
        if n == 0 {
            return false;
        }
        if n <= 64 {
            (self.key_len_mask & (1u64 << (n - 1))) != 0
        } else {
            self.long_lengths.contains(&n)
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::DictMap;

    #[test]
    fn tracks_key_lengths() {
        let mut map = DictMap::default();
        map.push_with_len("你好", 0, 2);
        map.push_with_len("你", 1, 1);
        map.push_with_len("你好", 2, 2);

        assert_eq!(map.get("你好"), &[0, 2]);
        assert_eq!(map.get("好"), &[] as &[usize]);
        assert_eq!(map.max_len, 2);
        assert!(map.has_key_len(1));
        assert!(map.has_key_len(2));
        assert!(!map.has_key_len(3));
        assert!(!map.has_key_len(0));
    }

    #[test]
    fn long_keys_use_overflow_set() {
        let mut map = DictMap::default();
        map.push_with_len("x", 0, 70);
        assert!(map.has_key_len(70));
        assert!(!map.has_key_len(64));
    }
}
