//! Double array construction
//!
//! Keys are consumed in ascending order. Each trie node's children are
//! gathered into a sibling group ([`BuildState::fetch`]), and every group is
//! placed at the lowest base offset where all of its slots are free
//! ([`BuildState::place`]). Groups are placed depth first in key order, using
//! an explicit stack so that very long keys cannot exhaust the call stack.

use std::cmp::max;

use crate::config::{Config, DoubleArrayConfig};
use crate::error::{BuildError, Result, SeadatError};
use crate::fsa::double_array::{transition_code, DoubleArray, ROOT_BASE};
use crate::fsa::double_array_trie::DoubleArrayTrie;

/// Builder for constructing double arrays from sorted keys
///
/// # Examples
///
/// ```rust
/// use seadat::fsa::DoubleArrayTrieBuilder;
///
/// let array = DoubleArrayTrieBuilder::new()
///     .build(&["apple", "application", "apply"])
///     .unwrap();
/// assert_eq!(array.exact_match("apply"), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct DoubleArrayTrieBuilder {
    config: DoubleArrayConfig,
}

impl DoubleArrayTrieBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: DoubleArrayConfig::default(),
        }
    }

    /// Create a new builder with custom configuration
    pub fn with_config(config: DoubleArrayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the builder configuration
    pub fn config(&self) -> &DoubleArrayConfig {
        &self.config
    }

    /// Build arrays from sorted keys; each key's value index is its position
    pub fn build<K: AsRef<str>>(&self, keys: &[K]) -> Result<DoubleArray> {
        self.build_from_parts(keys, None, None, keys.len())
    }

    /// Build arrays from the first `count` sorted keys
    ///
    /// * `lengths` - optional character length per key; a key is truncated to
    ///   its length, which may not exceed the key itself
    /// * `values` - optional value index per key; defaults to the key position
    pub fn build_from_parts<K: AsRef<str>>(
        &self,
        keys: &[K],
        lengths: Option<&[usize]>,
        values: Option<&[i32]>,
        count: usize,
    ) -> Result<DoubleArray> {
        let keys = collect_keys(keys, lengths, values, count)?;
        log::debug!("building double array from {} keys", keys.len());

        let mut state = BuildState::new(&self.config, keys, values);
        match state.run() {
            Ok(()) => {
                let array = state.finish(self.config.auto_shrink);
                log::debug!(
                    "double array built: size={}, capacity={}, occupied={}",
                    array.size(),
                    array.capacity(),
                    array.nonzero_size()
                );
                Ok(array)
            }
            Err(e) => {
                log::warn!("double array build aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Build a trie pairing the sorted keys with a value table
    ///
    /// The key at position `i` maps to `values[i]`.
    pub fn build_trie<K: AsRef<str>, V>(
        &self,
        keys: &[K],
        values: Vec<V>,
    ) -> Result<DoubleArrayTrie<V>> {
        if values.len() < keys.len() {
            return Err(SeadatError::trie(format!(
                "{} keys but only {} values",
                keys.len(),
                values.len()
            )));
        }
        let array = self.build(keys)?;
        Ok(DoubleArrayTrie::from_parts(array, values))
    }
}

impl Default for DoubleArrayTrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_keys<K: AsRef<str>>(
    keys: &[K],
    lengths: Option<&[usize]>,
    values: Option<&[i32]>,
    count: usize,
) -> Result<Vec<Vec<char>>> {
    if count > keys.len() {
        return Err(SeadatError::trie(format!(
            "count {} exceeds the {} keys supplied",
            count,
            keys.len()
        )));
    }
    if let Some(lengths) = lengths {
        if lengths.len() < count {
            return Err(SeadatError::trie(format!(
                "{} keys but only {} lengths",
                count,
                lengths.len()
            )));
        }
    }
    if let Some(values) = values {
        if values.len() < count {
            return Err(SeadatError::trie(format!(
                "{} keys but only {} values",
                count,
                values.len()
            )));
        }
    }

    let mut collected = Vec::with_capacity(count);
    for (i, key) in keys[..count].iter().enumerate() {
        let mut chars: Vec<char> = key.as_ref().chars().collect();
        if let Some(lengths) = lengths {
            let len = lengths[i];
            if len > chars.len() {
                return Err(SeadatError::trie(format!(
                    "length {} of key #{} exceeds its {} characters",
                    len,
                    i,
                    chars.len()
                )));
            }
            chars.truncate(len);
        }
        collected.push(chars);
    }
    Ok(collected)
}

/// A trie node during construction
#[derive(Debug, Clone, Copy)]
struct Node {
    /// Transition code, 0 for end of key
    code: usize,
    depth: usize,
    /// Half-open range of keys sharing this node
    left: usize,
    right: usize,
}

/// A placed sibling group whose members still need their own children
struct Frame {
    begin: usize,
    siblings: Vec<Node>,
    next: usize,
}

struct BuildState<'a> {
    keys: Vec<Vec<char>>,
    values: Option<&'a [i32]>,
    base: Vec<i32>,
    check: Vec<i32>,
    used: Vec<bool>,
    size: usize,
    next_check_pos: usize,
    progress: usize,
    min_growth_factor: f64,
    occupancy_threshold: f64,
}

/// Largest slot count a double array may hold; offsets are stored as `i32`
const MAX_SLOTS: usize = i32::MAX as usize;

/// Next capacity when `needed` slots must fit.
///
/// Scales `capacity` by `factor`, capped at twice the demand and at
/// [`MAX_SLOTS`], and never below `needed`. An over-limit `needed` is left
/// for `resize` to reject.
fn grown_capacity(capacity: usize, factor: f64, needed: usize) -> usize {
    let scaled = capacity as f64 * factor;
    let cap = needed.saturating_mul(2).min(MAX_SLOTS);
    let grown = if scaled >= cap as f64 {
        cap
    } else {
        scaled as usize
    };
    max(grown, needed)
}

impl<'a> BuildState<'a> {
    fn new(config: &DoubleArrayConfig, keys: Vec<Vec<char>>, values: Option<&'a [i32]>) -> Self {
        let capacity = config.initial_capacity;
        Self {
            keys,
            values,
            base: vec![0; capacity],
            check: vec![0; capacity],
            used: vec![false; capacity],
            size: 0,
            next_check_pos: 0,
            progress: 0,
            min_growth_factor: config.min_growth_factor,
            occupancy_threshold: config.occupancy_threshold,
        }
    }

    fn capacity(&self) -> usize {
        self.base.len()
    }

    fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len > MAX_SLOTS {
            return Err(SeadatError::trie(format!(
                "double array cannot grow to {} slots",
                new_len
            )));
        }
        log::debug!(
            "growing double array from {} to {} slots",
            self.capacity(),
            new_len
        );
        self.base.resize(new_len, 0);
        self.check.resize(new_len, 0);
        self.used.resize(new_len, false);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        if self.capacity() < 2 {
            self.resize(2)?;
        }
        self.base[0] = ROOT_BASE;
        self.size = 1;

        let root = Node {
            code: 0,
            depth: 0,
            left: 0,
            right: self.keys.len(),
        };
        let siblings = self.fetch(&root)?;
        if siblings.is_empty() {
            return Ok(());
        }
        let begin = self.place(&siblings)?;
        self.base[0] = begin as i32;

        let mut stack = vec![Frame {
            begin,
            siblings,
            next: 0,
        }];
        while let Some(frame) = stack.last_mut() {
            let Some(&node) = frame.siblings.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let slot = frame.begin + node.code;

            let children = self.fetch(&node)?;
            if children.is_empty() {
                self.base[slot] = self.leaf_cell(&node)?;
                self.progress += 1;
            } else {
                let child_begin = self.place(&children)?;
                self.base[slot] = child_begin as i32;
                stack.push(Frame {
                    begin: child_begin,
                    siblings: children,
                    next: 0,
                });
            }
        }
        Ok(())
    }

    /// Group the keys under `parent` by their character at `parent.depth`
    fn fetch(&self, parent: &Node) -> Result<Vec<Node>> {
        let mut siblings: Vec<Node> = Vec::new();
        let mut prev = 0;

        for i in parent.left..parent.right {
            let key = &self.keys[i];
            if key.len() < parent.depth {
                continue;
            }
            let cur = match key.get(parent.depth) {
                Some(&c) => transition_code(c),
                None => 0,
            };
            if prev > cur {
                return Err(BuildError::UnsortedInput {
                    index: i,
                    depth: parent.depth,
                }
                .into());
            }
            if cur != prev || siblings.is_empty() {
                if let Some(last) = siblings.last_mut() {
                    last.right = i;
                }
                siblings.push(Node {
                    code: cur,
                    depth: parent.depth + 1,
                    left: i,
                    right: i,
                });
            }
            prev = cur;
        }
        if let Some(last) = siblings.last_mut() {
            last.right = parent.right;
        }
        Ok(siblings)
    }

    /// Find a free base for `siblings` and claim their slots
    fn place(&mut self, siblings: &[Node]) -> Result<usize> {
        let first = siblings[0].code;
        let last = siblings[siblings.len() - 1].code;

        let mut pos = max(first + 1, self.next_check_pos) - 1;
        let mut nonzero = 0usize;
        let mut seen_free = false;
        if self.capacity() <= pos {
            self.resize(pos + 1)?;
        }

        let begin = 'search: loop {
            pos += 1;
            if self.capacity() <= pos {
                self.resize(pos + 1)?;
            }
            if self.check[pos] != 0 {
                nonzero += 1;
                continue;
            }
            if !seen_free {
                self.next_check_pos = pos;
                seen_free = true;
            }

            let begin = pos - first;
            if self.capacity() <= begin + last {
                let remaining = self.keys.len() as f64 / (self.progress + 1) as f64;
                let factor = self.min_growth_factor.max(remaining);
                self.resize(grown_capacity(self.capacity(), factor, begin + last + 1))?;
            }
            if self.used[begin] {
                continue;
            }
            for sibling in &siblings[1..] {
                if self.check[begin + sibling.code] != 0 {
                    continue 'search;
                }
            }
            break begin;
        };

        if begin + last > i32::MAX as usize {
            return Err(SeadatError::trie(format!(
                "base offset {} exceeds the addressable range",
                begin
            )));
        }

        let scanned = pos - self.next_check_pos + 1;
        if nonzero as f64 / scanned as f64 >= self.occupancy_threshold {
            self.next_check_pos = pos;
        }

        self.used[begin] = true;
        self.size = max(self.size, begin + last + 1);
        for sibling in siblings {
            self.check[begin + sibling.code] = begin as i32;
        }
        Ok(begin)
    }

    /// Encode the value index of the key that ends at `node`
    fn leaf_cell(&self, node: &Node) -> Result<i32> {
        let value = match self.values {
            Some(values) => i64::from(values[node.left]),
            None => node.left as i64,
        };
        let encoded = -value - 1;
        if encoded >= 0 || encoded < i64::from(i32::MIN) {
            return Err(BuildError::ValueCollision {
                index: node.left,
                value,
            }
            .into());
        }
        Ok(encoded as i32)
    }

    fn finish(self, shrink: bool) -> DoubleArray {
        let BuildState {
            mut base,
            mut check,
            size,
            ..
        } = self;
        if shrink {
            base.truncate(size);
            base.shrink_to_fit();
            check.truncate(size);
            check.shrink_to_fit();
        }
        DoubleArray { base, check, size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    fn small_builder() -> DoubleArrayTrieBuilder {
        DoubleArrayTrieBuilder::with_config(DoubleArrayConfig::memory_preset()).unwrap()
    }

    #[test]
    fn test_root_is_placed_at_one() {
        let array = small_builder().build(&["a", "ab", "b"]).unwrap();
        assert_eq!(array.base()[0], 1);
        assert_eq!(array.root(), 1);
        assert!(array.size() >= 2);
        assert_eq!(array.capacity(), array.size());
    }

    #[test]
    fn test_values_default_to_key_index() {
        let keys = ["hello", "help", "helper", "world"];
        let array = small_builder().build(&keys).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(array.exact_match(key), Some(i as u32));
        }
        assert_eq!(array.exact_match("hel"), None);
    }

    #[test]
    fn test_explicit_values() {
        let keys = ["a", "ab", "b"];
        let array = small_builder()
            .build_from_parts(&keys, None, Some(&[1, 2, 3]), 3)
            .unwrap();
        assert_eq!(array.exact_match("a"), Some(1));
        assert_eq!(array.exact_match("ab"), Some(2));
        assert_eq!(array.exact_match("b"), Some(3));
    }

    #[test]
    fn test_explicit_lengths_truncate_keys() {
        let keys = ["abc", "abd", "b"];
        let array = small_builder()
            .build_from_parts(&keys, Some(&[1, 3, 1]), None, 3)
            .unwrap();
        assert_eq!(array.exact_match("a"), Some(0));
        assert_eq!(array.exact_match("abd"), Some(1));
        assert_eq!(array.exact_match("abc"), None);
        assert_eq!(array.exact_match("b"), Some(2));
    }

    #[test]
    fn test_count_limits_keys() {
        let array = small_builder()
            .build_from_parts(&["a", "b", "c"], None, None, 2)
            .unwrap();
        assert_eq!(array.exact_match("b"), Some(1));
        assert_eq!(array.exact_match("c"), None);
    }

    #[test]
    fn test_malformed_arguments() {
        let builder = small_builder();
        let keys = ["a", "b"];
        assert_eq!(
            builder.build_from_parts(&keys, None, None, 3).unwrap_err().category(),
            "trie"
        );
        assert!(builder.build_from_parts(&keys, Some(&[1]), None, 2).is_err());
        assert!(builder.build_from_parts(&keys, None, Some(&[0]), 2).is_err());
        assert!(builder.build_from_parts(&keys, Some(&[2, 1]), None, 2).is_err());
        assert!(builder.build_trie(&keys, vec!["x"]).is_err());
    }

    #[test]
    fn test_unsorted_input_is_rejected() {
        let err = small_builder().build(&["b", "a"]).unwrap_err();
        assert_eq!(
            err.as_build_error(),
            Some(&BuildError::UnsortedInput { index: 1, depth: 0 })
        );

        let err = small_builder().build(&["ab", "a"]).unwrap_err();
        assert_eq!(
            err.as_build_error(),
            Some(&BuildError::UnsortedInput { index: 1, depth: 1 })
        );
    }

    #[test]
    fn test_value_collision() {
        let err = small_builder()
            .build_from_parts(&["a", "b"], None, Some(&[0, -1]), 2)
            .unwrap_err();
        assert_eq!(
            err.as_build_error(),
            Some(&BuildError::ValueCollision { index: 1, value: -1 })
        );
        assert_eq!(err.category(), "value");

        let err = small_builder()
            .build_from_parts(&["a"], None, Some(&[i32::MIN]), 1)
            .unwrap_err();
        assert!(matches!(
            err.as_build_error(),
            Some(BuildError::ValueCollision { .. })
        ));
    }

    #[test]
    fn test_duplicate_keys_keep_first_value() {
        let array = small_builder().build(&["a", "a", "b"]).unwrap();
        assert_eq!(array.exact_match("a"), Some(0));
        assert_eq!(array.exact_match("b"), Some(2));
    }

    #[test]
    fn test_empty_key_set() {
        let array = small_builder().build::<&str>(&[]).unwrap();
        assert!(array.is_usable());
        assert_eq!(array.base()[0], 1);
        assert!(array.size() >= 1);
        assert_eq!(array.exact_match(""), None);
        assert_eq!(array.exact_match("a"), None);
        assert!(array.common_prefix_search("abc").is_empty());
    }

    #[test]
    fn test_empty_string_key() {
        let array = small_builder().build(&["", "a"]).unwrap();
        assert_eq!(array.exact_match(""), Some(0));
        assert_eq!(array.exact_match("a"), Some(1));
        assert_eq!(array.common_prefix_search("ab"), vec![0, 1]);
    }

    #[test]
    fn test_growth_from_tiny_capacity() {
        let config = DoubleArrayConfig {
            initial_capacity: 2,
            ..DoubleArrayConfig::memory_preset()
        };
        let builder = DoubleArrayTrieBuilder::with_config(config).unwrap();
        let keys: Vec<String> = (0..500).map(|i| format!("key{:04}", i)).collect();
        let array = builder.build(&keys).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(array.exact_match(key), Some(i as u32));
        }
    }

    #[test]
    fn test_growth_is_bounded_by_demand() {
        assert_eq!(grown_capacity(1000, 1.5, 1001), 1500);
        assert_eq!(grown_capacity(8192, 300_001.0, 128_600), 257_200);
        assert_eq!(grown_capacity(1 << 30, 3.0, (1 << 30) + 1), MAX_SLOTS);
        assert_eq!(grown_capacity(16, 1.05, 5000), 5000);
        assert_eq!(grown_capacity(16, 1.05, MAX_SLOTS + 1), MAX_SLOTS + 1);
    }

    #[test]
    fn test_wide_root_group_with_many_keys() {
        let config = DoubleArrayConfig {
            auto_shrink: false,
            ..DoubleArrayConfig::memory_preset()
        };
        let builder = DoubleArrayTrieBuilder::with_config(config).unwrap();
        let mut keys: Vec<String> = (0..300_000).map(|i| format!("a{:06}", i)).collect();
        keys.push("😀".to_string());

        let array = builder.build(&keys).unwrap();
        assert!(array.capacity() <= 2 * array.size());
        assert_eq!(array.exact_match("a000000"), Some(0));
        assert_eq!(array.exact_match("a299999"), Some(299_999));
        assert_eq!(array.exact_match("😀"), Some(300_000));
    }

    #[test]
    fn test_non_bmp_characters() {
        let config = DoubleArrayConfig {
            initial_capacity: 16,
            ..DoubleArrayConfig::memory_preset()
        };
        let builder = DoubleArrayTrieBuilder::with_config(config).unwrap();
        let keys = ["a", "ก", "กา", "😀", "😀😀"];
        let array = builder.build(&keys).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(array.exact_match(key), Some(i as u32));
        }
        assert_eq!(array.exact_match("😀ก"), None);
    }

    #[test]
    fn test_deep_key_does_not_recurse() {
        let long: String = std::iter::repeat('x').take(20_000).collect();
        let array = small_builder().build(&[long.as_str()]).unwrap();
        assert_eq!(array.exact_match(&long), Some(0));
        assert_eq!(array.exact_match(&long[..19_999]), None);
    }

    #[test]
    fn test_without_shrink_keeps_capacity() {
        let config = DoubleArrayConfig {
            auto_shrink: false,
            ..DoubleArrayConfig::memory_preset()
        };
        let builder = DoubleArrayTrieBuilder::with_config(config).unwrap();
        let array = builder.build(&["a", "b"]).unwrap();
        assert!(array.capacity() >= 8192);
        assert!(array.size() < array.capacity());
        assert_eq!(array.exact_match("b"), Some(1));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DoubleArrayConfig {
            min_growth_factor: 1.0,
            ..Default::default()
        };
        assert!(DoubleArrayTrieBuilder::with_config(config).is_err());
    }

    #[test]
    fn test_build_trie() {
        let trie = small_builder()
            .build_trie(&["one", "three", "two"], vec![1, 3, 2])
            .unwrap();
        assert_eq!(trie.get("three"), Some(&3));
        assert_eq!(trie.get("four"), None);
    }
}
