//! Double Array Trie with a value table
//!
//! [`DoubleArrayTrie`] pairs compiled [`DoubleArray`] cells with a table of
//! values indexed by the decoded value index of each key. The arrays are
//! immutable after construction; values can be replaced in place by key.
//!
//! # Thread safety
//!
//! All queries take `&self` and never mutate, so a trie can be shared across
//! threads behind an `Arc`. [`set`](DoubleArrayTrie::set) needs `&mut self`;
//! concurrent updates of distinct keys through a shared reference are possible
//! with a value type that provides its own synchronization (atomics, `Mutex`).

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::fsa::double_array::{CommonPrefixIter, DoubleArray};
use crate::fsa::double_array_builder::DoubleArrayTrieBuilder;
use crate::fsa::searcher::Searcher;
use crate::fsa::traits::{FiniteStateAutomaton, StatisticsProvider, TrieStats};
use crate::StateId;

/// Dictionary mapping strings to values of type `V`
///
/// # Examples
///
/// ```rust
/// use seadat::fsa::DoubleArrayTrie;
///
/// let mut trie = DoubleArrayTrie::with_values(&["a", "ab", "b"], vec![1, 2, 3]).unwrap();
/// assert_eq!(trie.get("ab"), Some(&2));
/// assert_eq!(trie.get("c"), None);
///
/// assert!(trie.set("b", 30));
/// assert_eq!(trie.get("b"), Some(&30));
/// assert!(!trie.set("c", 4));
/// ```
#[derive(Clone)]
pub struct DoubleArrayTrie<V> {
    array: DoubleArray,
    values: Vec<V>,
}

impl<V> DoubleArrayTrie<V> {
    /// Create an empty, unusable trie
    pub fn new() -> Self {
        Self {
            array: DoubleArray::new(),
            values: Vec::new(),
        }
    }

    /// Pair compiled arrays with a value table
    ///
    /// The table is indexed by the value indices stored in `array`; indices
    /// with no entry in `values` answer `None`.
    pub fn from_parts(array: DoubleArray, values: Vec<V>) -> Self {
        Self { array, values }
    }

    /// Build from sorted keys with the default configuration; the key at
    /// position `i` maps to `values[i]`
    pub fn with_values<K: AsRef<str>>(keys: &[K], values: Vec<V>) -> Result<Self> {
        DoubleArrayTrieBuilder::new().build_trie(keys, values)
    }

    /// Build from an ordered map
    pub fn from_sorted_map<K: AsRef<str>>(map: BTreeMap<K, V>) -> Result<Self> {
        Self::from_sorted_pairs(map)
    }

    /// Build from `(key, value)` pairs in ascending key order
    ///
    /// Pairs that are out of order abort the build with
    /// [`BuildError::UnsortedInput`](crate::error::BuildError::UnsortedInput).
    pub fn from_sorted_pairs<K, I>(pairs: I) -> Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let (keys, values): (Vec<K>, Vec<V>) = pairs.into_iter().unzip();
        Self::with_values(&keys, values)
    }

    /// Split into the arrays and the value table
    pub fn into_parts(self) -> (DoubleArray, Vec<V>) {
        (self.array, self.values)
    }

    /// The compiled arrays
    pub fn array(&self) -> &DoubleArray {
        &self.array
    }

    pub(crate) fn array_mut(&mut self) -> &mut DoubleArray {
        &mut self.array
    }

    /// The value table
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Value stored at `index`
    pub fn value(&self, index: u32) -> Option<&V> {
        self.values.get(index as usize)
    }

    /// Number of entries in the value table
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the value table is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the arrays are built or loaded
    pub fn is_usable(&self) -> bool {
        self.array.is_usable()
    }

    /// Release the arrays; the value table is kept for a later reload
    pub fn clear(&mut self) {
        self.array.clear();
    }

    /// Value of `key`
    #[inline]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.value(self.array.exact_match(key)?)
    }

    /// Value of a key given as characters
    pub fn get_chars(&self, key: &[char]) -> Option<&V> {
        self.value(self.array.exact_match_chars(key)?)
    }

    /// Mutable value of `key`
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.array.exact_match(key)?;
        self.values.get_mut(index as usize)
    }

    /// Replace the value of an existing key
    ///
    /// Returns `false` and leaves the trie untouched if `key` is absent. The
    /// arrays are never modified.
    pub fn set(&mut self, key: &str, value: V) -> bool {
        match self.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Value index of `key`
    pub fn exact_match(&self, key: &str) -> Option<u32> {
        self.array.exact_match(key)
    }

    /// Value index of the key spelled by `key` starting at state `from`
    pub fn exact_match_from(&self, key: &[char], from: StateId) -> Option<u32> {
        self.array.exact_match_from(key, from)
    }

    /// Check if `key` is in the dictionary
    pub fn contains_key(&self, key: &str) -> bool {
        self.array.exact_match(key).is_some()
    }

    /// Check if the `count` characters of `text` at `offset` form a key
    ///
    /// A range reaching past the end of `text` is never a key.
    pub fn contains(&self, text: &[char], offset: usize, count: usize) -> bool {
        offset
            .checked_add(count)
            .and_then(|end| text.get(offset..end))
            .map_or(false, |key| self.array.exact_match_chars(key).is_some())
    }

    /// Value indices of every key that is a prefix of `key`, shortest first
    pub fn common_prefix_search(&self, key: &str) -> Vec<u32> {
        self.array.common_prefix_search(key)
    }

    /// Lazily enumerate `(length in chars, value index)` of the keys that
    /// prefix `key`
    pub fn common_prefix_iter<'a>(&'a self, key: &'a str) -> CommonPrefixIter<'a, std::str::Chars<'a>> {
        self.array.common_prefix_iter(key)
    }

    /// Every key that is a prefix of `key`, paired with its value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seadat::fsa::DoubleArrayTrie;
    ///
    /// let trie = DoubleArrayTrie::with_values(&["a", "ab", "b"], vec![1, 2, 3]).unwrap();
    /// assert_eq!(
    ///     trie.common_prefix_search_with_value("abc"),
    ///     vec![("a", &1), ("ab", &2)]
    /// );
    /// ```
    pub fn common_prefix_search_with_value<'k>(&self, key: &'k str) -> Vec<(&'k str, &V)> {
        let mut ends = key
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(key.len()));
        let mut consumed = 0;
        let mut end = 0;
        let mut result = Vec::new();

        for (length, index) in self.array.common_prefix_iter(key) {
            while consumed <= length {
                end = ends.next().unwrap_or(key.len());
                consumed += 1;
            }
            if let Some(value) = self.value(index) {
                result.push((&key[..end], value));
            }
        }
        result
    }

    /// Every key that is a prefix of `text[begin..]`, as a slice of `text`
    /// paired with its value
    pub fn common_prefix_search_with_value_at<'t>(
        &self,
        text: &'t [char],
        begin: usize,
    ) -> Vec<(&'t [char], &V)> {
        let Some(rest) = text.get(begin..) else {
            return Vec::new();
        };
        self.array
            .common_prefix_iter_chars(rest)
            .filter_map(|(length, index)| Some((&rest[..length], self.value(index)?)))
            .collect()
    }

    /// Root state
    pub fn root(&self) -> StateId {
        self.array.root()
    }

    /// Single-step transition from `state` on `c`
    #[inline]
    pub fn transition(&self, state: StateId, c: char) -> Option<StateId> {
        self.array.transition(state, c)
    }

    /// Walk `path` from the root
    pub fn transition_path(&self, path: &str) -> Option<StateId> {
        self.array.transition_path(path)
    }

    /// Walk `path` from an arbitrary state
    pub fn transition_path_from(&self, path: &str, from: StateId) -> Option<StateId> {
        self.array.transition_path_from(path, from)
    }

    /// Value of the key ending at `state`, without consuming input
    pub fn output(&self, state: StateId) -> Option<&V> {
        self.value(self.array.output_index(state)?)
    }

    /// Scan `text` from `offset` for every dictionary match
    pub fn searcher<'a>(&'a self, text: &'a [char], offset: usize) -> Searcher<'a, V> {
        Searcher::new(&self.array, &self.values, text, offset)
    }
}

impl<V> Default for DoubleArrayTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for DoubleArrayTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoubleArrayTrie")
            .field("size", &self.array.size())
            .field("capacity", &self.array.capacity())
            .field("values", &self.values.len())
            .finish()
    }
}

impl<V> FiniteStateAutomaton for DoubleArrayTrie<V> {
    fn root(&self) -> StateId {
        self.array.root()
    }

    fn is_final(&self, state: StateId) -> bool {
        self.array.output_index(state).is_some()
    }

    fn transition(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.array.transition(state, symbol)
    }
}

impl<V> StatisticsProvider for DoubleArrayTrie<V> {
    fn stats(&self) -> TrieStats {
        TrieStats {
            num_values: self.values.len(),
            ..self.array.stats()
        }
    }
}
