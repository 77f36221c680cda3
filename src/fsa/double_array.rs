//! Double array storage and query engine
//!
//! A [`DoubleArray`] holds the two parallel integer arrays of a compiled
//! dictionary:
//!
//! ```text
//! child slot    p = base[s] + code(c)          code(c) = c as u32 + 1
//! valid edge    check[p] == base[s]
//! leaf          check[b] == b && base[b] < 0    value index = -base[b] - 1
//! ```
//!
//! A *state* is the base offset reached by a walk (the root state is
//! `base[0]`, fixed to 1). Code 0 is reserved for the end-of-key marker, so
//! the slot `b + 0` of a state `b` holds the leaf of the key that ends there.
//! A cell therefore means either "offset of my children" (non-negative) or
//! "encoded value index" (negative); [`DoubleArray::output_index`] is the only
//! place that decodes the latter.
//!
//! The arrays carry no values. [`DoubleArrayTrie`](super::DoubleArrayTrie)
//! pairs them with a value table.

use std::fmt;
use std::str::Chars;

use crate::error::{Result, SeadatError};
use crate::fsa::searcher::Searcher;
use crate::fsa::traits::{FiniteStateAutomaton, StatisticsProvider, TrieStats};
use crate::StateId;

/// Bytes per slot in the serialized form: one `base` and one `check` cell
pub const UNIT_SIZE: usize = 8;

/// Base offset of the root state
pub(crate) const ROOT_BASE: i32 = 1;

/// Transition code of a character; 0 is the end-of-key marker
#[inline(always)]
pub(crate) fn transition_code(c: char) -> usize {
    c as usize + 1
}

/// Compiled `base`/`check` arrays of a dictionary
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DoubleArray {
    pub(crate) base: Vec<i32>,
    pub(crate) check: Vec<i32>,
    pub(crate) size: usize,
}

impl DoubleArray {
    /// Create an empty, unusable array. Every query on it reports not-found.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble an array from raw cells
    ///
    /// `base` and `check` must have the same length and `size` must not exceed
    /// it. Cells past `size` are kept; they are the slack that a loader
    /// appends so that slot arithmetic may land just past the logical end.
    pub fn from_parts(base: Vec<i32>, check: Vec<i32>, size: usize) -> Result<Self> {
        if base.len() != check.len() {
            return Err(SeadatError::invalid_data(format!(
                "base has {} cells but check has {}",
                base.len(),
                check.len()
            )));
        }
        if size > base.len() {
            return Err(SeadatError::out_of_bounds(size, base.len()));
        }
        Ok(Self { base, check, size })
    }

    /// The `base` cells, including slack past [`size`](Self::size)
    pub fn base(&self) -> &[i32] {
        &self.base
    }

    /// The `check` cells, including slack past [`size`](Self::size)
    pub fn check(&self) -> &[i32] {
        &self.check
    }

    /// Logical size: highest slot in use plus one
    pub fn size(&self) -> usize {
        self.size
    }

    /// Physically allocated slots
    pub fn capacity(&self) -> usize {
        self.base.len()
    }

    /// Bytes per slot
    pub fn unit_size(&self) -> usize {
        UNIT_SIZE
    }

    /// Serialized size of the logical range in bytes
    pub fn total_size(&self) -> usize {
        self.size * UNIT_SIZE
    }

    /// Number of slots with a non-zero check cell
    pub fn nonzero_size(&self) -> usize {
        self.check.iter().filter(|&&c| c != 0).count()
    }

    /// Whether the arrays were built or loaded and not cleared since
    pub fn is_usable(&self) -> bool {
        matches!(self.base.first(), Some(&b) if b > 0)
    }

    /// Release both arrays; the structure must be rebuilt or reloaded
    pub fn clear(&mut self) {
        self.base = Vec::new();
        self.check = Vec::new();
        self.size = 0;
    }

    /// Root state, or 0 (never a valid state) when the arrays are unusable
    #[inline]
    pub fn root(&self) -> StateId {
        match self.base.first() {
            Some(&b) if b > 0 => b as StateId,
            _ => 0,
        }
    }

    #[inline(always)]
    fn root_base(&self) -> i32 {
        self.root() as i32
    }

    /// Follow the edge labelled `c` out of state `b`
    #[inline(always)]
    pub(crate) fn child(&self, b: i32, c: char) -> Option<i32> {
        if b <= 0 {
            return None;
        }
        let p = b as usize + transition_code(c);
        match self.check.get(p) {
            Some(&owner) if owner == b => self.base.get(p).copied().filter(|&next| next > 0),
            _ => None,
        }
    }

    /// Decode the value index stored for state `b`, if a key ends there
    #[inline(always)]
    pub(crate) fn terminal(&self, b: i32) -> Option<u32> {
        if b <= 0 {
            return None;
        }
        let p = b as usize;
        match (self.base.get(p), self.check.get(p)) {
            (Some(&n), Some(&owner)) if owner == b && n < 0 => Some((-1 - n) as u32),
            _ => None,
        }
    }

    #[inline]
    fn walk<I>(&self, path: I, from: i32) -> Option<i32>
    where
        I: IntoIterator<Item = char>,
    {
        let mut b = from;
        for c in path {
            b = self.child(b, c)?;
        }
        (b > 0).then_some(b)
    }

    /// Single-step transition from `state` on character `c`
    #[inline]
    pub fn transition(&self, state: StateId, c: char) -> Option<StateId> {
        let b = i32::try_from(state).ok()?;
        self.child(b, c).map(|next| next as StateId)
    }

    /// Walk `path` from the root
    pub fn transition_path(&self, path: &str) -> Option<StateId> {
        self.walk(path.chars(), self.root_base())
            .map(|b| b as StateId)
    }

    /// Walk `path` starting at an arbitrary state
    pub fn transition_path_from(&self, path: &str, from: StateId) -> Option<StateId> {
        let b = i32::try_from(from).ok()?;
        self.walk(path.chars(), b).map(|b| b as StateId)
    }

    /// Value index of the key ending at `state`, without consuming input
    #[inline]
    pub fn output_index(&self, state: StateId) -> Option<u32> {
        self.terminal(i32::try_from(state).ok()?)
    }

    /// Value index of `key`, or `None` if it is not in the dictionary
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seadat::fsa::DoubleArrayTrieBuilder;
    ///
    /// let array = DoubleArrayTrieBuilder::new().build(&["a", "ab", "b"]).unwrap();
    /// assert_eq!(array.exact_match("ab"), Some(1));
    /// assert_eq!(array.exact_match("c"), None);
    /// ```
    pub fn exact_match(&self, key: &str) -> Option<u32> {
        self.terminal(self.walk(key.chars(), self.root_base())?)
    }

    /// Value index of a key given as characters
    pub fn exact_match_chars(&self, key: &[char]) -> Option<u32> {
        self.terminal(self.walk(key.iter().copied(), self.root_base())?)
    }

    /// Value index of the key formed by the path from `from` along `key`
    ///
    /// Lets a matcher resume from a state it reached earlier instead of
    /// re-walking the shared prefix.
    pub fn exact_match_from(&self, key: &[char], from: StateId) -> Option<u32> {
        let b = i32::try_from(from).ok()?;
        self.terminal(self.walk(key.iter().copied(), b)?)
    }

    /// Value indices of every dictionary key that is a prefix of `key`,
    /// shortest first
    pub fn common_prefix_search(&self, key: &str) -> Vec<u32> {
        self.common_prefix_iter(key).map(|(_, index)| index).collect()
    }

    /// Like [`common_prefix_search`](Self::common_prefix_search) over a
    /// character slice, starting the walk at `from`
    pub fn common_prefix_search_from(&self, key: &[char], from: StateId) -> Vec<u32> {
        let b = i32::try_from(from).unwrap_or(0);
        CommonPrefixIter::new(self, key.iter().copied(), b)
            .map(|(_, index)| index)
            .collect()
    }

    /// Lazily enumerate `(prefix length in chars, value index)` for every
    /// dictionary key that is a prefix of `key`
    pub fn common_prefix_iter<'a>(&'a self, key: &'a str) -> CommonPrefixIter<'a, Chars<'a>> {
        CommonPrefixIter::new(self, key.chars(), self.root_base())
    }

    /// Character-slice form of [`common_prefix_iter`](Self::common_prefix_iter)
    pub fn common_prefix_iter_chars<'a>(
        &'a self,
        key: &'a [char],
    ) -> CommonPrefixIter<'a, std::iter::Copied<std::slice::Iter<'a, char>>> {
        CommonPrefixIter::new(self, key.iter().copied(), self.root_base())
    }

    /// Scan `text` from `offset` for every dictionary match
    ///
    /// Arrays carry no values, so every match reports `value: None`; use the
    /// match's `index`.
    pub fn searcher<'a>(&'a self, text: &'a [char], offset: usize) -> Searcher<'a, ()> {
        Searcher::new(self, &[], text, offset)
    }
}

impl fmt::Debug for DoubleArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoubleArray")
            .field("size", &self.size)
            .field("capacity", &self.base.len())
            .field("root", &self.root())
            .finish()
    }
}

impl FiniteStateAutomaton for DoubleArray {
    fn root(&self) -> StateId {
        DoubleArray::root(self)
    }

    fn is_final(&self, state: StateId) -> bool {
        self.output_index(state).is_some()
    }

    fn transition(&self, state: StateId, symbol: char) -> Option<StateId> {
        DoubleArray::transition(self, state, symbol)
    }
}

impl StatisticsProvider for DoubleArray {
    fn stats(&self) -> TrieStats {
        TrieStats {
            size: self.size,
            capacity: self.capacity(),
            nonzero_size: self.nonzero_size(),
            unit_size: UNIT_SIZE,
            total_size: self.total_size(),
            num_values: 0,
        }
    }
}

/// Iterator over the dictionary keys that prefix an input
///
/// Yields `(length in chars, value index)` in order of increasing length.
pub struct CommonPrefixIter<'a, I> {
    array: &'a DoubleArray,
    input: I,
    state: i32,
    consumed: usize,
    tested: bool,
}

impl<'a, I> CommonPrefixIter<'a, I>
where
    I: Iterator<Item = char>,
{
    fn new(array: &'a DoubleArray, input: I, from: i32) -> Self {
        Self {
            array,
            input,
            state: from,
            consumed: 0,
            tested: false,
        }
    }
}

impl<'a, I> Iterator for CommonPrefixIter<'a, I>
where
    I: Iterator<Item = char>,
{
    type Item = (usize, u32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state <= 0 {
                return None;
            }
            if !self.tested {
                self.tested = true;
                if let Some(index) = self.array.terminal(self.state) {
                    return Some((self.consumed, index));
                }
            }
            let Some(c) = self.input.next() else {
                self.state = 0;
                return None;
            };
            self.state = self.array.child(self.state, c).unwrap_or(0);
            self.consumed += 1;
            self.tested = false;
        }
    }
}

impl<'a, I> std::iter::FusedIterator for CommonPrefixIter<'a, I> where I: Iterator<Item = char> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsa::DoubleArrayTrieBuilder;

    fn sample() -> DoubleArray {
        DoubleArrayTrieBuilder::new()
            .build(&["a", "ab", "abc", "b", "bcd"])
            .unwrap()
    }

    #[test]
    fn test_empty_array_is_unusable() {
        let array = DoubleArray::new();
        assert!(!array.is_usable());
        assert_eq!(array.root(), 0);
        assert_eq!(array.exact_match(""), None);
        assert_eq!(array.exact_match("a"), None);
        assert!(array.common_prefix_search("abc").is_empty());
        assert_eq!(array.transition(1, 'a'), None);
        assert_eq!(array.output_index(1), None);
    }

    #[test]
    fn test_exact_match() {
        let array = sample();
        assert!(array.is_usable());
        assert_eq!(array.root(), ROOT_BASE as StateId);
        assert_eq!(array.exact_match("a"), Some(0));
        assert_eq!(array.exact_match("ab"), Some(1));
        assert_eq!(array.exact_match("abc"), Some(2));
        assert_eq!(array.exact_match("b"), Some(3));
        assert_eq!(array.exact_match("bcd"), Some(4));
        assert_eq!(array.exact_match("bc"), None);
        assert_eq!(array.exact_match(""), None);
        assert_eq!(array.exact_match("abcd"), None);
        assert_eq!(array.exact_match("z"), None);
    }

    #[test]
    fn test_exact_match_chars_and_from() {
        let array = sample();
        let key: Vec<char> = "abc".chars().collect();
        assert_eq!(array.exact_match_chars(&key), Some(2));

        let after_a = array.transition(array.root(), 'a').unwrap();
        assert_eq!(array.exact_match_from(&key[1..], after_a), Some(2));
        assert_eq!(array.exact_match_from(&[], after_a), Some(0));
        assert_eq!(array.exact_match_from(&key[1..2], after_a), Some(1));
        assert_eq!(array.exact_match_from(&key[..1], after_a), None);
    }

    #[test]
    fn test_common_prefix_search() {
        let array = sample();
        assert_eq!(array.common_prefix_search("abcd"), vec![0, 1, 2]);
        assert_eq!(array.common_prefix_search("ab"), vec![0, 1]);
        assert_eq!(array.common_prefix_search("bcx"), vec![3]);
        assert!(array.common_prefix_search("xyz").is_empty());
        assert!(array.common_prefix_search("").is_empty());

        let lengths: Vec<usize> = array.common_prefix_iter("abcd").map(|(len, _)| len).collect();
        assert_eq!(lengths, vec![1, 2, 3]);
    }

    #[test]
    fn test_common_prefix_search_from_state() {
        let array = sample();
        let after_b = array.transition_path("b").unwrap();
        let rest: Vec<char> = "cd".chars().collect();
        assert_eq!(array.common_prefix_search_from(&rest, after_b), vec![3, 4]);
    }

    #[test]
    fn test_transitions_and_output() {
        let array = sample();
        let root = array.root();
        let a = array.transition(root, 'a').unwrap();
        assert_eq!(array.output_index(a), Some(0));
        let ab = array.transition(a, 'b').unwrap();
        assert_eq!(array.output_index(ab), Some(1));
        assert_eq!(array.transition(ab, 'x'), None);
        assert_eq!(array.transition_path("ab"), Some(ab));
        assert_eq!(array.transition_path_from("b", a), Some(ab));
        assert_eq!(array.transition_path("bc").and_then(|s| array.output_index(s)), None);
        assert_eq!(array.output_index(root), None);
        assert_eq!(array.transition(u32::MAX, 'a'), None);
    }

    #[test]
    fn test_fsa_interface() {
        let array = sample();
        assert!(array.accepts("abc"));
        assert!(!array.accepts("bc"));
        let input: Vec<char> = "abcz".chars().collect();
        assert_eq!(array.longest_prefix(&input), Some(3));
    }

    #[test]
    fn test_stats_and_clear() {
        let mut array = sample();
        let stats = array.stats();
        assert_eq!(stats.size, array.size());
        assert_eq!(stats.unit_size, UNIT_SIZE);
        assert_eq!(stats.total_size, array.size() * 8);
        assert!(stats.nonzero_size > 0);
        assert!(stats.nonzero_size <= stats.size);

        array.clear();
        assert!(!array.is_usable());
        assert_eq!(array.size(), 0);
        assert_eq!(array.exact_match("a"), None);
    }

    #[test]
    fn test_from_parts_validation() {
        assert!(DoubleArray::from_parts(vec![1, 0], vec![0], 1).is_err());
        assert!(DoubleArray::from_parts(vec![1, 0], vec![0, 0], 3).is_err());
        let array = DoubleArray::from_parts(vec![1, 0], vec![0, 0], 1).unwrap();
        assert!(array.is_usable());
        assert_eq!(array.exact_match("a"), None);
    }

    #[test]
    fn test_corrupt_cells_do_not_panic() {
        // Slot 2 claims to be a child of the root but points to a negative base.
        let array = DoubleArray::from_parts(vec![1, 0, -7, 0], vec![0, 0, 1, 0], 4).unwrap();
        assert_eq!(array.exact_match("\u{0}"), None);
        assert_eq!(array.transition(1, '\u{0}'), None);
        assert_eq!(array.exact_match("\u{10FFFF}"), None);
    }
}
