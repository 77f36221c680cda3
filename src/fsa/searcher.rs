//! Streaming dictionary scanner
//!
//! A [`Searcher`] walks a character buffer and reports every dictionary key
//! occurring in it, ordered by start offset and then by length. Greedy
//! segmenters consume it to build a lattice of candidate words.

use std::iter::FusedIterator;

use crate::fsa::double_array::DoubleArray;

/// A dictionary key found in the scanned text
#[derive(Debug, PartialEq, Eq)]
pub struct SearchMatch<'a, V> {
    /// Start offset of the match, in characters
    pub begin: usize,
    /// Length of the match, in characters
    pub length: usize,
    /// Value index of the matched key
    pub index: u32,
    /// The matched key's value, if a value table is attached
    pub value: Option<&'a V>,
}

impl<'a, V> SearchMatch<'a, V> {
    /// Offset one past the last matched character
    pub fn end(&self) -> usize {
        self.begin + self.length
    }
}

impl<'a, V> Clone for SearchMatch<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, V> Copy for SearchMatch<'a, V> {}

/// Cursor yielding every dictionary match in a buffer
///
/// Matches sharing a start offset are reported shortest first, since the walk
/// continues from the state that produced the previous match. Once the start
/// offset reaches the end of the buffer the scanner is exhausted for good.
///
/// # Examples
///
/// ```rust
/// use seadat::fsa::DoubleArrayTrie;
///
/// let trie = DoubleArrayTrie::with_values(&["a", "ab", "b"], vec![1, 2, 3]).unwrap();
/// let text: Vec<char> = "ab".chars().collect();
/// let found: Vec<_> = trie
///     .searcher(&text, 0)
///     .map(|m| (m.begin, m.length, *m.value.unwrap()))
///     .collect();
/// assert_eq!(found, vec![(0, 1, 1), (0, 2, 2), (1, 1, 3)]);
/// ```
pub struct Searcher<'a, V> {
    array: &'a DoubleArray,
    values: &'a [V],
    text: &'a [char],
    begin: usize,
    i: usize,
    state: i32,
    exhausted: bool,
}

impl<'a, V> Searcher<'a, V> {
    pub(crate) fn new(
        array: &'a DoubleArray,
        values: &'a [V],
        text: &'a [char],
        offset: usize,
    ) -> Self {
        Self {
            array,
            values,
            text,
            begin: offset,
            i: offset,
            state: array.root() as i32,
            exhausted: offset >= text.len(),
        }
    }

    /// Current candidate start offset
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Whether every start offset has been scanned
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Move to the next start offset, restarting the walk from the root
    fn advance_begin(&mut self) -> bool {
        self.begin += 1;
        if self.begin >= self.text.len() {
            self.exhausted = true;
            return false;
        }
        self.i = self.begin;
        self.state = self.array.root() as i32;
        true
    }
}

impl<'a, V> Iterator for Searcher<'a, V> {
    type Item = SearchMatch<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        loop {
            if self.i >= self.text.len() && !self.advance_begin() {
                return None;
            }
            let Some(next) = self.array.child(self.state, self.text[self.i]) else {
                if !self.advance_begin() {
                    return None;
                }
                continue;
            };
            self.state = next;
            self.i += 1;
            if let Some(index) = self.array.terminal(next) {
                return Some(SearchMatch {
                    begin: self.begin,
                    length: self.i - self.begin,
                    index,
                    value: self.values.get(index as usize),
                });
            }
        }
    }
}

impl<'a, V> FusedIterator for Searcher<'a, V> {}
