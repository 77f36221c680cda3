//! Core automaton traits
//!
//! Greedy segmenters drive dictionary automata one character at a time; these
//! traits let them do so without depending on a concrete trie layout.

use crate::StateId;

/// Core trait for finite state automaton operations over characters
pub trait FiniteStateAutomaton {
    /// Get the initial/root state
    fn root(&self) -> StateId;

    /// Check if a state is final (a dictionary key ends here)
    fn is_final(&self, state: StateId) -> bool;

    /// Transition from a state given an input character
    fn transition(&self, state: StateId, symbol: char) -> Option<StateId>;

    /// Check if the automaton accepts a given input sequence
    fn accepts(&self, input: &str) -> bool {
        let mut state = self.root();
        for symbol in input.chars() {
            match self.transition(state, symbol) {
                Some(next_state) => state = next_state,
                None => return false,
            }
        }
        self.is_final(state)
    }

    /// Length in characters of the longest prefix of `input` that is accepted
    fn longest_prefix(&self, input: &[char]) -> Option<usize> {
        let mut state = self.root();
        let mut last_final = None;

        for (i, &symbol) in input.iter().enumerate() {
            if self.is_final(state) {
                last_final = Some(i);
            }

            match self.transition(state, symbol) {
                Some(next_state) => state = next_state,
                None => return last_final,
            }
        }

        if self.is_final(state) {
            Some(input.len())
        } else {
            last_final
        }
    }
}

/// Trait for structures that report size statistics
pub trait StatisticsProvider {
    /// Get structure statistics
    fn stats(&self) -> TrieStats;
}

/// Size accounting of a double array
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrieStats {
    /// Logical size: highest slot in use plus one
    pub size: usize,
    /// Physically allocated slots
    pub capacity: usize,
    /// Slots with a non-zero check cell
    pub nonzero_size: usize,
    /// Bytes per slot (one base and one check cell)
    pub unit_size: usize,
    /// Serialized array bytes, `size * unit_size`
    pub total_size: usize,
    /// Number of entries in the value table
    pub num_values: usize,
}

impl TrieStats {
    /// Fraction of the logical range that is occupied
    pub fn occupancy(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.nonzero_size as f64 / self.size as f64
        }
    }
}
