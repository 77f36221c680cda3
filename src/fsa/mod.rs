//! Finite State Automata and Trie structures
//!
//! This module provides the double array trie: its builder, query engine,
//! streaming scanner and binary persistence, plus the automaton traits that
//! greedy segmenters program against.

pub mod double_array;
pub mod double_array_builder;
mod double_array_io;
pub mod double_array_trie;
pub mod searcher;
pub mod traits;

// Re-export core types
pub use double_array::{CommonPrefixIter, DoubleArray, UNIT_SIZE};
pub use double_array_builder::DoubleArrayTrieBuilder;
pub use double_array_trie::DoubleArrayTrie;
pub use searcher::{SearchMatch, Searcher};
pub use traits::{FiniteStateAutomaton, StatisticsProvider, TrieStats};
