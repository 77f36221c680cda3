//! # Seadat: Double Array Trie dictionaries for Southeast-Asian tokenization
//!
//! This crate provides a compact dictionary automaton built for rule-based
//! word segmentation of scripts written without spaces (Thai, Lao, Khmer,
//! Myanmar and Vietnamese syllables). Dictionaries are compiled once from a
//! sorted key list and then answer lookups in time proportional to the key
//! length.
//!
//! ## Key Features
//!
//! - **Exact and prefix lookup**: value of a key, or every key that prefixes an input
//! - **Incremental walks**: single-character transitions from any state
//! - **Streaming scanner**: every dictionary match at every offset of a buffer
//! - **Compact persistence**: big-endian `base`/`check` dump, optionally gzip-wrapped
//! - **Lock-free reads**: built dictionaries are immutable and `Sync`
//!
//! ## Quick Start
//!
//! ```rust
//! use seadat::{DoubleArrayTrie, Result};
//!
//! fn main() -> Result<()> {
//!     let trie = DoubleArrayTrie::with_values(&["a", "ab", "b"], vec![1, 2, 3])?;
//!
//!     assert_eq!(trie.get("ab"), Some(&2));
//!     assert_eq!(trie.get("c"), None);
//!
//!     let prefixes: Vec<_> = trie
//!         .common_prefix_search("ab")
//!         .into_iter()
//!         .filter_map(|index| trie.value(index))
//!         .collect();
//!     assert_eq!(prefixes, vec![&1, &2]);
//!
//!     let text: Vec<char> = "ab".chars().collect();
//!     let matches: Vec<_> = trie
//!         .searcher(&text, 0)
//!         .map(|m| (m.begin, m.length, *m.value.unwrap()))
//!         .collect();
//!     assert_eq!(matches, vec![(0, 1, 1), (0, 2, 2), (1, 1, 3)]);
//!
//!     let bytes = trie.array().to_bytes()?;
//!     let restored = seadat::DoubleArray::from_bytes(&bytes)?;
//!     assert_eq!(restored.exact_match("ab"), Some(1));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fsa;
pub mod io;

// Re-export core types
pub use config::{Config, DoubleArrayConfig};
pub use error::{BuildError, Result, SeadatError};
pub use fsa::{
    DoubleArray, DoubleArrayTrie, DoubleArrayTrieBuilder, FiniteStateAutomaton, SearchMatch,
    Searcher, StatisticsProvider, TrieStats,
};
pub use io::{DataInput, DataOutput};

/// State identifier type for FSA operations
pub type StateId = u32;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Announce the library version on the `log` debug channel
pub fn init() {
    log::debug!("Initializing seadat v{}", VERSION);
}
