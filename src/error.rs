//! Error handling for the seadat library
//!
//! This module provides the error types returned by construction, persistence
//! and configuration operations. Query operations never fail: an absent key is
//! reported as `None`, not as an error.

use thiserror::Error;

/// Reasons a double-array construction can be aborted
///
/// Both conditions are terminal for the build attempt that raised them. The
/// partially written arrays are discarded and the structure has to be rebuilt
/// from a corrected input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The transition code of a key decreased relative to its predecessor
    /// at the same depth, which means the input was not in ascending order
    #[error("keys are not sorted: key #{index} breaks ascending order at depth {depth}")]
    UnsortedInput {
        /// Position of the offending key in the input sequence
        index: usize,
        /// Character depth at which the order was violated
        depth: usize,
    },

    /// A terminal value would encode to a non-negative cell and be mistaken
    /// for a transition offset
    #[error("value {value} of key #{index} collides with the transition range")]
    ValueCollision {
        /// Position of the key that owns the value
        index: usize,
        /// The value index that could not be encoded
        value: i64,
    },
}

/// Main error type for the seadat library
#[derive(Error, Debug)]
pub enum SeadatError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format or corruption
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message describing the issue
        message: String,
    },

    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Double-array construction failure
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    /// Trie related errors (capacity limits, malformed build arguments)
    #[error("Trie error: {message}")]
    Trie {
        /// Error message describing the trie issue
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl SeadatError {
    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a trie error
    pub fn trie<S: Into<String>>(message: S) -> Self {
        Self::Trie {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unexpected-end-of-input error
    pub fn unexpected_eof<S: Into<String>>(message: S) -> Self {
        Self::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            message.into(),
        ))
    }

    /// The build failure carried by this error, if any
    pub fn as_build_error(&self) -> Option<&BuildError> {
        match self {
            Self::Build(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Build failures and corrupt data require a fresh input; I/O errors may
    /// succeed on retry.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::InvalidData { .. } => false,
            Self::OutOfBounds { .. } => false,
            Self::Build(_) => false,
            Self::Trie { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidData { .. } => "data",
            Self::OutOfBounds { .. } => "bounds",
            Self::Build(BuildError::UnsortedInput { .. }) => "unsorted",
            Self::Build(BuildError::ValueCollision { .. }) => "value",
            Self::Trie { .. } => "trie",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SeadatError>;
