//! Configuration APIs for seadat
//!
//! Tunables of the double-array builder and loader live in
//! [`DoubleArrayConfig`]. The occupancy threshold and growth factor steer
//! construction speed and array density only; any valid setting yields a
//! structure that answers every query identically.
//!
//! # Preset Configurations
//!
//! ```rust
//! use seadat::config::{Config, DoubleArrayConfig};
//!
//! // Large first allocation, suitable for full language dictionaries
//! let config = DoubleArrayConfig::performance_preset();
//! assert!(config.validate().is_ok());
//!
//! // Small first allocation, grows on demand
//! let config = DoubleArrayConfig::memory_preset();
//! assert!(config.initial_capacity < DoubleArrayConfig::default().initial_capacity);
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use seadat::config::{Config, DoubleArrayConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads SEADAT_DAT_INITIAL_CAPACITY and friends
//! let config = DoubleArrayConfig::from_env()?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod double_array;


pub use double_array::{DoubleArrayConfig, MAX_LOAD_MARGIN};

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables with the
    /// `SEADAT_` prefix.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix("SEADAT_")
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// Unset or unparsable variables keep their default value. The result is
    /// validated before it is returned.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset tuned for build throughput at the cost of memory.
    fn performance_preset() -> Self;

    /// Preset tuned for a small memory footprint.
    fn memory_preset() -> Self;

    /// Preset tuned for predictable build latency.
    fn realtime_preset() -> Self;

    /// Balanced preset, identical to the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when the variable
/// is unset or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean environment variable.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive) as true,
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
