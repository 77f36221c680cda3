//! Double-array builder and loader configuration.

use super::{parse_env_bool, parse_env_var, Config};
use crate::error::{Result, SeadatError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted [`DoubleArrayConfig::load_margin`]
pub const MAX_LOAD_MARGIN: usize = 1 << 24;

/// Tunables for constructing and loading a double array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleArrayConfig {
    /// Number of slots allocated before the first sibling group is placed
    pub initial_capacity: usize,
    /// Lower bound of the factor applied when the arrays have to grow
    pub min_growth_factor: f64,
    /// Fraction of occupied slots seen during a free-space search above which
    /// the search cursor jumps forward to the current scan position
    pub occupancy_threshold: f64,
    /// Extra zeroed slots appended after the loaded cells
    pub load_margin: usize,
    /// Truncate the arrays to their logical size once a build completes
    pub auto_shrink: bool,
}

impl Default for DoubleArrayConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 65536 * 32,
            min_growth_factor: 1.05,
            occupancy_threshold: 0.95,
            load_margin: 65535,
            auto_shrink: true,
        }
    }
}

impl Config for DoubleArrayConfig {
    fn validate(&self) -> Result<()> {
        if self.initial_capacity < 2 {
            return Err(SeadatError::configuration(format!(
                "initial_capacity must be at least 2, got {}",
                self.initial_capacity
            )));
        }
        if !self.min_growth_factor.is_finite() || self.min_growth_factor <= 1.0 {
            return Err(SeadatError::configuration(format!(
                "min_growth_factor must be a finite value above 1.0, got {}",
                self.min_growth_factor
            )));
        }
        if !(self.occupancy_threshold > 0.0 && self.occupancy_threshold <= 1.0) {
            return Err(SeadatError::configuration(format!(
                "occupancy_threshold must be in (0, 1], got {}",
                self.occupancy_threshold
            )));
        }
        if self.load_margin > MAX_LOAD_MARGIN {
            return Err(SeadatError::configuration(format!(
                "load_margin must be at most {}, got {}",
                MAX_LOAD_MARGIN, self.load_margin
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.initial_capacity = parse_env_var(
            &format!("{}DAT_INITIAL_CAPACITY", prefix),
            config.initial_capacity,
        );
        config.min_growth_factor = parse_env_var(
            &format!("{}DAT_MIN_GROWTH_FACTOR", prefix),
            config.min_growth_factor,
        );
        config.occupancy_threshold = parse_env_var(
            &format!("{}DAT_OCCUPANCY_THRESHOLD", prefix),
            config.occupancy_threshold,
        );
        config.load_margin =
            parse_env_var(&format!("{}DAT_LOAD_MARGIN", prefix), config.load_margin);
        config.auto_shrink =
            parse_env_bool(&format!("{}DAT_AUTO_SHRINK", prefix), config.auto_shrink);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            initial_capacity: 65536 * 64,
            min_growth_factor: 1.5,
            auto_shrink: false,
            ..Default::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            initial_capacity: 8192,
            min_growth_factor: 1.05,
            occupancy_threshold: 0.9,
            load_margin: 1024,
            auto_shrink: true,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            initial_capacity: 65536 * 32,
            min_growth_factor: 2.0,
            auto_shrink: false,
            ..Default::default()
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            SeadatError::configuration(format!("Failed to serialize double array config: {}", e))
        })?;
        std::fs::write(path, serialized).map_err(|e| {
            SeadatError::configuration(format!("Failed to write double array config file: {}", e))
        })?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SeadatError::configuration(format!("Failed to read double array config file: {}", e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SeadatError::configuration(format!("Failed to parse double array config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
