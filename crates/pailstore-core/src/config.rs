//! Configuration for a pailstore instance
//!
//! A store is explicitly constructed from a `StoreConfig` — there is no
//! process-global instance. The host decides the lifecycle and the data path.

use std::path::{Path, PathBuf};

/// Default on-disk location, relative to the process working directory.
pub const DEFAULT_DATA_PATH: &str = "data/store.txt";

/// Buckets allocated at construction. Capacity only ever doubles from here.
pub const DEFAULT_INITIAL_BUCKETS: usize = 16;

/// Load factor above which the bucket table doubles.
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.75;

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Flat file that receives the full-table snapshot on every mutation
    pub data_path: PathBuf,
    /// Bucket count at construction (must be > 0)
    pub initial_buckets: usize,
    /// Resize trigger: grow when entries / buckets exceeds this
    pub load_factor_threshold: f64,
}

impl StoreConfig {
    /// Default configuration with a custom data file path.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            data_path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.data_path.as_os_str().is_empty() {
            return Err("data_path must not be empty".into());
        }
        if self.initial_buckets == 0 {
            return Err("initial_buckets must be > 0".into());
        }
        if !self.load_factor_threshold.is_finite()
            || self.load_factor_threshold <= 0.0
            || self.load_factor_threshold >= 1.0
        {
            return Err("load_factor_threshold must be in (0.0, 1.0)".into());
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            initial_buckets: DEFAULT_INITIAL_BUCKETS,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
        }
    }
}
