//! Over cache settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve and record memoized overs (default: true)
    pub enabled: bool,
    /// Width of a required-run-rate bucket in runs per over (default: 1.0)
    pub rrr_bucket_width: f32,
    /// Maximum stored signatures; later inserts are skipped (default: 4096)
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, rrr_bucket_width: 1.0, capacity: 4096 }
    }
}
