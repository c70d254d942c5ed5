//! # Engine Configuration
//!
//! Every tuning constant of the over simulator in one place.
//!
//! ## Usage
//! ```rust
//! use cricket_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let offline = EngineConfig::offline();
//! assert!(!offline.ai.enabled);
//! ```

mod ai_config;
mod cache_config;
mod extras_config;
mod phase_config;
mod special_config;

pub use ai_config::AiConfig;
pub use cache_config::CacheConfig;
pub use extras_config::ExtrasConfig;
pub use phase_config::PhaseConfig;
pub use special_config::SpecialBoostConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub phase: PhaseConfig,
    #[serde(default)]
    pub extras: ExtrasConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub special: SpecialBoostConfig,
}

impl EngineConfig {
    /// Realistic defaults.
    pub fn realistic() -> Self {
        Self::default()
    }

    /// No external model calls.
    pub fn offline() -> Self {
        let mut cfg = Self::default();
        cfg.ai.enabled = false;
        cfg
    }

    /// For tests: no model, no cache, no extras.
    pub fn deterministic() -> Self {
        let mut cfg = Self::offline();
        cfg.cache.enabled = false;
        cfg.extras = ExtrasConfig::none();
        cfg
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads `.json` files as JSON and anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert!(cfg.ai.enabled);
        assert!(cfg.cache.enabled);
        assert!((cfg.phase.powerplay_fraction - 0.3).abs() < 1e-6);
        assert!(cfg.extras.total() > 0.0);
    }

    #[test]
    fn test_deterministic_preset() {
        let cfg = EngineConfig::deterministic();
        assert!(!cfg.ai.enabled);
        assert!(!cfg.cache.enabled);
        assert_eq!(cfg.extras.total(), 0.0);
    }

    #[test]
    fn test_t20_phase_boundaries() {
        let phase = PhaseConfig::default();
        assert_eq!(phase.powerplay_overs(20), 6);
        assert_eq!(phase.death_start(20), 16);
        assert_eq!(phase.powerplay_overs(50), 15);
        assert_eq!(phase.death_start(50), 40);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = EngineConfig::from_yaml_str("ai:\n  enabled: false\n  timeout_ms: 250\n  lookahead_overs: 1\n")
            .unwrap();
        assert!(!cfg.ai.enabled);
        assert_eq!(cfg.ai.timeout_ms, 250);
        assert!(cfg.cache.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", r#"{"cache": {"enabled": false, "rrr_bucket_width": 2.0, "capacity": 8}}"#)
            .unwrap();
        let cfg = EngineConfig::load(file.path()).unwrap();
        assert!(!cfg.cache.enabled);
        assert_eq!(cfg.cache.capacity, 8);
        assert!(cfg.ai.enabled);
    }
}
