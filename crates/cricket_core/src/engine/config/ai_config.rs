//! External model strategy settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Consult the model at all (default: true)
    pub enabled: bool,
    /// Upper bound on one model call in milliseconds (default: 3000)
    pub timeout_ms: u64,
    /// Overs of narrative the model is asked to plan ahead (default: 2)
    pub lookahead_overs: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self { enabled: true, timeout_ms: 3000, lookahead_overs: 2 }
    }
}
