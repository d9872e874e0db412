use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for one aggregation run.
///
/// Defaults match league rules; collaborators may load overrides from JSON
/// with [`EngineConfig::from_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum gap in seconds between a kill and the kill that avenges it.
    pub trade_window_secs: f64,
    /// Number of maps a single submitted batch is expected to hold at most.
    pub max_maps_per_batch: usize,
}

impl EngineConfig {
    pub const DEFAULT_TRADE_WINDOW_SECS: f64 = 3.0;
    pub const DEFAULT_MAX_MAPS_PER_BATCH: usize = 3;

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trade_window_secs: Self::DEFAULT_TRADE_WINDOW_SECS,
            max_maps_per_batch: Self::DEFAULT_MAX_MAPS_PER_BATCH,
        }
    }
}
