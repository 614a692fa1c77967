//! Analysis parameters
//!
//! Every computation takes its parameters explicitly; nothing is read from
//! ambient state, so two calls with equal inputs always see equal
//! configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters for windowed formation/compactness analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sliding-window width in minutes, centered on the target minute.
    pub window_minutes: u32,
    /// Minimum in-window actions for a player to qualify for a sample.
    pub min_window_actions: u32,
    /// Outfield x-percentile at or below which a player is a defender.
    pub defender_percentile: f32,
    /// Outfield x-percentile above which a player is an attacker.
    pub attacker_percentile: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_minutes: 10,
            min_window_actions: 3,
            defender_percentile: 0.30,
            attacker_percentile: 0.70,
        }
    }
}

impl AnalysisConfig {
    /// Window half-width in minutes (integer division, W=10 gives ±5).
    pub fn half_window(&self) -> u32 {
        self.window_minutes / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_minutes < 1 {
            return Err(ConfigError::WindowTooSmall(self.window_minutes));
        }
        let (lower, upper) = (self.defender_percentile, self.attacker_percentile);
        if !(lower > 0.0 && lower < upper && upper < 1.0) {
            return Err(ConfigError::InvalidBandSplit { lower, upper });
        }
        Ok(())
    }
}
