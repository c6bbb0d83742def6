//! Clamped exponential smoothing for the scalar scale channel.

use serde::{Deserialize, Serialize};

/// Configuration for the scale channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Lower edge of the sanity band
    pub min: f64,
    /// Upper edge of the sanity band
    pub max: f64,
    /// Exponential approach factor per frame
    pub smoothing_factor: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 5.0,
            smoothing_factor: 0.15,
        }
    }
}

/// Exponential smoothing over a scalar, clamped to a sanity band first.
///
/// Used for the homography-derived scale channel; the first pushed value
/// seeds the filter directly.
#[derive(Debug, Clone)]
pub struct ScaleFilter {
    config: ScaleConfig,
    current: Option<f64>,
}

impl ScaleFilter {
    pub fn new(config: ScaleConfig) -> Self {
        assert!(
            config.smoothing_factor > 0.0 && config.smoothing_factor <= 1.0,
            "smoothing factor must be in (0, 1]"
        );
        assert!(config.min < config.max, "scale band must be non-empty");
        Self {
            config,
            current: None,
        }
    }

    /// Clamp into the configured band, then approach exponentially.
    pub fn push(&mut self, raw: f64) -> f64 {
        let clamped = raw.clamp(self.config.min, self.config.max);
        let next = match self.current {
            Some(current) => current + (clamped - current) * self.config.smoothing_factor,
            None => clamped,
        };
        self.current = Some(next);
        next
    }

    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

impl Default for ScaleFilter {
    fn default() -> Self {
        Self::new(ScaleConfig::default())
    }
}
