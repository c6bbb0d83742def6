//! Configuration for the full stabilization pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::integration::DetectorConfig;
use crate::tracker::{CameraModel, OcclusionConfig, ScaleConfig, SmoothingConfig};
use crate::{Error, Result};

/// Camera parameters the scene mapping is derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f64,
    /// Width over height of the camera frame
    pub aspect: f64,
    /// Working depth content is placed at, scene units
    pub depth: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 4.0 / 3.0,
            depth: 1.0,
        }
    }
}

impl CameraConfig {
    pub fn model(&self) -> CameraModel {
        CameraModel::from_degrees(self.fov_degrees, self.aspect, self.depth)
    }
}

/// Aggregate pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub smoothing: SmoothingConfig,
    pub scale: ScaleConfig,
    pub camera: CameraConfig,
    pub detector: DetectorConfig,
    pub occlusion: OcclusionConfig,
    /// Detector invocation cap in Hz, decoupled from the render rate
    pub detector_rate_hz: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            scale: ScaleConfig::default(),
            camera: CameraConfig::default(),
            detector: DetectorConfig::default(),
            occlusion: OcclusionConfig::default(),
            detector_rate_hz: 30.0,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.smoothing.history_size == 0 {
            return Err(Error::Config("history size must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.smoothing.smoothing_factor)
            || self.smoothing.smoothing_factor == 0.0
        {
            return Err(Error::Config(
                "smoothing factor must be in (0, 1]".to_string(),
            ));
        }
        if self.smoothing.movement_threshold < 0.0 {
            return Err(Error::Config(
                "movement threshold must not be negative".to_string(),
            ));
        }
        if self.smoothing.max_velocity <= 0.0 {
            return Err(Error::Config("max velocity must be positive".to_string()));
        }

        if self.scale.min <= 0.0 || self.scale.min >= self.scale.max {
            return Err(Error::Config(
                "scale band must satisfy 0 < min < max".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scale.smoothing_factor) || self.scale.smoothing_factor == 0.0
        {
            return Err(Error::Config(
                "scale smoothing factor must be in (0, 1]".to_string(),
            ));
        }

        if !(0.0..180.0).contains(&self.camera.fov_degrees) || self.camera.fov_degrees == 0.0 {
            return Err(Error::Config(
                "camera fov must be in (0, 180) degrees".to_string(),
            ));
        }
        if self.camera.aspect <= 0.0 {
            return Err(Error::Config("aspect ratio must be positive".to_string()));
        }
        if self.camera.depth <= 0.0 {
            return Err(Error::Config("working depth must be positive".to_string()));
        }

        if !(0.0..=1.0).contains(&self.detector.min_detection_confidence)
            || !(0.0..=1.0).contains(&self.detector.min_tracking_confidence)
        {
            return Err(Error::Config(
                "confidence thresholds must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detector.min_good_matches == 0 {
            return Err(Error::Config(
                "minimum good matches must be at least 1".to_string(),
            ));
        }

        if self.occlusion.silhouette.is_empty() {
            return Err(Error::Config(
                "occlusion silhouette must not be empty".to_string(),
            ));
        }
        if self.occlusion.dilation < 1.0 {
            return Err(Error::Config(
                "occlusion dilation must be at least 1.0".to_string(),
            ));
        }
        if self.occlusion.mesh_depth <= 0.0 {
            return Err(Error::Config(
                "occlusion mesh depth must be positive".to_string(),
            ));
        }

        if self.detector_rate_hz <= 0.0 {
            return Err(Error::Config("detector rate must be positive".to_string()));
        }

        Ok(())
    }
}
