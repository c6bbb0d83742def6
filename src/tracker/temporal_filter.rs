//! Multi-stage temporal filter turning raw pose samples into stable transforms.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::tracker::history::SampleHistory;
use crate::tracker::pose::{PoseSample, StabilizedPose, slerp_toward};
use crate::tracker::scale_filter::{ScaleConfig, ScaleFilter};

/// Tuning knobs for the temporal filter.
///
/// The four knobs are orthogonal and must stay independently configurable:
/// `history_size` trades lag for noise rejection, `movement_threshold`
/// trades responsiveness for micro-jitter suppression, `max_velocity`
/// bounds the worst-case single-step target displacement, and
/// `smoothing_factor` sets the steady-state response speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Rolling-average window length
    pub history_size: usize,
    /// Dead-zone radius in scene units; updates below it are suppressed
    pub movement_threshold: f64,
    /// Maximum target displacement per frame, scene units
    pub max_velocity: f64,
    /// Exponential approach factor per frame, in (0, 1]
    pub smoothing_factor: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            history_size: 5,
            movement_threshold: 0.001,
            max_velocity: 0.1,
            smoothing_factor: 0.15,
        }
    }
}

/// Temporal filter over a position+orientation sample stream.
///
/// `push` is called once per rendered frame, and only for frames where the
/// detector reported a valid observation. When it is not called the
/// previously stabilized pose stands unchanged (freeze-on-loss).
///
/// Stages, in fixed order: history append, rolling average, dead-zone gate,
/// velocity cap, exponential approach. The velocity cap limits how far the
/// smoothing target may move in a single frame while the approach factor
/// limits how fast the output chases it; the two compose, so one spurious
/// detector frame cannot teleport the output even at a high smoothing
/// factor.
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    config: SmoothingConfig,
    history: SampleHistory,
    scale: ScaleFilter,
    /// Velocity reference chain, tracked independently of the smoothed output.
    last_target: Option<Vector3<f64>>,
    pose: Option<StabilizedPose>,
}

impl TemporalFilter {
    pub fn new(config: SmoothingConfig) -> Self {
        Self::with_scale_config(config, ScaleConfig::default())
    }

    pub fn with_scale_config(config: SmoothingConfig, scale: ScaleConfig) -> Self {
        assert!(
            config.smoothing_factor > 0.0 && config.smoothing_factor <= 1.0,
            "smoothing factor must be in (0, 1]"
        );
        assert!(config.max_velocity > 0.0, "max velocity must be positive");
        let history = SampleHistory::new(config.history_size);
        Self {
            config,
            history,
            scale: ScaleFilter::new(scale),
            last_target: None,
            pose: None,
        }
    }

    /// Feed one raw sample through the full stage pipeline.
    ///
    /// Returns the updated stabilized pose. The first sample seeds every
    /// stage directly, with no averaging effect.
    pub fn push(&mut self, raw: PoseSample) -> StabilizedPose {
        self.history.push(raw);

        let avg_position = self.history.average_position().unwrap_or(raw.position);
        let avg_orientation = self.history.average_orientation().unwrap_or(raw.orientation);

        let (Some(mut pose), Some(last_target)) = (self.pose, self.last_target) else {
            let mut seeded = StabilizedPose::from_sample(&raw);
            seeded.scale = self.scale.push(raw.scale);
            self.last_target = Some(raw.position);
            self.pose = Some(seeded);
            return seeded;
        };

        // Dead-zone gate: sub-threshold movement re-emits the previous pose
        // untouched, including the velocity reference chain.
        if (avg_position - pose.position).norm() < self.config.movement_threshold {
            return pose;
        }

        // Velocity cap: bound how far the smoothing target moves this frame,
        // direction preserved.
        let mut velocity = avg_position - last_target;
        let speed = velocity.norm();
        if speed > self.config.max_velocity {
            velocity *= self.config.max_velocity / speed;
        }
        let target = last_target + velocity;
        self.last_target = Some(target);

        // Exponential approach toward the capped target.
        let factor = self.config.smoothing_factor;
        pose.position += (target - pose.position) * factor;
        pose.orientation = slerp_toward(&pose.orientation, &avg_orientation, factor);
        pose.orientation.renormalize();
        pose.scale = self.scale.push(raw.scale);

        self.pose = Some(pose);
        pose
    }

    /// The current stabilized pose, if at least one sample has been pushed.
    pub fn current(&self) -> Option<&StabilizedPose> {
        self.pose.as_ref()
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Discard all state: history, velocity chain, stabilized pose.
    pub fn reset(&mut self) {
        self.history.clear();
        self.scale.reset();
        self.last_target = None;
        self.pose = None;
    }
}

impl Default for TemporalFilter {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}
