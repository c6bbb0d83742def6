//! Temporal stabilization and pose derivation for camera-driven AR tracking.
//!
//! This library is the signal-processing layer between raw detector output
//! and a 3D scene update. External detectors deliver noisy per-frame
//! observations: sparse landmark sets (face or hand meshes) or a planar
//! homography for image targets. The crate turns them into temporally
//! coherent transforms:
//!
//! 1. A [`tracker::PoseEstimator`] derives a raw position/orientation/scale
//!    sample from the observation, rejecting degenerate geometry.
//! 2. A [`tracker::TemporalFilter`] stabilizes the sample stream through a
//!    rolling average, a dead-zone gate, a velocity cap and an exponential
//!    approach, each independently tunable.
//! 3. An [`integration::ArPipeline`] orchestrates the per-frame flow and
//!    drives a [`integration::RenderSink`], throttling detector invocations
//!    below the render rate.
//!
//! Detection and rendering are consumed through traits; the core never
//! performs inference or issues draw calls.
//!
//! # Examples
//!
//! ## Stabilizing a sample stream
//!
//! ```
//! use artrack_rs::tracker::{PoseSample, SmoothingConfig, TemporalFilter};
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let mut filter = TemporalFilter::new(SmoothingConfig::default());
//!
//! // The first sample seeds the filter directly
//! let sample = PoseSample::new(Vector3::new(0.1, 0.0, -1.0), UnitQuaternion::identity(), 1.0);
//! let stabilized = filter.push(sample);
//! assert_eq!(stabilized.position, sample.position);
//!
//! // Later samples are smoothed toward the rolling average
//! let jump = PoseSample::new(Vector3::new(0.2, 0.0, -1.0), UnitQuaternion::identity(), 1.0);
//! let stabilized = filter.push(jump);
//! assert!(stabilized.position.x > 0.1 && stabilized.position.x < 0.2);
//! ```
//!
//! ## Driving a pipeline from a detector callback
//!
//! ```
//! use artrack_rs::integration::{observation_channel, ArPipeline, ObjectTransform, RenderSink};
//! use artrack_rs::tracker::{Landmark, LandmarkAnchors, LandmarkEstimator, Observation};
//! use artrack_rs::PipelineConfig;
//!
//! struct NullSink;
//! impl RenderSink for NullSink {
//!     fn apply(&mut self, _transform: &ObjectTransform) {}
//! }
//!
//! let (sender, receiver) = observation_channel();
//! let estimator = Box::new(LandmarkEstimator::new(LandmarkAnchors {
//!     primary: 0,
//!     left_eye: 1,
//!     right_eye: 2,
//!     min_landmarks: 3,
//! }));
//! let mut pipeline = ArPipeline::new(receiver, NullSink, estimator, &PipelineConfig::default());
//!
//! // The detector's results callback clones `sender` and delivers here
//! sender.send(Observation::Landmarks(vec![
//!     Landmark::new(0.5, 0.5, 0.0),
//!     Landmark::new(0.4, 0.45, 0.0),
//!     Landmark::new(0.6, 0.45, 0.0),
//! ]));
//!
//! pipeline.advance().unwrap();
//! assert!(pipeline.pose().is_some());
//! pipeline.stop();
//! ```

/// Core stabilization and pose-derivation algorithms
pub mod tracker;

/// Seams for external detectors and render sinks
pub mod integration;

/// Aggregate configuration with YAML load/save
pub mod config;

/// Error types and result handling
pub mod error;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use integration::{ArPipeline, FrameOutcome, ObjectTransform, ObservationSource, RenderSink};
pub use tracker::{
    Landmark, Observation, PoseEstimator, PoseSample, StabilizedPose, TemporalFilter,
    TrackingState,
};
