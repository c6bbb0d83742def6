//! Integration module connecting external detectors and renderers with the
//! stabilization core.
//!
//! Detectors, feature matchers and the 3D renderer are external
//! collaborators; this module provides the traits and plumbing for wiring
//! them to the tracker without the core ever depending on a concrete
//! backend.

mod detector;
mod handle;
mod pipeline;
mod sink;
mod throttle;

pub use detector::{
    DetectorConfig, ObservationChannel, ObservationSender, ObservationSource, observation_channel,
};
pub use handle::{HandleGuard, ReleaseHandle};
pub use pipeline::{ArPipeline, FrameOutcome};
pub use sink::{ObjectTransform, RenderSink};
pub use throttle::DetectorThrottle;
