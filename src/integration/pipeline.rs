//! Per-frame orchestration: throttle, observe, estimate, filter, render.

use std::time::Instant;

use crate::config::PipelineConfig;
use crate::integration::detector::ObservationSource;
use crate::integration::sink::{ObjectTransform, RenderSink};
use crate::integration::throttle::DetectorThrottle;
use crate::tracker::{
    CameraModel, Observation, OcclusionMeshBuilder, PoseEstimator, StabilizedPose, TemporalFilter,
    TrackingState,
};

/// Outcome of one frame advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A fresh observation updated the stabilized pose
    Updated,
    /// No usable observation; the previous stabilized state was re-applied
    Held,
    /// Pipeline is stopped; nothing was applied
    Stopped,
}

/// Combined per-frame coordinator for one tracked subject.
///
/// Bundles an observation source with the estimation and stabilization
/// stages and drives a render sink. Detection runs at its own throttled
/// rate while `advance` is called once per rendered frame; the render loop
/// always gets the latest stabilized state whether or not the detector
/// produced anything this frame.
pub struct ArPipeline<S: ObservationSource, R: RenderSink> {
    source: S,
    sink: R,
    estimator: Box<dyn PoseEstimator>,
    camera: CameraModel,
    filter: TemporalFilter,
    occlusion: Option<OcclusionMeshBuilder>,
    throttle: DetectorThrottle,
    min_good_matches: usize,
    state: TrackingState,
    stopped: bool,
}

impl<S: ObservationSource, R: RenderSink> ArPipeline<S, R> {
    /// Create a new pipeline with the given collaborators and configuration.
    pub fn new(
        source: S,
        sink: R,
        estimator: Box<dyn PoseEstimator>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            source,
            sink,
            estimator,
            camera: config.camera.model(),
            filter: TemporalFilter::with_scale_config(
                config.smoothing.clone(),
                config.scale.clone(),
            ),
            occlusion: None,
            throttle: DetectorThrottle::new(config.detector_rate_hz),
            min_good_matches: config.detector.min_good_matches,
            state: TrackingState::New,
            stopped: false,
        }
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config(source: S, sink: R, estimator: Box<dyn PoseEstimator>) -> Self {
        Self::new(source, sink, estimator, &PipelineConfig::default())
    }

    /// Enable the occlusion mask for landmark-driven tracking.
    pub fn with_occlusion(mut self, builder: OcclusionMeshBuilder) -> Self {
        self.occlusion = Some(builder);
        self
    }

    /// True when the host should forward the current frame to the external
    /// detector. Rendering and detection are decoupled rates.
    pub fn needs_detection(&mut self, now: Instant) -> bool {
        !self.stopped && self.throttle.fire(now)
    }

    /// Advance one rendered frame: drain observations, update the filter,
    /// push the latest stabilized state to the sink.
    pub fn advance(&mut self) -> Result<FrameOutcome, S::Error> {
        if self.stopped {
            return Ok(FrameOutcome::Stopped);
        }

        let outcome = match self.source.poll()? {
            Some(observation) => self.ingest(&observation),
            None => FrameOutcome::Held,
        };

        self.render();
        Ok(outcome)
    }

    fn ingest(&mut self, observation: &Observation) -> FrameOutcome {
        if !self.has_min_correspondences(observation) {
            self.mark_lost();
            return FrameOutcome::Held;
        }

        match self.estimator.estimate(observation, &self.camera) {
            Some(sample) => {
                self.filter.push(sample);
                self.state = TrackingState::Tracking;

                if let (Some(builder), Observation::Landmarks(landmarks)) =
                    (&self.occlusion, observation)
                {
                    if let Some(mesh) = builder.build(landmarks, &self.camera) {
                        self.sink.apply_occlusion(&mesh);
                    }
                }

                FrameOutcome::Updated
            }
            None => {
                self.mark_lost();
                FrameOutcome::Held
            }
        }
    }

    fn has_min_correspondences(&self, observation: &Observation) -> bool {
        match observation {
            Observation::Landmarks(landmarks) => !landmarks.is_empty(),
            Observation::PlanarTarget { good_matches, .. } => {
                *good_matches >= self.min_good_matches
            }
            Observation::Lost => false,
        }
    }

    fn mark_lost(&mut self) {
        if self.state == TrackingState::Tracking {
            log::debug!("observation lost, holding last stabilized pose");
            self.state = TrackingState::Lost;
        }
    }

    fn render(&mut self) {
        let transform = match self.filter.current() {
            Some(pose) => ObjectTransform::from_pose(pose, true),
            None => ObjectTransform::hidden(),
        };
        self.sink.apply(&transform);
    }

    /// The current stabilized pose, if tracking has ever produced one.
    pub fn pose(&self) -> Option<&StabilizedPose> {
        self.filter.current()
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Get a reference to the underlying observation source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying observation source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying render sink.
    pub fn sink(&self) -> &R {
        &self.sink
    }

    /// Stop the pipeline: no further state mutation, source detached and
    /// its native resources released, filter history discarded. Idempotent;
    /// calling before any frame was processed is fine.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.source.release();
        self.filter.reset();
        self.throttle.reset();
        log::info!("tracking pipeline stopped");
    }
}
