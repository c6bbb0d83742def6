//! Core pose types shared across the stabilization pipeline.

use nalgebra::{UnitQuaternion, Vector3};

/// A normalized detector keypoint.
///
/// `x` and `y` are in `[0, 1]` relative to the source image. `z` is a
/// relative depth in the detector's own sign convention, not metric.
/// Landmark sets are fixed-size ordered sequences; the index is the only
/// correlation key across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One frame's raw pose estimate, produced and consumed within a single frame.
#[derive(Debug, Clone, Copy)]
pub struct PoseSample {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub scale: f64,
}

impl PoseSample {
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>, scale: f64) -> Self {
        Self {
            position,
            orientation,
            scale,
        }
    }

    /// Sample at a position with identity orientation and unit scale.
    pub fn at_position(position: Vector3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity(), 1.0)
    }
}

/// The filtered, persistent transform driving a rendered object.
///
/// Owned exclusively by one `TemporalFilter` instance and mutated in place
/// every frame; never shared across trackers.
#[derive(Debug, Clone, Copy)]
pub struct StabilizedPose {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub scale: f64,
}

impl StabilizedPose {
    pub fn from_sample(sample: &PoseSample) -> Self {
        Self {
            position: sample.position,
            orientation: sample.orientation,
            scale: sample.scale,
        }
    }
}

/// Tracking lifecycle for a single subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    /// No valid observation seen yet
    #[default]
    New,
    /// Actively tracked subject
    Tracking,
    /// Subject not observed this frame; the last stabilized pose is held
    Lost,
}

/// Spherical interpolation that stays defined for near-antipodal pairs.
///
/// Falls back to normalized linear interpolation where slerp is singular,
/// so a per-frame update can never panic inside the render loop.
pub fn slerp_toward(
    from: &UnitQuaternion<f64>,
    to: &UnitQuaternion<f64>,
    t: f64,
) -> UnitQuaternion<f64> {
    from.try_slerp(to, t, 1e-9)
        .unwrap_or_else(|| UnitQuaternion::try_new(from.lerp(to, t), 1e-12).unwrap_or(*to))
}
