//! Render sink seam: the mutable transform handles the core drives.

use nalgebra::{UnitQuaternion, Vector3};

use crate::tracker::{OcclusionMesh, StabilizedPose};

/// Transform update applied to a rendered object handle each frame.
#[derive(Debug, Clone, Copy)]
pub struct ObjectTransform {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub scale: f64,
    pub visible: bool,
}

impl ObjectTransform {
    /// Identity transform with visibility off, for the untracked state.
    pub fn hidden() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: 1.0,
            visible: false,
        }
    }

    pub fn from_pose(pose: &StabilizedPose, visible: bool) -> Self {
        Self {
            position: pose.position,
            orientation: pose.orientation,
            scale: pose.scale,
            visible,
        }
    }
}

/// Sink accepting stabilized transforms.
///
/// The core never issues draw calls; it only mutates transform state
/// through this trait, once per rendered frame.
pub trait RenderSink {
    fn apply(&mut self, transform: &ObjectTransform);

    /// Depth-only occlusion geometry update. Default no-op for sinks
    /// without occlusion support.
    fn apply_occlusion(&mut self, _mesh: &OcclusionMesh) {}
}
