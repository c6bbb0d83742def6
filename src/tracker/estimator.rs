//! Pose derivation from raw detector observations.
//!
//! Two estimator modalities (sparse landmarks, planar homography) funnel
//! into the same `PoseSample` shape, so the temporal filter never needs to
//! know where an observation came from.

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::tracker::camera::CameraModel;
use crate::tracker::homography::{planar_scale, project_point, rotation_z};
use crate::tracker::pose::{Landmark, PoseSample};

/// A single detector result delivered to the pipeline.
#[derive(Debug, Clone)]
pub enum Observation {
    /// Fixed-size ordered landmark set (e.g. a 468-point face mesh or a
    /// 21-point hand mesh).
    Landmarks(Vec<Landmark>),
    /// Planar image-target homography plus the number of good feature
    /// matches it was estimated from.
    PlanarTarget {
        homography: Matrix3<f64>,
        good_matches: usize,
    },
    /// Detector ran and found nothing.
    Lost,
}

/// Derives a raw pose sample from one modality of detector output.
///
/// Implementations absorb their own failure modes: `None` means "hold the
/// previous stabilized pose", never an error. A subject missing from a
/// frame is the expected common case with real camera input.
pub trait PoseEstimator {
    fn estimate(&self, observation: &Observation, camera: &CameraModel) -> Option<PoseSample>;
}

/// Landmark indices anchoring the derived pose.
///
/// Defaults target the 468-point face mesh; a hand set works by supplying
/// its own indices and `min_landmarks = 21`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkAnchors {
    /// Primary landmark driving position (face mesh: nose tip)
    pub primary: usize,
    /// Left eye outer corner
    pub left_eye: usize,
    /// Right eye outer corner
    pub right_eye: usize,
    /// Minimum set length accepted as a valid observation
    pub min_landmarks: usize,
}

impl Default for LandmarkAnchors {
    fn default() -> Self {
        Self {
            primary: 1,
            left_eye: 33,
            right_eye: 263,
            min_landmarks: 468,
        }
    }
}

/// Pose estimation from a sparse landmark set.
#[derive(Debug, Clone, Default)]
pub struct LandmarkEstimator {
    anchors: LandmarkAnchors,
}

impl LandmarkEstimator {
    pub fn new(anchors: LandmarkAnchors) -> Self {
        Self { anchors }
    }

    pub fn anchors(&self) -> &LandmarkAnchors {
        &self.anchors
    }

    /// Orthonormal basis from the eye-to-eye vector and a provisional
    /// world-up. The eye landmarks' relative depth feeds into the lateral
    /// axis before normalization, which reduces the flat-rotation artifacts
    /// a purely 2D vector produces.
    fn orientation_from(
        &self,
        landmarks: &[Landmark],
        camera: &CameraModel,
    ) -> Option<UnitQuaternion<f64>> {
        let left = &landmarks[self.anchors.left_eye];
        let right = &landmarks[self.anchors.right_eye];

        let p_left = camera.project(left);
        let p_right = camera.project(right);
        // The mirrored projection puts the lower-image-x eye on positive
        // scene X, so left-minus-right yields +X for a level face. Detector
        // z shares the image-x unit scale.
        let dz = (left.z - right.z) * camera.visible_width();
        let lateral = Vector3::new(p_left.x - p_right.x, p_left.y - p_right.y, dz);

        let norm = lateral.norm();
        if norm < 1e-9 {
            return None;
        }
        let x_axis = lateral / norm;

        let forward = x_axis.cross(&Vector3::y());
        let forward_norm = forward.norm();
        if forward_norm < 1e-9 {
            // Eye axis collinear with world up; no stable basis this frame
            return None;
        }
        let forward = forward / forward_norm;
        let up = forward.cross(&x_axis);

        let rotation =
            Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x_axis, up, forward]));
        Some(UnitQuaternion::from_rotation_matrix(&rotation))
    }
}

impl PoseEstimator for LandmarkEstimator {
    fn estimate(&self, observation: &Observation, camera: &CameraModel) -> Option<PoseSample> {
        let Observation::Landmarks(landmarks) = observation else {
            return None;
        };
        if landmarks.len() < self.anchors.min_landmarks {
            log::debug!(
                "landmark set too small: {} < {}",
                landmarks.len(),
                self.anchors.min_landmarks
            );
            return None;
        }
        let highest = self
            .anchors
            .primary
            .max(self.anchors.left_eye)
            .max(self.anchors.right_eye);
        if highest >= landmarks.len() {
            log::debug!("anchor index {} out of range", highest);
            return None;
        }

        let position = camera.project(&landmarks[self.anchors.primary]);
        let orientation = self.orientation_from(landmarks, camera)?;
        Some(PoseSample::new(position, orientation, 1.0))
    }
}

/// Sanity bounds for accepting a homography-derived pose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomographyBounds {
    /// Accepted planar scale band
    pub min_scale: f64,
    pub max_scale: f64,
    /// How far outside the frame the projected target center may wander,
    /// in multiples of the frame dimensions.
    pub frame_margin: f64,
}

impl Default for HomographyBounds {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            frame_margin: 2.0,
        }
    }
}

/// Pose estimation from a planar image-target homography.
#[derive(Debug, Clone)]
pub struct HomographyEstimator {
    ref_width: f64,
    ref_height: f64,
    frame_width: f64,
    frame_height: f64,
    bounds: HomographyBounds,
}

impl HomographyEstimator {
    pub fn new(
        ref_width: f64,
        ref_height: f64,
        frame_width: f64,
        frame_height: f64,
        bounds: HomographyBounds,
    ) -> Self {
        assert!(ref_width > 0.0 && ref_height > 0.0, "reference dimensions must be positive");
        assert!(frame_width > 0.0 && frame_height > 0.0, "frame dimensions must be positive");
        Self {
            ref_width,
            ref_height,
            frame_width,
            frame_height,
            bounds,
        }
    }

    fn center_in_bounds(&self, cx: f64, cy: f64) -> bool {
        let mx = self.bounds.frame_margin * self.frame_width;
        let my = self.bounds.frame_margin * self.frame_height;
        cx >= -mx && cx <= self.frame_width + mx && cy >= -my && cy <= self.frame_height + my
    }
}

impl PoseEstimator for HomographyEstimator {
    fn estimate(&self, observation: &Observation, camera: &CameraModel) -> Option<PoseSample> {
        let Observation::PlanarTarget { homography, .. } = observation else {
            return None;
        };

        let [cx, cy] = project_point(homography, self.ref_width / 2.0, self.ref_height / 2.0)?;
        if !cx.is_finite() || !cy.is_finite() || !self.center_in_bounds(cx, cy) {
            log::warn!(
                "rejecting homography: target center ({cx:.1}, {cy:.1}) far outside frame"
            );
            return None;
        }

        let scale = planar_scale(homography);
        if scale < self.bounds.min_scale || scale > self.bounds.max_scale {
            log::warn!(
                "rejecting homography: planar scale {scale:.3} outside [{}, {}]",
                self.bounds.min_scale,
                self.bounds.max_scale
            );
            return None;
        }

        let position = camera.project_frame_point(cx, cy, self.frame_width, self.frame_height);
        let orientation =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), rotation_z(homography));
        Some(PoseSample::new(position, orientation, scale))
    }
}
