//! Operations over an externally estimated 3×3 planar homography.
//!
//! The matrix maps reference-image coordinates to current-frame
//! coordinates; it is only meaningful while the upstream matcher reports
//! enough good correspondences.

use nalgebra::{Matrix3, Vector3};

/// Project a 2D point through a homography: H * [x, y, 1]^T → [u, v].
///
/// Returns `None` when the homogeneous scale collapses, which a degenerate
/// matrix can produce.
pub fn project_point(h: &Matrix3<f64>, x: f64, y: f64) -> Option<[f64; 2]> {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < 1e-15 {
        return None;
    }
    Some([p[0] / p[2], p[1] / p[2]])
}

/// Combined x/y stretch: mean norm of the upper-left 2×2 column vectors.
pub fn planar_scale(h: &Matrix3<f64>) -> f64 {
    let sx = (h[(0, 0)].powi(2) + h[(1, 0)].powi(2)).sqrt();
    let sy = (h[(0, 1)].powi(2) + h[(1, 1)].powi(2)).sqrt();
    (sx + sy) / 2.0
}

/// In-plane rotation of the target, extracted from the first column.
pub fn rotation_z(h: &Matrix3<f64>) -> f64 {
    h[(1, 0)].atan2(h[(0, 0)])
}
