//! Visible-area camera model mapping image coordinates into scene units.

use nalgebra::Vector3;

use crate::tracker::pose::Landmark;

/// Pinhole camera model used to place content at a fixed working depth.
///
/// Detector output lives in `[0, 1]` normalized image coordinates; the
/// renderer wants scene units centered on the optical axis. The mapping
/// depends only on the vertical field of view, the aspect ratio and the
/// chosen working depth.
#[derive(Debug, Clone, Copy)]
pub struct CameraModel {
    /// Vertical field of view in radians
    fov_y: f64,
    /// Width over height
    aspect: f64,
    /// Working depth in scene units, in front of the camera
    depth: f64,
}

impl CameraModel {
    pub fn new(fov_y: f64, aspect: f64, depth: f64) -> Self {
        assert!(fov_y > 0.0 && fov_y < std::f64::consts::PI, "fov must be in (0, pi)");
        assert!(aspect > 0.0, "aspect ratio must be positive");
        assert!(depth > 0.0, "working depth must be positive");
        Self { fov_y, aspect, depth }
    }

    pub fn from_degrees(fov_y_degrees: f64, aspect: f64, depth: f64) -> Self {
        Self::new(fov_y_degrees.to_radians(), aspect, depth)
    }

    /// Height of the visible frustum slice at the working depth.
    pub fn visible_height(&self) -> f64 {
        2.0 * (self.fov_y / 2.0).tan() * self.depth
    }

    /// Width of the visible frustum slice at the working depth.
    pub fn visible_width(&self) -> f64 {
        self.visible_height() * self.aspect
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Map a normalized landmark into scene coordinates at the working depth.
    ///
    /// The horizontal axis is negated to compensate for the mirrored camera
    /// feed; image Y grows downward while scene Y grows upward. The camera
    /// looks down negative Z.
    pub fn project(&self, landmark: &Landmark) -> Vector3<f64> {
        let x = -(landmark.x - 0.5) * self.visible_width();
        let y = (0.5 - landmark.y) * self.visible_height();
        Vector3::new(x, y, -self.depth)
    }

    /// Map a pixel-space frame point into scene coordinates.
    pub fn project_frame_point(
        &self,
        px: f64,
        py: f64,
        frame_width: f64,
        frame_height: f64,
    ) -> Vector3<f64> {
        self.project(&Landmark::new(px / frame_width, py / frame_height, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> CameraModel {
        CameraModel::from_degrees(45.0, 4.0 / 3.0, 2.0)
    }

    #[test]
    fn test_visible_area() {
        let cam = camera();
        let expected_height = 2.0 * (45.0f64.to_radians() / 2.0).tan() * 2.0;
        assert_relative_eq!(cam.visible_height(), expected_height, epsilon = 1e-12);
        assert_relative_eq!(cam.visible_width(), expected_height * 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_image_center_maps_to_optical_axis() {
        let cam = camera();
        let p = cam.project(&Landmark::new(0.5, 0.5, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_horizontal_axis_is_mirrored() {
        let cam = camera();
        // A landmark on the right half of the image lands on negative scene X
        let p = cam.project(&Landmark::new(0.75, 0.5, 0.0));
        assert!(p.x < 0.0);
        assert_relative_eq!(p.x, -0.25 * cam.visible_width(), epsilon = 1e-12);
    }

    #[test]
    fn test_image_y_down_becomes_scene_y_up() {
        let cam = camera();
        // Toward the top of the image means positive scene Y
        let p = cam.project(&Landmark::new(0.5, 0.25, 0.0));
        assert!(p.y > 0.0);
    }

    #[test]
    fn test_frame_point_matches_normalized_projection() {
        let cam = camera();
        let from_pixels = cam.project_frame_point(480.0, 120.0, 640.0, 480.0);
        let from_normalized = cam.project(&Landmark::new(0.75, 0.25, 0.0));
        assert_relative_eq!(from_pixels.x, from_normalized.x, epsilon = 1e-12);
        assert_relative_eq!(from_pixels.y, from_normalized.y, epsilon = 1e-12);
    }
}
