//! Dynamic occlusion mask built from the face silhouette every frame.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::tracker::camera::CameraModel;
use crate::tracker::pose::Landmark;

/// Face-oval silhouette ring of the 468-point face mesh, in boundary order.
const FACE_OVAL: [usize; 36] = [
    10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400, 377, 152,
    148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67, 109,
];

/// Jaw/chin portion of the silhouette ring.
const JAWLINE: [usize; 13] = [397, 365, 379, 378, 400, 377, 152, 148, 176, 149, 150, 136, 172];

/// Geometry policy for the occlusion mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionConfig {
    /// Landmark indices forming the silhouette ring, in boundary order
    pub silhouette: Vec<usize>,
    /// Subset of the ring treated as jaw/chin points
    pub jaw: Vec<usize>,
    /// Extra downward offset for jaw points, in scene units, approximating
    /// neck and shoulder coverage the landmark set does not include
    pub jaw_drop: f64,
    /// Uniform dilation of the projected contour about its centroid, to
    /// close the gap between mask edge and real face edge
    pub dilation: f64,
    /// Constant depth the mask is pinned to, between the camera and any
    /// content it should occlude
    pub mesh_depth: f64,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            silhouette: FACE_OVAL.to_vec(),
            jaw: JAWLINE.to_vec(),
            jaw_drop: 0.2,
            dilation: 1.15,
            mesh_depth: 0.9,
        }
    }
}

/// Depth-only coverage geometry rebuilt from landmarks each frame.
///
/// A cheap approximate mask: the projected ring plus its centroid, fanned
/// into triangles. Self-overlap at concave regions is tolerated because
/// only depth-buffer coverage matters, not the mask's visual fidelity.
#[derive(Debug, Clone)]
pub struct OcclusionMesh {
    /// Projected ring vertices followed by the centroid
    pub vertices: Vec<Vector3<f64>>,
    /// Triangle index triples fanning out from the centroid
    pub indices: Vec<[u32; 3]>,
}

/// Builds the occlusion mask from a landmark subset.
#[derive(Debug, Clone)]
pub struct OcclusionMeshBuilder {
    config: OcclusionConfig,
}

impl OcclusionMeshBuilder {
    pub fn new(mut config: OcclusionConfig) -> Self {
        dedup_preserving_order(&mut config.silhouette);
        Self { config }
    }

    pub fn config(&self) -> &OcclusionConfig {
        &self.config
    }

    /// Rebuild the mask for this frame's landmarks.
    ///
    /// Returns `None` on empty or malformed input (index out of range),
    /// leaving the previous mesh in place. This runs inside the render
    /// callback, so it must never panic.
    pub fn build(&self, landmarks: &[Landmark], camera: &CameraModel) -> Option<OcclusionMesh> {
        let ring = &self.config.silhouette;
        if ring.is_empty() || landmarks.is_empty() {
            return None;
        }
        if let Some(&bad) = ring.iter().find(|&&i| i >= landmarks.len()) {
            log::debug!("occlusion rebuild skipped: index {bad} out of range");
            return None;
        }

        let mut points: Vec<Vector3<f64>> = ring
            .iter()
            .map(|&i| {
                let mut p = camera.project(&landmarks[i]);
                if self.config.jaw.contains(&i) {
                    p.y -= self.config.jaw_drop;
                }
                p
            })
            .collect();

        let n = points.len() as f64;
        let centroid = points.iter().sum::<Vector3<f64>>() / n;

        let depth = -self.config.mesh_depth;
        for p in &mut points {
            p.x = centroid.x + (p.x - centroid.x) * self.config.dilation;
            p.y = centroid.y + (p.y - centroid.y) * self.config.dilation;
            p.z = depth;
        }

        let count = points.len() as u32;
        let mut vertices = points;
        vertices.push(Vector3::new(centroid.x, centroid.y, depth));

        let indices = (0..count).map(|i| [i, (i + 1) % count, count]).collect();

        Some(OcclusionMesh { vertices, indices })
    }
}

impl Default for OcclusionMeshBuilder {
    fn default() -> Self {
        Self::new(OcclusionConfig::default())
    }
}

fn dedup_preserving_order(indices: &mut Vec<usize>) {
    let mut seen = std::collections::HashSet::new();
    indices.retain(|&i| seen.insert(i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> CameraModel {
        CameraModel::from_degrees(45.0, 4.0 / 3.0, 2.0)
    }

    fn square_config() -> OcclusionConfig {
        OcclusionConfig {
            silhouette: vec![0, 1, 2, 3],
            jaw: vec![],
            jaw_drop: 0.0,
            dilation: 1.0,
            mesh_depth: 0.9,
        }
    }

    fn square_landmarks() -> Vec<Landmark> {
        vec![
            Landmark::new(0.4, 0.4, 0.0),
            Landmark::new(0.6, 0.4, 0.0),
            Landmark::new(0.6, 0.6, 0.0),
            Landmark::new(0.4, 0.6, 0.0),
        ]
    }

    #[test]
    fn test_fan_triangulation_shape() {
        let builder = OcclusionMeshBuilder::new(square_config());
        let mesh = builder.build(&square_landmarks(), &camera()).unwrap();
        // Ring plus centroid
        assert_eq!(mesh.vertices.len(), 5);
        assert_eq!(mesh.indices.len(), 4);
        // Every triangle ends at the centroid vertex
        assert!(mesh.indices.iter().all(|tri| tri[2] == 4));
        // The ring closes: last triangle wraps to vertex 0
        assert_eq!(mesh.indices[3], [3, 0, 4]);
    }

    #[test]
    fn test_vertices_pinned_to_mesh_depth() {
        let builder = OcclusionMeshBuilder::new(square_config());
        let mesh = builder.build(&square_landmarks(), &camera()).unwrap();
        assert!(mesh.vertices.iter().all(|v| (v.z + 0.9).abs() < 1e-12));
    }

    #[test]
    fn test_dilation_expands_about_centroid() {
        let mut config = square_config();
        config.dilation = 2.0;
        let builder = OcclusionMeshBuilder::new(config);
        let plain = OcclusionMeshBuilder::new(square_config());
        let cam = camera();
        let dilated = builder.build(&square_landmarks(), &cam).unwrap();
        let base = plain.build(&square_landmarks(), &cam).unwrap();
        let c = base.vertices[4];
        for i in 0..4 {
            let d0 = (base.vertices[i] - c).norm();
            let d1 = (dilated.vertices[i] - c).norm();
            assert_relative_eq!(d1, 2.0 * d0, epsilon = 1e-9);
        }
        // Centroid itself does not move
        assert_relative_eq!(dilated.vertices[4].x, c.x, epsilon = 1e-12);
    }

    #[test]
    fn test_jaw_drop_moves_points_down() {
        let mut config = square_config();
        config.jaw = vec![2, 3];
        config.jaw_drop = 0.5;
        let builder = OcclusionMeshBuilder::new(config);
        let plain = OcclusionMeshBuilder::new(square_config());
        let cam = camera();
        let dropped = builder.build(&square_landmarks(), &cam).unwrap();
        let base = plain.build(&square_landmarks(), &cam).unwrap();
        assert_relative_eq!(dropped.vertices[2].y, base.vertices[2].y - 0.5, epsilon = 1e-9);
        assert_relative_eq!(dropped.vertices[3].y, base.vertices[3].y - 0.5, epsilon = 1e-9);
        // Non-jaw points stay put; the centroid absorbs a quarter of the drop
        assert_relative_eq!(dropped.vertices[0].y, base.vertices[0].y, epsilon = 1e-12);
        assert_relative_eq!(dropped.vertices[4].y, base.vertices[4].y - 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_range_index_skips_rebuild() {
        let builder = OcclusionMeshBuilder::default();
        // Too few landmarks for the face-oval indices
        let landmarks = vec![Landmark::new(0.5, 0.5, 0.0); 10];
        assert!(builder.build(&landmarks, &camera()).is_none());
    }

    #[test]
    fn test_empty_landmarks_skip_rebuild() {
        let builder = OcclusionMeshBuilder::default();
        assert!(builder.build(&[], &camera()).is_none());
    }

    #[test]
    fn test_duplicate_silhouette_indices_deduped() {
        let mut config = square_config();
        config.silhouette = vec![0, 1, 1, 2, 3, 0];
        let builder = OcclusionMeshBuilder::new(config);
        assert_eq!(builder.config().silhouette, vec![0, 1, 2, 3]);
    }
}
