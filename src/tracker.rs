mod camera;
mod estimator;
mod history;
mod homography;
mod occlusion;
mod pose;
mod scale_filter;
mod temporal_filter;

pub use camera::CameraModel;
pub use estimator::{
    HomographyBounds, HomographyEstimator, LandmarkAnchors, LandmarkEstimator, Observation,
    PoseEstimator,
};
pub use history::SampleHistory;
pub use homography::{planar_scale, project_point, rotation_z};
pub use occlusion::{OcclusionConfig, OcclusionMesh, OcclusionMeshBuilder};
pub use pose::{Landmark, PoseSample, StabilizedPose, TrackingState, slerp_toward};
pub use scale_filter::{ScaleConfig, ScaleFilter};
pub use temporal_filter::{SmoothingConfig, TemporalFilter};
