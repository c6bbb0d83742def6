use std::time::{Duration, Instant};

use artrack_rs::PipelineConfig;
use artrack_rs::integration::{
    ArPipeline, FrameOutcome, ObjectTransform, RenderSink, observation_channel,
};
use artrack_rs::tracker::{
    HomographyBounds, HomographyEstimator, Landmark, LandmarkAnchors, LandmarkEstimator,
    Observation, OcclusionMesh, TrackingState,
};
use nalgebra::Matrix3;

#[derive(Default)]
struct RecordingSink {
    transforms: Vec<ObjectTransform>,
    meshes: usize,
}

impl RenderSink for RecordingSink {
    fn apply(&mut self, transform: &ObjectTransform) {
        self.transforms.push(*transform);
    }

    fn apply_occlusion(&mut self, _mesh: &OcclusionMesh) {
        self.meshes += 1;
    }
}

fn face_estimator() -> Box<LandmarkEstimator> {
    Box::new(LandmarkEstimator::new(LandmarkAnchors {
        primary: 0,
        left_eye: 1,
        right_eye: 2,
        min_landmarks: 3,
    }))
}

fn face_at(x: f64) -> Observation {
    Observation::Landmarks(vec![
        Landmark::new(x, 0.5, 0.0),
        Landmark::new(x - 0.1, 0.45, 0.0),
        Landmark::new(x + 0.1, 0.45, 0.0),
    ])
}

fn similarity(scale: f64, angle: f64, tx: f64, ty: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        scale * c, -scale * s, tx,
        scale * s, scale * c, ty,
        0.0, 0.0, 1.0,
    )
}

#[test]
fn test_callback_channel_drives_pipeline() {
    let (sender, receiver) = observation_channel();
    let mut pipeline = ArPipeline::new(
        receiver,
        RecordingSink::default(),
        face_estimator(),
        &PipelineConfig::default(),
    );

    // Frame 1: nothing delivered yet
    assert_eq!(pipeline.advance().unwrap(), FrameOutcome::Held);
    assert!(!pipeline.sink().transforms[0].visible);

    // Detector callback fires between frames
    sender.send(face_at(0.5));
    assert_eq!(pipeline.advance().unwrap(), FrameOutcome::Updated);
    assert_eq!(pipeline.state(), TrackingState::Tracking);
    assert!(pipeline.sink().transforms[1].visible);

    // Two results queued before one frame: only the latest is consumed
    sender.send(face_at(0.3));
    sender.send(face_at(0.6));
    assert_eq!(pipeline.advance().unwrap(), FrameOutcome::Updated);
    let x_after = pipeline.pose().unwrap().position.x;

    // The x=0.6 face pulls scene x negative (mirrored axis)
    assert!(x_after < 0.0);
}

#[test]
fn test_lost_frames_hold_last_pose() {
    let (sender, receiver) = observation_channel();
    let mut pipeline = ArPipeline::new(
        receiver,
        RecordingSink::default(),
        face_estimator(),
        &PipelineConfig::default(),
    );

    sender.send(face_at(0.5));
    pipeline.advance().unwrap();
    let tracked = pipeline.pose().copied().unwrap();

    sender.send(Observation::Lost);
    assert_eq!(pipeline.advance().unwrap(), FrameOutcome::Held);
    assert_eq!(pipeline.state(), TrackingState::Lost);

    // Several silent frames: pose frozen, still rendered
    for _ in 0..5 {
        pipeline.advance().unwrap();
    }
    let last = pipeline.sink().transforms.last().unwrap();
    assert!(last.visible);
    assert_eq!(last.position, tracked.position);
}

#[test]
fn test_degenerate_homography_scale_is_rejected() {
    let (sender, receiver) = observation_channel();
    let estimator = Box::new(HomographyEstimator::new(
        100.0,
        100.0,
        640.0,
        480.0,
        HomographyBounds::default(),
    ));
    let mut pipeline = ArPipeline::new(
        receiver,
        RecordingSink::default(),
        estimator,
        &PipelineConfig::default(),
    );

    sender.send(Observation::PlanarTarget {
        homography: similarity(1.0, 0.0, 270.0, 190.0),
        good_matches: 20,
    });
    pipeline.advance().unwrap();
    let before = pipeline.pose().copied().unwrap();

    // Scale 10.0 is far outside the [0.1, 5.0] band
    sender.send(Observation::PlanarTarget {
        homography: similarity(10.0, 0.0, 270.0, 190.0),
        good_matches: 20,
    });
    assert_eq!(pipeline.advance().unwrap(), FrameOutcome::Held);
    let after = pipeline.pose().unwrap();
    assert_eq!(after.position, before.position);
    assert_eq!(after.scale, before.scale);
}

#[test]
fn test_insufficient_matches_set_tracking_false() {
    let (sender, receiver) = observation_channel();
    let estimator = Box::new(HomographyEstimator::new(
        100.0,
        100.0,
        640.0,
        480.0,
        HomographyBounds::default(),
    ));
    let mut pipeline = ArPipeline::new(
        receiver,
        RecordingSink::default(),
        estimator,
        &PipelineConfig::default(),
    );

    sender.send(Observation::PlanarTarget {
        homography: similarity(1.0, 0.0, 270.0, 190.0),
        good_matches: 8,
    });
    pipeline.advance().unwrap();
    assert_eq!(pipeline.state(), TrackingState::Tracking);
    let before = pipeline.pose().copied().unwrap();

    // 3 good matches when the minimum is 4
    sender.send(Observation::PlanarTarget {
        homography: similarity(1.0, 0.0, 280.0, 195.0),
        good_matches: 3,
    });
    assert_eq!(pipeline.advance().unwrap(), FrameOutcome::Held);
    assert_eq!(pipeline.state(), TrackingState::Lost);
    assert_eq!(pipeline.pose().unwrap().position, before.position);
}

#[test]
fn test_detector_throttled_below_render_rate() {
    let (_sender, receiver) = observation_channel();
    let mut pipeline = ArPipeline::new(
        receiver,
        RecordingSink::default(),
        face_estimator(),
        &PipelineConfig::default(),
    );

    // 60 Hz render loop for one simulated second against the 30 Hz cap
    let start = Instant::now();
    let fired = (0..60)
        .filter(|&i| pipeline.needs_detection(start + Duration::from_micros(i * 16_667)))
        .count();
    assert!(fired <= 30, "detector invoked {fired} times in one second");
    assert!(fired >= 20);
}

#[test]
fn test_stop_detaches_callback_side() {
    let (sender, receiver) = observation_channel();
    let mut pipeline = ArPipeline::new(
        receiver,
        RecordingSink::default(),
        face_estimator(),
        &PipelineConfig::default(),
    );

    sender.send(face_at(0.5));
    pipeline.advance().unwrap();
    pipeline.stop();

    // A late-firing detector callback after stop is a defined no-op
    sender.send(face_at(0.6));
    assert_eq!(pipeline.advance().unwrap(), FrameOutcome::Stopped);
    assert!(pipeline.pose().is_none());

    // Double stop is a no-op as well
    pipeline.stop();
    assert!(pipeline.is_stopped());
}
