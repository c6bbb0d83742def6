//! Observation sources: the seam between external detectors and the pipeline.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};

use serde::{Deserialize, Serialize};

use crate::integration::handle::{HandleGuard, ReleaseHandle};
use crate::tracker::Observation;

/// Trait for detector backends feeding the pipeline.
///
/// `poll` is non-blocking and returns the freshest completed detector
/// result, if any arrived since the last call. Detector inference must
/// never block the render loop; backends run it elsewhere and hand results
/// over here.
///
/// # Example
///
/// ```ignore
/// use artrack_rs::{Observation, ObservationSource};
///
/// struct MyDetector {
///     // Your detector binding here
/// }
///
/// impl ObservationSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn poll(&mut self) -> Result<Option<Observation>, Self::Error> {
///         // Collect the latest finished inference, if any
///         Ok(None)
///     }
/// }
/// ```
pub trait ObservationSource {
    /// Error type for source failures (startup, transport).
    type Error;

    /// Take the most recent observation delivered since the last poll.
    fn poll(&mut self) -> Result<Option<Observation>, Self::Error>;

    /// Detach the source and release any native resources it holds.
    /// Called on pipeline stop; must be idempotent.
    fn release(&mut self) {}
}

/// Opaque pass-through knobs for an external detector, plus the
/// correspondence minimum the pipeline enforces itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Maximum simultaneous detections requested from the detector
    pub max_detections: usize,
    /// Detector-side detection confidence threshold
    pub min_detection_confidence: f64,
    /// Detector-side tracking confidence threshold
    pub min_tracking_confidence: f64,
    /// Minimum good feature matches before a homography is trusted;
    /// stricter image-tracking variants raise this to 8
    pub min_good_matches: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_detections: 1,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            min_good_matches: 4,
        }
    }
}

/// Create a single-producer single-consumer observation channel.
///
/// The sender half is handed to a callback-style detector; the receiving
/// half becomes the pipeline's `ObservationSource`. The render loop is the
/// sole consumer, so a detector callback completing mid-frame is observed
/// atomically at the next drain and torn reads cannot occur.
pub fn observation_channel() -> (ObservationSender, ObservationChannel) {
    let (tx, rx) = channel();
    (
        ObservationSender { tx },
        ObservationChannel {
            rx: HandleGuard::new(ReceiverHandle { rx }),
        },
    )
}

/// Producer half held by the detector's results callback.
#[derive(Debug, Clone)]
pub struct ObservationSender {
    tx: Sender<Observation>,
}

impl ObservationSender {
    /// Deliver one detector result. Silently dropped after the consuming
    /// tracker has stopped; a late-firing callback is not an error.
    pub fn send(&self, observation: Observation) {
        let _ = self.tx.send(observation);
    }
}

#[derive(Debug)]
struct ReceiverHandle {
    rx: Receiver<Observation>,
}

impl ReleaseHandle for ReceiverHandle {
    fn release(&mut self) {
        // Dropping the receiver disconnects the detector callback; the
        // guard takes care of the drop.
    }
}

/// Consumer half owned by the pipeline.
#[derive(Debug)]
pub struct ObservationChannel {
    rx: HandleGuard<ReceiverHandle>,
}

impl ObservationSource for ObservationChannel {
    type Error = std::convert::Infallible;

    fn poll(&mut self) -> Result<Option<Observation>, Self::Error> {
        let Some(handle) = self.rx.get_mut() else {
            return Ok(None);
        };
        // Drain everything queued since the last frame; the latest
        // completed result wins.
        let mut latest = None;
        loop {
            match handle.rx.try_recv() {
                Ok(observation) => latest = Some(observation),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(latest)
    }

    fn release(&mut self) {
        self.rx.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Landmark;

    #[test]
    fn test_poll_empty_channel() {
        let (_tx, mut rx) = observation_channel();
        assert!(rx.poll().unwrap().is_none());
    }

    #[test]
    fn test_latest_observation_wins() {
        let (tx, mut rx) = observation_channel();
        tx.send(Observation::Lost);
        tx.send(Observation::Landmarks(vec![Landmark::new(0.5, 0.5, 0.0)]));
        let latest = rx.poll().unwrap().unwrap();
        assert!(matches!(latest, Observation::Landmarks(_)));
        // Queue fully drained
        assert!(rx.poll().unwrap().is_none());
    }

    #[test]
    fn test_send_after_release_is_silent() {
        let (tx, mut rx) = observation_channel();
        rx.release();
        tx.send(Observation::Lost);
        assert!(rx.poll().unwrap().is_none());
    }

    #[test]
    fn test_release_is_idempotent() {
        let (_tx, mut rx) = observation_channel();
        rx.release();
        rx.release();
        assert!(rx.poll().unwrap().is_none());
    }
}
