//! Bounded history of recent pose samples with rolling averages.

use std::collections::VecDeque;

use nalgebra::{UnitQuaternion, Vector3};

use crate::tracker::pose::{PoseSample, slerp_toward};

/// Bounded FIFO of recent raw samples feeding the rolling-average stage.
///
/// Length never exceeds the configured capacity; the oldest sample is
/// evicted first. Discarded wholesale when a tracker stops.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    capacity: usize,
    samples: VecDeque<PoseSample>,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be at least 1");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: PoseSample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Arithmetic mean of the stored positions.
    pub fn average_position(&self) -> Option<Vector3<f64>> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self.samples.iter().map(|s| s.position).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// History-weighted running orientation average.
    ///
    /// Starts from the oldest quaternion and folds each newer one in with
    /// weight `1/(i+1)` at 1-based step `i`, so later samples pull harder
    /// per step. Order-dependent by design; the smoothing behavior was
    /// tuned against exactly this sequential blend, so do not replace it
    /// with a symmetric quaternion average.
    pub fn average_orientation(&self) -> Option<UnitQuaternion<f64>> {
        let mut iter = self.samples.iter();
        let mut avg = iter.next()?.orientation;
        for (i, sample) in iter.enumerate() {
            let weight = 1.0 / (i as f64 + 2.0);
            avg = slerp_toward(&avg, &sample.orientation, weight);
        }
        Some(avg)
    }
}
