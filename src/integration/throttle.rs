//! Detector-rate throttle decoupling detection from the render rate.

use std::time::{Duration, Instant};

/// Caps detector invocations to a target rate regardless of how fast the
/// render loop runs.
///
/// Feature matching and landmark inference cost far more than a render
/// pass; the render loop asks `fire` each frame and only forwards a frame
/// to the detector when the interval has elapsed. `now` is injected so the
/// policy is testable without real sleeps.
#[derive(Debug, Clone)]
pub struct DetectorThrottle {
    interval: Duration,
    last_fire: Option<Instant>,
}

impl DetectorThrottle {
    pub fn new(max_hz: f64) -> Self {
        assert!(max_hz > 0.0, "detector rate must be positive");
        Self {
            interval: Duration::from_secs_f64(1.0 / max_hz),
            last_fire: None,
        }
    }

    /// True when enough time has elapsed for another detector pass.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_fire = Some(now);
                true
            }
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

impl Default for DetectorThrottle {
    fn default() -> Self {
        Self::new(30.0)
    }
}
