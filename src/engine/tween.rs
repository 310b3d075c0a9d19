use std::time::{Duration, Instant};

use crate::geometry::CubicBezier;

/// A time-bounded animation clock with an easing curve.
/// Tweens carry no values; callers interpolate with `eased()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    started_at: Instant,
    duration: Duration,
    curve: CubicBezier,
}

impl Tween {
    pub fn new(started_at: Instant, duration: Duration, curve: CubicBezier) -> Self {
        Self {
            started_at,
            duration,
            curve,
        }
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Eased progress in [0, 1]
    pub fn eased(&self, now: Instant) -> f32 {
        self.curve.ease(self.progress(now))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// The instant the tween reaches its end
    pub fn finishes_at(&self) -> Instant {
        self.started_at + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_clamped() {
        let start = Instant::now();
        let tween = Tween::new(start, Duration::from_millis(100), CubicBezier::STANDARD);
        assert_eq!(tween.progress(start), 0.0);
        assert!((tween.progress(start + Duration::from_millis(50)) - 0.5).abs() < 1e-3);
        assert_eq!(tween.progress(start + Duration::from_secs(5)), 1.0);
        assert!(tween.is_finished(start + Duration::from_millis(100)));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let start = Instant::now();
        let tween = Tween::new(start, Duration::ZERO, CubicBezier::CUBIC_OUT);
        assert!(tween.is_finished(start));
        assert_eq!(tween.eased(start), 1.0);
    }
}
