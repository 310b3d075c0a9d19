use std::time::{Duration, Instant};

use super::tween::Tween;
use crate::geometry::{lerp, CubicBezier};

const FRONT: f32 = 0.0;
const BACK: f32 = 180.0;

/// Flip animation for the focused card: front shows the image,
/// back shows the dossier metadata.
#[derive(Debug, Clone)]
pub struct FlipCard {
    duration: Duration,
    tile: Option<usize>,
    from: f32,
    to: f32,
    tween: Option<Tween>,
}

impl FlipCard {
    pub fn new(flip_ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(flip_ms),
            tile: None,
            from: FRONT,
            to: FRONT,
            tween: None,
        }
    }

    /// Turn `tile` over, starting from wherever the card currently is
    pub fn toggle(&mut self, tile: usize, now: Instant) {
        if self.tile != Some(tile) {
            self.tile = Some(tile);
            self.to = FRONT;
            self.tween = None;
        }
        self.from = self.angle(now);
        self.to = if self.to == BACK { FRONT } else { BACK };
        self.tween = Some(Tween::new(now, self.duration, CubicBezier::STANDARD));
        tracing::debug!(tile, to_back = self.to == BACK, "card flip");
    }

    /// Rotation around the vertical axis in degrees, 0 (front) to 180 (back)
    pub fn angle(&self, now: Instant) -> f32 {
        match self.tween {
            Some(tween) => lerp(self.from, self.to, tween.eased(now)),
            None => self.to,
        }
    }

    /// Angle for `tile`; any other tile is face up
    pub fn angle_for(&self, tile: usize, now: Instant) -> f32 {
        if self.tile == Some(tile) {
            self.angle(now)
        } else {
            FRONT
        }
    }

    /// Returns true while the flip is still animating
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.tween.is_some_and(|tween| tween.is_finished(now)) {
            self.tween = None;
        }
        self.tween.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Back to face up without animating
    pub fn clear(&mut self) {
        self.tile = None;
        self.from = FRONT;
        self.to = FRONT;
        self.tween = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_flip_to_back_and_return() {
        let t0 = Instant::now();
        let mut card = FlipCard::new(800);
        assert_eq!(card.angle(t0), 0.0);

        card.toggle(4, t0);
        assert!(card.tick(t0 + ms(100)));
        assert!(card.angle(t0) < 90.0);
        assert!(!card.tick(t0 + ms(800)));
        assert_eq!(card.angle(t0 + ms(800)), 180.0);
        assert!(card.angle(t0 + ms(800)) > 90.0);

        let t1 = t0 + ms(1000);
        card.toggle(4, t1);
        card.tick(t1 + ms(800));
        assert_eq!(card.angle(t1 + ms(800)), 0.0);
    }

    #[test]
    fn test_toggle_mid_flip_reverses_from_current_angle() {
        let t0 = Instant::now();
        let mut card = FlipCard::new(800);
        card.toggle(1, t0);
        let midway = card.angle(t0 + ms(400));
        assert!(midway > 0.0 && midway < 180.0);

        card.toggle(1, t0 + ms(400));
        assert!((card.angle(t0 + ms(400)) - midway).abs() < 1e-3);
        assert_eq!(card.angle(t0 + ms(1200)), 0.0);
    }

    #[test]
    fn test_other_tiles_stay_face_up() {
        let t0 = Instant::now();
        let mut card = FlipCard::new(0);
        card.toggle(2, t0);
        assert_eq!(card.angle_for(2, t0), 180.0);
        assert_eq!(card.angle_for(3, t0), 0.0);

        card.clear();
        assert_eq!(card.angle_for(2, t0), 0.0);
        assert!(!card.is_animating());
    }
}
