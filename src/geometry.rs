/// Screen-space geometry and easing utilities
///
/// This module holds the pure math shared by the engine:
/// - Axis-aligned rectangles in logical pixels
/// - Angle wrapping for the free rotation axis
/// - Cubic-bezier easing curves used by every tween
/// - Aspect-ratio fitting for the focused image

use cgmath::Vector2;

/// Axis-aligned rectangle in logical pixels (origin at top-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle of the given size centered on `center`
    pub fn from_center(center: Vector2<f32>, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vector2<f32> {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the rectangle cannot be used as a tween endpoint
    /// (zero, negative or non-finite size)
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || !(self.x.is_finite() && self.y.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn contains(&self, point: Vector2<f32>) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Shrink by `margin` on every side (never below zero size)
    pub fn inset(&self, margin: f32) -> Rect {
        Rect {
            x: self.x + margin,
            y: self.y + margin,
            width: (self.width - 2.0 * margin).max(0.0),
            height: (self.height - 2.0 * margin).max(0.0),
        }
    }

    /// Scale width and height around the rectangle's center
    pub fn scale_about_center(&self, scale: f32) -> Rect {
        Rect::from_center(self.center(), self.width * scale, self.height * scale)
    }

    pub fn translate(&self, offset: Vector2<f32>) -> Rect {
        Rect {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }

    /// Component-wise interpolation between two rectangles
    pub fn lerp(&self, other: &Rect, t: f32) -> Rect {
        Rect {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            width: lerp(self.width, other.width, t),
            height: lerp(self.height, other.height, t),
        }
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp_vec(a: Vector2<f32>, b: Vector2<f32>, t: f32) -> Vector2<f32> {
    a + (b - a) * t
}

/// Wrap an angle in degrees into the half-open range (-180, 180]
pub fn wrap_degrees(degrees: f32) -> f32 {
    let mut wrapped = degrees % 360.0;
    if wrapped <= -180.0 {
        wrapped += 360.0;
    } else if wrapped > 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

/// Largest rectangle with the content's aspect ratio that fits inside `frame`,
/// centered in it
///
/// Falls back to the frame itself when the content size is unknown or zero.
pub fn contain_fit(content: (u32, u32), frame: Rect) -> Rect {
    let (content_w, content_h) = (content.0 as f32, content.1 as f32);
    if content_w <= 0.0 || content_h <= 0.0 || frame.is_degenerate() {
        return frame;
    }

    let scale = (frame.width / content_w).min(frame.height / content_h);
    Rect::from_center(frame.center(), content_w * scale, content_h * scale)
}

/// CSS-style cubic-bezier timing curve with fixed endpoints (0,0) and (1,1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CubicBezier {
    /// Strong ease-out used for the focus zoom (`cubic-bezier(0.16, 1, 0.3, 1)`)
    pub const EXPO_OUT: Self = Self::new(0.16, 1.0, 0.3, 1.0);
    /// Material "standard" curve used for the card flip
    pub const STANDARD: Self = Self::new(0.4, 0.0, 0.2, 1.0);
    /// Ease-out cubic, used for the zoom reset
    pub const CUBIC_OUT: Self = Self::new(0.33, 1.0, 0.68, 1.0);

    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Map linear progress `x` in [0, 1] to eased progress
    pub fn ease(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        if x <= 0.0 || x >= 1.0 {
            return x;
        }
        let t = self.solve_t(x);
        bezier(self.y1, self.y2, t)
    }

    /// Find the curve parameter whose x coordinate equals `x`
    fn solve_t(&self, x: f32) -> f32 {
        // Newton-Raphson converges in a handful of steps for sane curves
        let mut t = x;
        for _ in 0..8 {
            let err = bezier(self.x1, self.x2, t) - x;
            if err.abs() < 1e-6 {
                return t;
            }
            let slope = bezier_slope(self.x1, self.x2, t);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= err / slope;
        }

        // Bisection fallback for flat regions
        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        let mut t = x;
        for _ in 0..32 {
            let value = bezier(self.x1, self.x2, t);
            if (value - x).abs() < 1e-6 {
                break;
            }
            if value < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        t
    }
}

/// One coordinate of a cubic bezier with endpoints 0 and 1
fn bezier(a1: f32, a2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * t * a1 + 3.0 * u * t * t * a2 + t * t * t
}

fn bezier_slope(a1: f32, a2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * a1 + 6.0 * u * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
    }

    #[test]
    fn test_wrap_difference_crosses_boundary() {
        let delta = wrap_degrees(-175.0 - 175.0);
        assert!((delta - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_rects() {
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_degenerate());
        assert!(Rect::new(f32::NAN, 0.0, 10.0, 10.0).is_degenerate());
        assert!(!Rect::new(5.0, 5.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_scale_about_center_keeps_center() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        let scaled = rect.scale_about_center(2.0);
        assert_eq!(scaled.center(), rect.center());
        assert_eq!(scaled.width, 200.0);
        assert_eq!(scaled.height, 100.0);
    }

    #[test]
    fn test_contain_fit_landscape_in_square() {
        let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
        let fitted = contain_fit((200, 100), frame);
        assert!((fitted.width - 100.0).abs() < 1e-4);
        assert!((fitted.height - 50.0).abs() < 1e-4);
        assert!((fitted.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_contain_fit_unknown_size_uses_frame() {
        let frame = Rect::new(0.0, 0.0, 80.0, 60.0);
        assert_eq!(contain_fit((0, 0), frame), frame);
    }

    #[test]
    fn test_bezier_endpoints_and_monotonic() {
        for curve in [CubicBezier::EXPO_OUT, CubicBezier::STANDARD, CubicBezier::CUBIC_OUT] {
            assert_eq!(curve.ease(0.0), 0.0);
            assert_eq!(curve.ease(1.0), 1.0);
            let mut previous = 0.0;
            for step in 1..=20 {
                let value = curve.ease(step as f32 / 20.0);
                assert!(value + 1e-4 >= previous, "curve must not run backwards");
                previous = value;
            }
        }
    }

    #[test]
    fn test_expo_out_front_loads_motion() {
        // Most of the distance is covered early
        assert!(CubicBezier::EXPO_OUT.ease(0.3) > 0.7);
    }
}
