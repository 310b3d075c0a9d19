/// Focus/zoom controller
///
/// Drives the `closed -> entering -> open -> exiting -> closed` state machine
/// for the single focused tile: the tween from the thumbnail's screen rect to
/// the full frame and back, plus wheel/pinch zoom and pan while open.

use cgmath::{Vector2, Zero};
use std::time::{Duration, Instant};

use super::tween::Tween;
use crate::config::FocusConfig;
use crate::geometry::{lerp, lerp_vec, CubicBezier, Rect};

/// Animation phase of the focused tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusPhase {
    #[default]
    Closed,
    Entering,
    Open,
    Exiting,
}

/// Zoom and pan applied to the open image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPan {
    /// Always within [1, max_scale]
    pub scale: f32,
    pub translate: Vector2<f32>,
}

impl ZoomPan {
    pub const IDENTITY: ZoomPan = ZoomPan {
        scale: 1.0,
        translate: Vector2 { x: 0.0, y: 0.0 },
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    fn lerp(&self, other: &ZoomPan, t: f32) -> ZoomPan {
        ZoomPan {
            scale: lerp(self.scale, other.scale, t),
            translate: lerp_vec(self.translate, other.translate, t),
        }
    }

    /// Where the image lands inside `frame` with this zoom applied
    pub fn apply(&self, frame: Rect) -> Rect {
        frame.scale_about_center(self.scale).translate(self.translate)
    }
}

/// Scroll wheel input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    Lines(f32),
    Pixels(f32),
}

/// The focused tile and everything needed to animate it
#[derive(Debug, Clone, PartialEq)]
pub struct FocusState {
    /// Index of the focused tile
    pub tile: usize,
    pub phase: FocusPhase,
    /// Thumbnail rect the tween starts from (and returns to)
    pub source: Rect,
    /// Full-frame rect the image occupies while open
    pub destination: Rect,
    /// The tile's orientation-derived rotation at focus time (degrees)
    pub source_rotation: Vector2<f32>,
    pub zoom: ZoomPan,
    opened_at: Option<Instant>,
}

/// What the render layer draws for the focused tile this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTransform {
    pub tile: usize,
    pub phase: FocusPhase,
    /// Screen rect of the image, zoom included
    pub rect: Rect,
    /// Residual tile rotation (degrees), zero once open
    pub rotation: Vector2<f32>,
    pub zoom: ZoomPan,
    /// Backdrop dimming in [0, 1]
    pub backdrop: f32,
}

/// Result of a tap on the open image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    Ignored,
    Single,
    ResetZoom,
}

#[derive(Debug, Clone, Copy)]
enum TweenKind {
    Enter,
    Exit { from: Rect, to: Rect },
    Reset { from: ZoomPan },
}

#[derive(Debug, Clone, Copy)]
struct ActiveTween {
    kind: TweenKind,
    tween: Tween,
}

#[derive(Debug, Clone, Copy)]
struct PanSession {
    start_pointer: Vector2<f32>,
    start_translate: Vector2<f32>,
}

#[derive(Debug)]
pub struct FocusController {
    config: FocusConfig,
    focus: Option<FocusState>,
    /// The single tween slot (enter, exit or zoom reset)
    tween: Option<ActiveTween>,
    pan: Option<PanSession>,
    pinch_start_scale: Option<f32>,
    last_tap: Option<Instant>,
}

impl FocusController {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            focus: None,
            tween: None,
            pan: None,
            pinch_start_scale: None,
            last_tap: None,
        }
    }

    pub fn phase(&self) -> FocusPhase {
        self.focus.as_ref().map_or(FocusPhase::Closed, |focus| focus.phase)
    }

    pub fn state(&self) -> Option<&FocusState> {
        self.focus.as_ref()
    }

    pub fn focused_tile(&self) -> Option<usize> {
        self.focus.as_ref().map(|focus| focus.tile)
    }

    pub fn zoom(&self) -> ZoomPan {
        self.focus.as_ref().map_or(ZoomPan::IDENTITY, |focus| focus.zoom)
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    fn is_open(&self) -> bool {
        self.phase() == FocusPhase::Open
    }

    /// Focus `tile`, tweening from its measured `source` rect into `frame`.
    ///
    /// No-op unless closed, and when either rect is missing or degenerate.
    pub fn activate(
        &mut self,
        tile: usize,
        source: Option<Rect>,
        source_rotation: Vector2<f32>,
        frame: Rect,
        now: Instant,
    ) -> bool {
        if self.focus.is_some() {
            tracing::debug!(tile, phase = ?self.phase(), "activate ignored: a tile is already focused");
            return false;
        }
        let Some(source) = source.filter(|rect| !rect.is_degenerate()) else {
            tracing::debug!(tile, "activate skipped: tile rect not measurable");
            return false;
        };
        if frame.is_degenerate() {
            tracing::debug!(tile, "activate skipped: destination frame has no area");
            return false;
        }

        self.focus = Some(FocusState {
            tile,
            phase: FocusPhase::Entering,
            source,
            destination: frame,
            source_rotation,
            zoom: ZoomPan::IDENTITY,
            opened_at: None,
        });
        self.tween = Some(ActiveTween {
            kind: TweenKind::Enter,
            tween: Tween::new(now, Duration::from_millis(self.config.enter_ms), CubicBezier::EXPO_OUT),
        });
        tracing::debug!(tile, "focus entering");
        true
    }

    /// Start closing. `source` is the tile's rect re-measured now; without it
    /// the focus closes immediately.
    ///
    /// Ignored unless open, and until the close debounce has elapsed since
    /// the enter tween completed.
    pub fn deactivate(&mut self, source: Option<Rect>, now: Instant) -> bool {
        let debounce = Duration::from_millis(self.config.close_debounce_ms);
        let Some(focus) = self.focus.as_mut() else {
            return false;
        };
        if focus.phase != FocusPhase::Open {
            tracing::debug!(phase = ?focus.phase, "deactivate ignored: focus not open");
            return false;
        }
        if let Some(opened_at) = focus.opened_at {
            if now.saturating_duration_since(opened_at) < debounce {
                tracing::debug!("deactivate ignored: within close debounce");
                return false;
            }
        }

        self.pan = None;
        self.pinch_start_scale = None;
        self.last_tap = None;

        let Some(to) = source.filter(|rect| !rect.is_degenerate()) else {
            tracing::debug!(tile = focus.tile, "source rect gone, closing without tween");
            self.focus = None;
            self.tween = None;
            return true;
        };

        let from = focus.zoom.apply(focus.destination);
        focus.phase = FocusPhase::Exiting;
        focus.source = to;
        self.tween = Some(ActiveTween {
            kind: TweenKind::Exit { from, to },
            tween: Tween::new(now, Duration::from_millis(self.config.exit_ms), CubicBezier::EXPO_OUT),
        });
        tracing::debug!(tile = focus.tile, "focus exiting");
        true
    }

    /// Drop the focus at once, without any tween (collection switch)
    pub fn force_close(&mut self) {
        if let Some(focus) = self.focus.take() {
            tracing::debug!(tile = focus.tile, phase = ?focus.phase, "focus force-closed");
        }
        self.tween = None;
        self.pan = None;
        self.pinch_start_scale = None;
        self.last_tap = None;
    }

    /// Advance the running tween. Returns true while a tween is still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(active) = self.tween else {
            return false;
        };
        let finished = active.tween.is_finished(now);

        match active.kind {
            TweenKind::Enter => {
                if finished {
                    if let Some(focus) = self.focus.as_mut() {
                        focus.phase = FocusPhase::Open;
                        focus.opened_at = Some(active.tween.finishes_at());
                        tracing::debug!(tile = focus.tile, "focus open");
                    }
                    self.tween = None;
                }
            }
            TweenKind::Exit { .. } => {
                if finished {
                    if let Some(focus) = self.focus.take() {
                        tracing::debug!(tile = focus.tile, "focus closed");
                    }
                    self.tween = None;
                }
            }
            TweenKind::Reset { from } => {
                if let Some(focus) = self.focus.as_mut() {
                    focus.zoom = if finished {
                        ZoomPan::IDENTITY
                    } else {
                        from.lerp(&ZoomPan::IDENTITY, active.tween.eased(now))
                    };
                }
                if finished {
                    self.tween = None;
                }
            }
        }

        self.tween.is_some()
    }

    /// Replace the destination frame after a resize; phase and zoom are kept
    pub fn resize(&mut self, frame: Rect) {
        if frame.is_degenerate() {
            return;
        }
        if let Some(focus) = self.focus.as_mut() {
            focus.destination = frame;
            focus.zoom.translate = clamp_translate(focus.zoom.translate, focus.zoom.scale, frame);
        }
    }

    // ========== Zoom & pan ==========

    /// Change the scale by `delta`, clamped to [1, max_scale]
    pub fn zoom_by(&mut self, delta: f32) -> bool {
        if !self.is_open() || !delta.is_finite() {
            return false;
        }
        let current = self.zoom().scale;
        self.set_scale(current + delta)
    }

    pub fn wheel(&mut self, delta: WheelDelta) -> bool {
        let step = match delta {
            WheelDelta::Lines(lines) => lines * self.config.wheel_line_step,
            WheelDelta::Pixels(pixels) => pixels * self.config.wheel_pixel_step,
        };
        self.zoom_by(step)
    }

    /// Begin a two-finger pinch; a pinch supersedes any pan
    pub fn begin_pinch(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.pan = None;
        self.pinch_start_scale = Some(self.zoom().scale);
        true
    }

    /// Scale relative to the pinch start (finger distance / initial distance)
    pub fn pinch_to(&mut self, ratio: f32) -> bool {
        let Some(start) = self.pinch_start_scale else {
            return false;
        };
        if !ratio.is_finite() || ratio <= 0.0 {
            return false;
        }
        self.set_scale(start * ratio)
    }

    pub fn end_pinch(&mut self) {
        self.pinch_start_scale = None;
    }

    /// Begin panning the open image; only possible while zoomed in
    pub fn begin_pan(&mut self, pointer: Vector2<f32>) -> bool {
        if !self.is_open() || self.pinch_start_scale.is_some() {
            return false;
        }
        self.cancel_reset();
        let zoom = self.zoom();
        if zoom.scale <= 1.0 {
            return false;
        }
        self.pan = Some(PanSession {
            start_pointer: pointer,
            start_translate: zoom.translate,
        });
        true
    }

    pub fn pan_to(&mut self, pointer: Vector2<f32>) -> bool {
        let Some(pan) = self.pan else {
            return false;
        };
        let Some(focus) = self.focus.as_mut() else {
            return false;
        };
        let target = pan.start_translate + (pointer - pan.start_pointer);
        let clamped = clamp_translate(target, focus.zoom.scale, focus.destination);
        let changed = clamped != focus.zoom.translate;
        focus.zoom.translate = clamped;
        changed
    }

    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    /// Ease back to scale 1 and no translation
    pub fn reset_zoom(&mut self, now: Instant) -> bool {
        if !self.is_open() {
            return false;
        }
        let zoom = self.zoom();
        if zoom.is_identity() {
            return false;
        }
        self.pan = None;
        self.pinch_start_scale = None;
        self.tween = Some(ActiveTween {
            kind: TweenKind::Reset { from: zoom },
            tween: Tween::new(now, Duration::from_millis(self.config.reset_ms), CubicBezier::CUBIC_OUT),
        });
        tracing::debug!(scale = zoom.scale, "zoom reset");
        true
    }

    /// A tap on the open image; the second of two quick taps resets the zoom
    pub fn tap(&mut self, now: Instant) -> TapAction {
        if !self.is_open() {
            return TapAction::Ignored;
        }
        let window = Duration::from_millis(self.config.double_tap_ms);
        match self.last_tap.take() {
            Some(previous) if now.saturating_duration_since(previous) <= window => {
                self.reset_zoom(now);
                TapAction::ResetZoom
            }
            _ => {
                self.last_tap = Some(now);
                TapAction::Single
            }
        }
    }

    /// The overlay to draw this frame, if any tile is focused
    pub fn overlay(&self, now: Instant) -> Option<OverlayTransform> {
        let focus = self.focus.as_ref()?;
        let eased = self.tween.map_or(1.0, |active| active.tween.eased(now));
        let exiting = self.tween.and_then(|active| match active.kind {
            TweenKind::Exit { from, to } => Some((from, to)),
            _ => None,
        });

        let (rect, rotation, backdrop) = match focus.phase {
            FocusPhase::Entering => (
                focus.source.lerp(&focus.destination, eased),
                lerp_vec(focus.source_rotation, Vector2::zero(), eased),
                eased,
            ),
            FocusPhase::Exiting => {
                let (from, to) = exiting.unwrap_or((focus.destination, focus.source));
                (
                    from.lerp(&to, eased),
                    lerp_vec(Vector2::zero(), focus.source_rotation, eased),
                    1.0 - eased,
                )
            }
            FocusPhase::Open | FocusPhase::Closed => {
                (focus.zoom.apply(focus.destination), Vector2::zero(), 1.0)
            }
        };

        Some(OverlayTransform {
            tile: focus.tile,
            phase: focus.phase,
            rect,
            rotation,
            zoom: focus.zoom,
            backdrop,
        })
    }

    fn set_scale(&mut self, scale: f32) -> bool {
        self.cancel_reset();
        let max_scale = self.config.max_scale;
        let Some(focus) = self.focus.as_mut() else {
            return false;
        };
        let scale = scale.clamp(1.0, max_scale);
        let translate = clamp_translate(focus.zoom.translate, scale, focus.destination);
        let next = ZoomPan { scale, translate };
        let changed = next != focus.zoom;
        focus.zoom = next;
        changed
    }

    /// Direct zoom or pan input supersedes an eased reset in flight
    fn cancel_reset(&mut self) {
        if matches!(self.tween, Some(ActiveTween { kind: TweenKind::Reset { .. }, .. })) {
            self.tween = None;
        }
    }
}

/// Keep the image center within half a zoomed image of the frame center,
/// so some of the image always stays in view. At scale 1 there is no pan.
fn clamp_translate(translate: Vector2<f32>, scale: f32, frame: Rect) -> Vector2<f32> {
    if scale <= 1.0 {
        return Vector2::zero();
    }
    let limit_x = frame.width * scale / 2.0;
    let limit_y = frame.height * scale / 2.0;
    Vector2::new(
        translate.x.clamp(-limit_x, limit_x),
        translate.y.clamp(-limit_y, limit_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: Rect = Rect::new(100.0, 100.0, 80.0, 80.0);
    const FRAME: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> FocusController {
        FocusController::new(FocusConfig::default())
    }

    /// Activate tile 1 and run the enter tween to completion
    fn open_controller(t0: Instant) -> (FocusController, Instant) {
        let mut focus = controller();
        assert!(focus.activate(1, Some(SOURCE), Vector2::new(20.0, -5.0), FRAME, t0));
        let opened = t0 + ms(FocusConfig::default().enter_ms);
        focus.tick(opened);
        assert_eq!(focus.phase(), FocusPhase::Open);
        (focus, opened)
    }

    #[test]
    fn test_open_then_debounced_close() {
        let t0 = Instant::now();
        let mut focus = controller();
        assert_eq!(focus.phase(), FocusPhase::Closed);

        assert!(focus.activate(1, Some(SOURCE), Vector2::zero(), FRAME, t0));
        assert_eq!(focus.phase(), FocusPhase::Entering);

        // Closing while entering is ignored
        assert!(!focus.deactivate(Some(SOURCE), t0 + ms(10)));

        let opened = t0 + ms(600);
        assert!(!focus.tick(opened));
        assert_eq!(focus.phase(), FocusPhase::Open);

        // 0ms after opening: debounced
        assert!(!focus.deactivate(Some(SOURCE), opened));
        assert_eq!(focus.phase(), FocusPhase::Open);

        // 300ms later the close goes through
        assert!(focus.deactivate(Some(SOURCE), opened + ms(300)));
        assert_eq!(focus.phase(), FocusPhase::Exiting);

        focus.tick(opened + ms(300) + ms(450));
        assert_eq!(focus.phase(), FocusPhase::Closed);
        assert!(focus.state().is_none());
    }

    #[test]
    fn test_zero_area_source_is_noop() {
        let mut focus = controller();
        let flat = Rect::new(10.0, 10.0, 0.0, 50.0);
        assert!(!focus.activate(0, Some(flat), Vector2::zero(), FRAME, Instant::now()));
        assert!(!focus.activate(0, None, Vector2::zero(), FRAME, Instant::now()));
        assert_eq!(focus.phase(), FocusPhase::Closed);
    }

    #[test]
    fn test_zero_area_frame_is_noop() {
        let mut focus = controller();
        let empty = Rect::new(0.0, 0.0, 0.0, 0.0);
        assert!(!focus.activate(0, Some(SOURCE), Vector2::zero(), empty, Instant::now()));
        assert_eq!(focus.phase(), FocusPhase::Closed);
    }

    #[test]
    fn test_reentrant_activate_is_noop() {
        let t0 = Instant::now();
        let mut focus = controller();
        assert!(focus.activate(1, Some(SOURCE), Vector2::zero(), FRAME, t0));
        assert!(!focus.activate(2, Some(SOURCE), Vector2::zero(), FRAME, t0));
        assert_eq!(focus.focused_tile(), Some(1));
    }

    #[test]
    fn test_wheel_zoom_accumulates_and_clamps() {
        let (mut focus, _) = open_controller(Instant::now());
        for _ in 0..3 {
            focus.zoom_by(0.5);
        }
        assert!((focus.zoom().scale - 2.5).abs() < 1e-6);

        for _ in 0..3 {
            focus.wheel(WheelDelta::Lines(1.0));
        }
        assert_eq!(focus.zoom().scale, 4.0);
        focus.wheel(WheelDelta::Lines(10.0));
        assert_eq!(focus.zoom().scale, 5.0);
        focus.wheel(WheelDelta::Pixels(-10_000.0));
        assert_eq!(focus.zoom().scale, 1.0);
    }

    #[test]
    fn test_zoom_ignored_unless_open() {
        let mut focus = controller();
        assert!(!focus.zoom_by(1.0));
        assert!(focus.activate(0, Some(SOURCE), Vector2::zero(), FRAME, Instant::now()));
        assert!(!focus.zoom_by(1.0));
        assert_eq!(focus.zoom().scale, 1.0);
    }

    #[test]
    fn test_reset_zoom_eases_to_identity() {
        let (mut focus, opened) = open_controller(Instant::now());
        focus.zoom_by(2.0);
        assert!(focus.begin_pan(Vector2::new(0.0, 0.0)));
        focus.pan_to(Vector2::new(120.0, -40.0));
        focus.end_pan();
        assert_eq!(focus.zoom().translate, Vector2::new(120.0, -40.0));

        assert!(focus.reset_zoom(opened));
        assert!(focus.tick(opened + ms(100)));
        let midway = focus.zoom();
        assert!(midway.scale > 1.0 && midway.scale < 3.0);

        assert!(!focus.tick(opened + ms(300)));
        assert_eq!(focus.zoom(), ZoomPan::IDENTITY);
    }

    #[test]
    fn test_double_tap_resets() {
        let (mut focus, opened) = open_controller(Instant::now());
        focus.zoom_by(1.0);
        assert_eq!(focus.tap(opened), TapAction::Single);
        assert_eq!(focus.tap(opened + ms(200)), TapAction::ResetZoom);
        focus.tick(opened + ms(1000));
        assert_eq!(focus.zoom(), ZoomPan::IDENTITY);
        // A slow second tap is just another single tap
        assert_eq!(focus.tap(opened + ms(2000)), TapAction::Single);
        assert_eq!(focus.tap(opened + ms(2500)), TapAction::Single);
    }

    #[test]
    fn test_pan_requires_zoom_and_is_clamped() {
        let (mut focus, _) = open_controller(Instant::now());
        assert!(!focus.begin_pan(Vector2::new(0.0, 0.0)));

        focus.zoom_by(1.0);
        assert!(focus.begin_pan(Vector2::new(0.0, 0.0)));
        focus.pan_to(Vector2::new(5000.0, 5000.0));
        let translate = focus.zoom().translate;
        assert_eq!(translate, Vector2::new(800.0, 600.0));

        // Zooming back out to 1 recenters
        focus.end_pan();
        focus.zoom_by(-1.0);
        assert_eq!(focus.zoom(), ZoomPan::IDENTITY);
    }

    #[test]
    fn test_pinch_scales_from_start() {
        let (mut focus, _) = open_controller(Instant::now());
        assert!(focus.begin_pinch());
        focus.pinch_to(2.0);
        assert_eq!(focus.zoom().scale, 2.0);
        focus.pinch_to(10.0);
        assert_eq!(focus.zoom().scale, 5.0);
        focus.pinch_to(0.1);
        assert_eq!(focus.zoom().scale, 1.0);
        focus.end_pinch();
        assert!(!focus.pinch_to(2.0));
    }

    #[test]
    fn test_close_without_source_is_immediate() {
        let (mut focus, opened) = open_controller(Instant::now());
        assert!(focus.deactivate(None, opened + ms(500)));
        assert_eq!(focus.phase(), FocusPhase::Closed);
        assert!(!focus.is_animating());
    }

    #[test]
    fn test_overlay_tween_endpoints() {
        let t0 = Instant::now();
        let mut focus = controller();
        focus.activate(3, Some(SOURCE), Vector2::new(30.0, 10.0), FRAME, t0);

        let start = focus.overlay(t0).unwrap();
        assert_eq!(start.rect, SOURCE);
        assert_eq!(start.rotation, Vector2::new(30.0, 10.0));
        assert_eq!(start.backdrop, 0.0);

        let end = focus.overlay(t0 + ms(600)).unwrap();
        assert_eq!(end.rect, FRAME);
        assert_eq!(end.rotation, Vector2::zero());
    }

    #[test]
    fn test_exit_starts_from_zoomed_rect() {
        let (mut focus, opened) = open_controller(Instant::now());
        focus.zoom_by(1.0);
        let zoomed = focus.overlay(opened).unwrap().rect;
        let close_at = opened + ms(400);
        assert!(focus.deactivate(Some(SOURCE), close_at));

        let start = focus.overlay(close_at).unwrap();
        assert_eq!(start.rect, zoomed);
        assert_eq!(start.phase, FocusPhase::Exiting);
        let end = focus.overlay(close_at + ms(450)).unwrap();
        assert_eq!(end.rect, SOURCE);
    }

    #[test]
    fn test_force_close_clears_everything() {
        let (mut focus, _) = open_controller(Instant::now());
        focus.zoom_by(1.0);
        focus.force_close();
        assert_eq!(focus.phase(), FocusPhase::Closed);
        assert_eq!(focus.zoom(), ZoomPan::IDENTITY);
        assert!(focus.overlay(Instant::now()).is_none());
    }
}
