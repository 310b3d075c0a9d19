/// Gallery interaction engine
///
/// This module ties the pieces together:
/// - Spatial navigation with inertia (navigator.rs)
/// - Tile projection for the sphere and grid layouts (layout.rs)
/// - The focus/zoom state machine (focus.rs)
/// - The dossier card flip (flip.rs)
/// - Time-based easing (tween.rs)
///
/// `GalleryEngine` is toolkit independent: the UI layer feeds it pointer,
/// wheel and frame events with explicit timestamps and reads back tile and
/// overlay transforms to draw.

pub mod flip;
pub mod focus;
pub mod layout;
pub mod navigator;
pub mod tween;

use cgmath::{InnerSpace, Vector2};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use crate::geometry::{contain_fit, Rect};
use crate::state::data::{Collection, CollectionId, Image};
use crate::state::library::CollectionStore;

use flip::FlipCard;
use focus::{FocusController, FocusPhase, OverlayTransform, TapAction, WheelDelta};
use layout::{LayoutStrategy, TileTransform};
use navigator::{Release, SpatialNavigator};

/// Who owns the pointer between press and release
#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerMode {
    Idle,
    /// Driving the navigator
    Navigating,
    /// Pressed on the open overlay; may become a pan or a tap
    Overlay { start: Vector2<f32>, travelled: f32 },
}

/// The focused card as the render layer needs it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusOverlay {
    pub transform: OverlayTransform,
    /// Flip angle in degrees, 0 (image) to 180 (dossier)
    pub flip_angle: f32,
}

#[derive(Debug)]
pub struct GalleryEngine {
    config: GalleryConfig,
    store: CollectionStore,
    layout: Box<dyn LayoutStrategy>,
    navigator: SpatialNavigator,
    focus: FocusController,
    flip: FlipCard,
    viewport: Rect,
    /// Known pixel dimensions of images in the active collection
    image_sizes: HashMap<usize, (u32, u32)>,
    pointer: PointerMode,
    /// Single tap on the open image, waiting out the double-tap window
    /// before it turns the card over
    pending_flip: Option<Instant>,
}

impl GalleryEngine {
    /// Build the engine over the loaded collections.
    ///
    /// Starts on the configured collection, or the first one loaded.
    pub fn new(config: GalleryConfig, collections: Vec<Collection>) -> Result<Self> {
        config.validate()?;
        let initial = config
            .initial_collection
            .or_else(|| collections.first().map(|collection| collection.id))
            .ok_or_else(|| GalleryError::InvalidConfig("no collections were loaded".to_string()))?;

        let store = CollectionStore::new(collections, initial, config.sphere.segments)?;
        let layout = layout::build(&config);
        let navigator = SpatialNavigator::new(config.navigator, layout.axes(store.tiles()), layout.neutral());

        tracing::info!(layout = ?layout.kind(), collection = %initial, "gallery engine ready");

        Ok(Self {
            focus: FocusController::new(config.focus),
            flip: FlipCard::new(config.focus.flip_ms),
            config,
            store,
            layout,
            navigator,
            viewport: Rect::new(0.0, 0.0, 0.0, 0.0),
            image_sizes: HashMap::new(),
            pointer: PointerMode::Idle,
            pending_flip: None,
        })
    }

    // ========== Queries ==========

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn active_collection(&self) -> &Collection {
        self.store.active()
    }

    pub fn image(&self, index: usize) -> Option<&Image> {
        self.store.active().images.get(index)
    }

    pub fn orientation(&self) -> Vector2<f32> {
        self.navigator.orientation()
    }

    pub fn focus_phase(&self) -> FocusPhase {
        self.focus.phase()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// True while a tile is focused and the gallery ignores navigation
    pub fn input_suppressed(&self) -> bool {
        self.navigator.is_suppressed()
    }

    /// True while the shell should keep requesting frames
    pub fn is_animating(&self) -> bool {
        self.navigator.is_coasting()
            || self.focus.is_animating()
            || self.flip.is_animating()
            || self.pending_flip.is_some()
    }

    /// Every tile for the current orientation, back to front
    pub fn tile_transforms(&self) -> Vec<TileTransform> {
        self.layout.project_all(self.store.tiles(), self.navigator.orientation())
    }

    /// Project one tile; None when the tile does not exist
    pub fn measure_tile(&self, index: usize) -> Option<TileTransform> {
        self.store
            .tiles()
            .iter()
            .find(|tile| tile.image == index)
            .map(|tile| self.layout.project(tile, self.navigator.orientation()))
    }

    /// Front-most visible tile under `point`
    pub fn hit_test(&self, point: Vector2<f32>) -> Option<usize> {
        self.tile_transforms()
            .into_iter()
            .rev()
            .find(|transform| transform.visible && transform.rect.contains(point))
            .map(|transform| transform.tile)
    }

    pub fn overlay(&self, now: Instant) -> Option<FocusOverlay> {
        self.focus.overlay(now).map(|transform| FocusOverlay {
            flip_angle: self.flip.angle_for(transform.tile, now),
            transform,
        })
    }

    // ========== Lifecycle ==========

    /// Switch collections: closes any focus at once and re-bounds the navigator
    pub fn select_collection(&mut self, id: CollectionId) -> Result<()> {
        self.store.select_collection(id)?;
        self.focus.force_close();
        self.flip.clear();
        self.image_sizes.clear();
        self.pointer = PointerMode::Idle;
        self.pending_flip = None;
        self.navigator.set_suppressed(false);
        self.navigator.cancel();
        self.navigator.set_axes(self.layout.axes(self.store.tiles()));
        tracing::info!(collection = %id, tiles = self.store.tiles().len(), "collection switched");
        Ok(())
    }

    /// New viewport size: reprojects tiles and refits the focused image
    pub fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.layout.resize(viewport);
        self.navigator.set_axes(self.layout.axes(self.store.tiles()));
        if let Some(tile) = self.focus.focused_tile() {
            self.focus.resize(self.focus_frame(tile));
        }
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
    }

    /// Remember an image's pixel size so the focused view keeps its aspect ratio
    pub fn record_image_size(&mut self, index: usize, dimensions: (u32, u32)) {
        self.image_sizes.insert(index, dimensions);
        if self.focus.focused_tile() == Some(index) {
            self.focus.resize(self.focus_frame(index));
        }
    }

    /// Advance every running animation. Returns true while any keeps running.
    pub fn frame(&mut self, now: Instant) -> bool {
        let was_focused = self.focus.phase() != FocusPhase::Closed;

        self.navigator.tick();
        self.focus.tick(now);
        self.flip.tick(now);

        if was_focused && self.focus.phase() == FocusPhase::Closed {
            self.release_focus();
        }
        if let Some(tapped) = self.pending_flip {
            if now.saturating_duration_since(tapped) > self.double_tap_window() {
                self.pending_flip = None;
                self.toggle_flip(now);
            }
        }
        self.is_animating()
    }

    // ========== Focus ==========

    /// Focus `tile` if it is measurable on screen
    pub fn activate(&mut self, tile: usize, now: Instant) -> bool {
        let measured = self.measure_tile(tile).filter(|transform| transform.visible);
        let source = measured.map(|transform| transform.rect);
        let rotation = measured.map_or(Vector2::new(0.0, 0.0), |transform| transform.rotation);
        let frame = self.focus_frame(tile);

        if !self.focus.activate(tile, source, rotation, frame, now) {
            return false;
        }
        self.navigator.set_suppressed(true);
        self.flip.clear();
        self.pointer = PointerMode::Idle;
        self.pending_flip = None;
        true
    }

    /// Close the focused tile back into its place in the layout
    pub fn deactivate(&mut self, now: Instant) -> bool {
        let Some(tile) = self.focus.focused_tile() else {
            return false;
        };
        let source = self
            .measure_tile(tile)
            .filter(|transform| transform.visible)
            .map(|transform| transform.rect);

        if !self.focus.deactivate(source, now) {
            return false;
        }
        self.flip.clear();
        self.pointer = PointerMode::Idle;
        self.pending_flip = None;
        if self.focus.phase() == FocusPhase::Closed {
            self.release_focus();
        }
        true
    }

    pub fn toggle_flip(&mut self, now: Instant) -> bool {
        match (self.focus.phase(), self.focus.focused_tile()) {
            (FocusPhase::Open, Some(tile)) => {
                self.flip.toggle(tile, now);
                true
            }
            _ => false,
        }
    }

    pub fn reset_zoom(&mut self, now: Instant) -> bool {
        self.focus.reset_zoom(now)
    }

    fn release_focus(&mut self) {
        self.navigator.set_suppressed(false);
        self.flip.clear();
        self.pointer = PointerMode::Idle;
        self.pending_flip = None;
    }

    fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.config.focus.double_tap_ms)
    }

    /// Destination frame for `tile`: the viewport minus a margin, fitted to
    /// the image's aspect ratio when it is known
    fn focus_frame(&self, tile: usize) -> Rect {
        let margin = self.viewport.width.min(self.viewport.height) * self.config.focus.frame_margin;
        let area = self.viewport.inset(margin.max(0.0));
        let size = self.image_sizes.get(&tile).copied().unwrap_or((0, 0));
        contain_fit(size, area)
    }

    // ========== Input ==========

    pub fn pointer_down(&mut self, point: Vector2<f32>, now: Instant) -> bool {
        match self.focus.phase() {
            FocusPhase::Closed => {
                if self.navigator.begin_drag(point, now) {
                    self.pointer = PointerMode::Navigating;
                }
                false
            }
            FocusPhase::Open => {
                self.focus.begin_pan(point);
                self.pointer = PointerMode::Overlay {
                    start: point,
                    travelled: 0.0,
                };
                false
            }
            FocusPhase::Entering | FocusPhase::Exiting => false,
        }
    }

    /// Returns true when something on screen moved
    pub fn pointer_move(&mut self, point: Vector2<f32>, now: Instant) -> bool {
        match &mut self.pointer {
            PointerMode::Idle => false,
            PointerMode::Navigating => self.navigator.drag_to(point, now),
            PointerMode::Overlay { start, travelled } => {
                *travelled = travelled.max((point - *start).magnitude());
                self.focus.pan_to(point)
            }
        }
    }

    pub fn pointer_up(&mut self, point: Vector2<f32>, now: Instant) -> bool {
        let mode = std::mem::replace(&mut self.pointer, PointerMode::Idle);
        match mode {
            PointerMode::Idle => false,
            PointerMode::Navigating => match self.navigator.end_drag(point, now) {
                Release::Tap { position } => match self.hit_test(position) {
                    Some(tile) => self.activate(tile, now),
                    None => false,
                },
                Release::Coasting => true,
                Release::Settled | Release::Ignored => false,
            },
            PointerMode::Overlay { start, travelled } => {
                self.focus.end_pan();
                let travelled = travelled.max((point - start).magnitude());
                if travelled >= self.config.navigator.tap_threshold_px {
                    return false;
                }
                self.overlay_tap(point, now)
            }
        }
    }

    /// Touch lost or pointer left the window mid-gesture
    pub fn pointer_cancel(&mut self) {
        match std::mem::replace(&mut self.pointer, PointerMode::Idle) {
            PointerMode::Navigating => self.navigator.cancel(),
            PointerMode::Overlay { .. } => self.focus.end_pan(),
            PointerMode::Idle => {}
        }
    }

    pub fn wheel(&mut self, delta: WheelDelta) -> bool {
        self.focus.wheel(delta)
    }

    /// Second finger down: zoom takes over from any pan or tap
    pub fn begin_pinch(&mut self) -> bool {
        if !self.focus.begin_pinch() {
            return false;
        }
        self.pointer = PointerMode::Idle;
        true
    }

    pub fn pinch_to(&mut self, ratio: f32) -> bool {
        self.focus.pinch_to(ratio)
    }

    pub fn end_pinch(&mut self) {
        self.focus.end_pinch();
    }

    /// A tap inside the open image flips the card once the double-tap
    /// window passes, and a second quick tap resets the zoom instead.
    /// A tap outside the image closes the focus.
    fn overlay_tap(&mut self, point: Vector2<f32>, now: Instant) -> bool {
        let inside = self
            .focus
            .overlay(now)
            .is_some_and(|overlay| overlay.rect.contains(point));

        if !inside {
            return self.deactivate(now);
        }
        match self.focus.tap(now) {
            TapAction::Single => {
                self.pending_flip = Some(now);
                true
            }
            TapAction::ResetZoom => {
                self.pending_flip = None;
                true
            }
            TapAction::Ignored => false,
        }
    }
}
