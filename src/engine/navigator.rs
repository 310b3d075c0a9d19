/// Spatial navigator: pointer drags to a bounded 2D orientation, with inertia
///
/// The orientation is a pair of floats whose meaning depends on the layout:
/// degrees of spin/tilt for the sphere, pixels of pan for the grid.
/// Horizontal pointer motion drives `x`, vertical motion drives `y`.

use cgmath::{InnerSpace, Vector2, Zero};
use std::time::{Duration, Instant};

use crate::config::NavigatorConfig;
use crate::geometry::wrap_degrees;

/// How one orientation axis is kept in range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisBounds {
    /// Hard limits, inclusive
    Clamp { min: f32, max: f32 },
    /// Angle wrapped into (-180, 180]
    Wrap,
}

impl AxisBounds {
    pub fn apply(self, value: f32) -> f32 {
        match self {
            AxisBounds::Clamp { min, max } => value.clamp(min, max),
            AxisBounds::Wrap => wrap_degrees(value),
        }
    }

    /// True when a clamped value sits on one of its limits
    fn is_pinned(self, value: f32) -> bool {
        match self {
            AxisBounds::Clamp { min, max } => value <= min || value >= max,
            _ => false,
        }
    }
}

/// Axis bounds and drag scale, supplied by the active layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorAxes {
    pub horizontal: AxisBounds,
    pub vertical: AxisBounds,
    /// Pixels of pointer travel per orientation unit
    pub sensitivity: f32,
}

/// Current orientation and inertia velocity (orientation units per tick)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorState {
    pub orientation: Vector2<f32>,
    pub velocity: Vector2<f32>,
}

/// What a pointer release turned out to be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// No drag was in progress
    Ignored,
    /// The pointer barely moved: activate whatever is under it
    Tap { position: Vector2<f32> },
    /// A drag that ended without enough speed for inertia
    Settled,
    /// A drag that handed over to an inertia loop
    Coasting,
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    start_pointer: Vector2<f32>,
    start_orientation: Vector2<f32>,
    last_pointer: Vector2<f32>,
    last_moved_at: Instant,
    /// Smoothed pointer velocity in px/ms
    velocity: Vector2<f32>,
    /// Furthest distance from the start pointer seen so far
    travelled: f32,
}

#[derive(Debug, Clone, Copy)]
struct InertiaLoop {
    ticks: u32,
}

/// Converts drags into orientation changes and coasts after release
#[derive(Debug)]
pub struct SpatialNavigator {
    config: NavigatorConfig,
    axes: NavigatorAxes,
    state: NavigatorState,
    drag: Option<DragSession>,
    inertia: Option<InertiaLoop>,
    suppressed: bool,
}

impl SpatialNavigator {
    pub fn new(config: NavigatorConfig, axes: NavigatorAxes, neutral: Vector2<f32>) -> Self {
        let mut navigator = Self {
            config,
            axes,
            state: NavigatorState {
                orientation: Vector2::zero(),
                velocity: Vector2::zero(),
            },
            drag: None,
            inertia: None,
            suppressed: false,
        };
        navigator.state.orientation = navigator.bounded(neutral);
        navigator
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn orientation(&self) -> Vector2<f32> {
        self.state.orientation
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_coasting(&self) -> bool {
        self.inertia.is_some()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Suppress input while a tile is focused. Suppressing drops any
    /// drag or inertia in progress; the orientation is frozen as is.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        if suppressed {
            self.cancel();
        }
        self.suppressed = suppressed;
    }

    /// Swap in new axis bounds (layout change, collection change, resize)
    /// and pull the orientation back inside them
    pub fn set_axes(&mut self, axes: NavigatorAxes) {
        self.axes = axes;
        self.state.orientation = self.bounded(self.state.orientation);
    }

    /// Stop any drag or inertia without moving
    pub fn cancel(&mut self) {
        self.drag = None;
        self.inertia = None;
        self.state.velocity = Vector2::zero();
    }

    /// Start a drag at `pointer`. Returns false while suppressed.
    pub fn begin_drag(&mut self, pointer: Vector2<f32>, now: Instant) -> bool {
        if self.suppressed {
            tracing::debug!("drag ignored: navigator input is suppressed");
            return false;
        }
        if self.inertia.take().is_some() {
            tracing::debug!("inertia superseded by a new drag");
        }
        self.state.velocity = Vector2::zero();
        self.drag = Some(DragSession {
            start_pointer: pointer,
            start_orientation: self.state.orientation,
            last_pointer: pointer,
            last_moved_at: now,
            velocity: Vector2::zero(),
            travelled: 0.0,
        });
        true
    }

    /// Follow the pointer. Returns true when the orientation changed.
    pub fn drag_to(&mut self, pointer: Vector2<f32>, now: Instant) -> bool {
        let smoothing = self.config.velocity_smoothing;
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        if pointer == drag.last_pointer {
            return false;
        }

        let dt_ms = now.saturating_duration_since(drag.last_moved_at).as_secs_f32() * 1000.0;
        if dt_ms > 0.0 {
            let sample = (pointer - drag.last_pointer) / dt_ms;
            drag.velocity = drag.velocity * (1.0 - smoothing) + sample * smoothing;
        }
        drag.last_pointer = pointer;
        drag.last_moved_at = now;

        let total = pointer - drag.start_pointer;
        drag.travelled = drag.travelled.max(total.magnitude());
        let target = drag.start_orientation + total / self.axes.sensitivity;

        let before = self.state.orientation;
        self.state.orientation = self.bounded(target);
        before != self.state.orientation
    }

    /// Finish the drag and decide between tap, settle and inertia
    pub fn end_drag(&mut self, pointer: Vector2<f32>, now: Instant) -> Release {
        self.drag_to(pointer, now);
        let Some(drag) = self.drag.take() else {
            return Release::Ignored;
        };

        if drag.travelled < self.config.tap_threshold_px {
            self.state.orientation = drag.start_orientation;
            return Release::Tap { position: pointer };
        }

        let idle = now.saturating_duration_since(drag.last_moved_at);
        let velocity = if idle > Duration::from_millis(self.config.release_idle_ms) {
            Vector2::zero()
        } else {
            drag.velocity
        };

        if self.start_inertia(velocity) {
            Release::Coasting
        } else {
            Release::Settled
        }
    }

    /// Start coasting with a pointer velocity in px/ms.
    /// Returns false when the speed is below the start threshold.
    pub fn start_inertia(&mut self, velocity_px_per_ms: Vector2<f32>) -> bool {
        if self.suppressed {
            return false;
        }
        let speed = velocity_px_per_ms.magnitude();
        if !(speed > self.config.inertia_start_speed) {
            return false;
        }
        if self.inertia.is_some() {
            tracing::debug!("inertia superseded by a new release");
        }

        self.state.velocity = velocity_px_per_ms * self.config.frame_ms / self.axes.sensitivity;
        self.inertia = Some(InertiaLoop { ticks: 0 });
        tracing::debug!(speed, "inertia started");
        true
    }

    /// Advance the inertia loop by one frame. Returns true while it keeps running.
    pub fn tick(&mut self) -> bool {
        let Some(inertia) = self.inertia.as_mut() else {
            return false;
        };

        inertia.ticks += 1;
        self.state.velocity *= self.config.friction;

        if self.state.velocity.magnitude() < self.config.inertia_stop_speed
            || inertia.ticks >= self.config.max_inertia_ticks
        {
            tracing::debug!(ticks = inertia.ticks, "inertia settled");
            self.inertia = None;
            self.state.velocity = Vector2::zero();
            return false;
        }

        let next = self.bounded(self.state.orientation + self.state.velocity);
        // An axis resting on its clamp bound has nowhere to coast
        if self.axes.horizontal.is_pinned(next.x) {
            self.state.velocity.x = 0.0;
        }
        if self.axes.vertical.is_pinned(next.y) {
            self.state.velocity.y = 0.0;
        }
        self.state.orientation = next;
        true
    }

    fn bounded(&self, orientation: Vector2<f32>) -> Vector2<f32> {
        Vector2::new(
            self.axes.horizontal.apply(orientation.x),
            self.axes.vertical.apply(orientation.y),
        )
    }
}
