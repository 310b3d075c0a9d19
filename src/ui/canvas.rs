use cgmath::Vector2;
use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Frame, Path, Program, Stroke};
use iced::widget::image;
use iced::widget::text::Shaping;
use iced::{Color, Pixels, Point, Rectangle, Renderer, Size, Theme};
use std::collections::HashMap;
use std::time::Instant;

use super::dossier;
use crate::engine::focus::{FocusPhase, WheelDelta};
use crate::engine::GalleryEngine;
use crate::geometry::Rect;
use crate::i18n::ChromeLabels;
use crate::state::data::Image;
use crate::Message;

const BACKGROUND: Color = Color::from_rgb(0.02, 0.02, 0.03);
const PANEL: Color = Color::from_rgb(0.09, 0.09, 0.11);
pub(super) const GOLD: Color = Color::from_rgb(0.83, 0.69, 0.22);

/// Renders the gallery tiles and the focused card, and turns raw
/// mouse and touch input into engine messages
pub struct GalleryCanvas<'a> {
    engine: &'a GalleryEngine,
    /// Decoded handles for local images, by image index
    handles: &'a [Option<image::Handle>],
    labels: &'static ChromeLabels,
    now: Instant,
}

impl<'a> GalleryCanvas<'a> {
    pub fn new(
        engine: &'a GalleryEngine,
        handles: &'a [Option<image::Handle>],
        labels: &'static ChromeLabels,
        now: Instant,
    ) -> Self {
        Self {
            engine,
            handles,
            labels,
            now,
        }
    }

    fn draw_card(&self, frame: &mut Frame, index: usize, rect: Rect, alpha: f32) {
        if rect.is_degenerate() {
            return;
        }
        let bounds = to_rectangle(rect);

        match self.handles.get(index).and_then(Option::as_ref) {
            Some(handle) => frame.draw_image(bounds, handle),
            None => {
                frame.fill_rectangle(bounds.position(), bounds.size(), with_alpha(PANEL, alpha));
                if let Some(image) = self.engine.image(index) {
                    self.draw_placeholder_label(frame, rect, image, alpha);
                }
            }
        }

        frame.stroke(
            &Path::rectangle(bounds.position(), bounds.size()),
            Stroke::default()
                .with_color(with_alpha(GOLD, 0.35 * alpha))
                .with_width(1.0),
        );
    }

    /// Remote images are not fetched; show the serial in their place
    fn draw_placeholder_label(&self, frame: &mut Frame, rect: Rect, image: &Image, alpha: f32) {
        let center = rect.center();
        frame.fill_text(canvas::Text {
            content: image.metadata.serial.clone(),
            position: Point::new(center.x, center.y),
            color: with_alpha(GOLD, alpha),
            size: Pixels((rect.height * 0.08).clamp(8.0, 18.0)),
            horizontal_alignment: iced::alignment::Horizontal::Center,
            vertical_alignment: iced::alignment::Vertical::Center,
            shaping: Shaping::Advanced,
            ..canvas::Text::default()
        });
    }
}

/// Pointer bookkeeping between canvas events
#[derive(Debug, Default)]
pub struct PointerState {
    mouse_down: bool,
    fingers: HashMap<touch::Finger, Point>,
    /// Finger distance when the pinch began
    pinch_distance: Option<f32>,
}

impl PointerState {
    fn finger_distance(&self) -> Option<f32> {
        let mut points = self.fingers.values();
        let (a, b) = (points.next()?, points.next()?);
        Some(a.distance(*b))
    }
}

impl<'a> Program<Message> for GalleryCanvas<'a> {
    type State = PointerState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let local = |point: Point| Vector2::new(point.x - bounds.x, point.y - bounds.y);

        let message = match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(position) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };
                state.mouse_down = true;
                Some(Message::PointerDown(Vector2::new(position.x, position.y)))
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) if state.mouse_down => {
                Some(Message::PointerMoved(local(position)))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if state.mouse_down => {
                state.mouse_down = false;
                match cursor.position() {
                    Some(position) => Some(Message::PointerUp(local(position))),
                    None => Some(Message::PointerCancelled),
                }
            }
            canvas::Event::Mouse(mouse::Event::CursorLeft) if state.mouse_down => {
                state.mouse_down = false;
                Some(Message::PointerCancelled)
            }
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.position_in(bounds).is_none() {
                    return (canvas::event::Status::Ignored, None);
                }
                Some(Message::Wheel(match delta {
                    mouse::ScrollDelta::Lines { y, .. } => WheelDelta::Lines(y),
                    mouse::ScrollDelta::Pixels { y, .. } => WheelDelta::Pixels(y),
                }))
            }
            canvas::Event::Touch(touch::Event::FingerPressed { id, position }) => {
                state.fingers.insert(id, position);
                match state.fingers.len() {
                    1 => Some(Message::PointerDown(local(position))),
                    2 => {
                        state.pinch_distance = state.finger_distance();
                        Some(Message::PinchStarted)
                    }
                    _ => None,
                }
            }
            canvas::Event::Touch(touch::Event::FingerMoved { id, position }) => {
                state.fingers.insert(id, position);
                match (state.pinch_distance, state.finger_distance()) {
                    (Some(start), Some(current)) if start > 0.0 => Some(Message::Pinched(current / start)),
                    (None, _) if state.fingers.len() == 1 => Some(Message::PointerMoved(local(position))),
                    _ => None,
                }
            }
            canvas::Event::Touch(touch::Event::FingerLifted { id, position }) => {
                state.fingers.remove(&id);
                if state.pinch_distance.is_some() {
                    if state.fingers.len() < 2 {
                        state.pinch_distance = None;
                        Some(Message::PinchEnded)
                    } else {
                        None
                    }
                } else if state.fingers.is_empty() {
                    Some(Message::PointerUp(local(position)))
                } else {
                    None
                }
            }
            canvas::Event::Touch(touch::Event::FingerLost { id, .. }) => {
                state.fingers.remove(&id);
                if state.pinch_distance.take().is_some() {
                    Some(Message::PinchEnded)
                } else {
                    Some(Message::PointerCancelled)
                }
            }
            _ => None,
        };

        match message {
            Some(message) => (canvas::event::Status::Captured, Some(message)),
            None => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        let overlay = self.engine.overlay(self.now);
        let focused = overlay.map(|overlay| overlay.transform.tile);
        let viewport = self.engine.viewport();

        for transform in self.engine.tile_transforms() {
            if !transform.visible || Some(transform.tile) == focused {
                continue;
            }
            // Fade tiles towards the rim of the sphere
            let alpha = if transform.depth > 0.0 && viewport.height > 0.0 {
                (0.35 + transform.depth / viewport.height).clamp(0.35, 1.0)
            } else {
                1.0
            };
            self.draw_card(&mut frame, transform.tile, transform.rect, alpha);
        }

        if let Some(overlay) = overlay {
            let transform = overlay.transform;
            frame.fill_rectangle(
                Point::ORIGIN,
                bounds.size(),
                Color::from_rgba(0.0, 0.0, 0.0, 0.85 * transform.backdrop),
            );

            // Flip squeezes the card horizontally about its center
            let squeeze = overlay.flip_angle.to_radians().cos().abs();
            let rect = Rect::from_center(
                transform.rect.center(),
                transform.rect.width * squeeze,
                transform.rect.height,
            );

            if overlay.flip_angle > 90.0 {
                if let Some(image) = self.engine.image(transform.tile) {
                    dossier::draw(&mut frame, rect, image, self.labels);
                }
            } else {
                self.draw_card(&mut frame, transform.tile, rect, 1.0);
                // Still turned away while tweening: shade like a tile at the rim
                let shade = rim_shade(transform.rotation);
                if shade > 0.0 && !rect.is_degenerate() {
                    let bounds = to_rectangle(rect);
                    frame.fill_rectangle(
                        bounds.position(),
                        bounds.size(),
                        Color::from_rgba(0.0, 0.0, 0.0, shade),
                    );
                }
            }

            if transform.phase == FocusPhase::Open && transform.zoom.scale > 1.0 {
                frame.fill_text(canvas::Text {
                    content: format!("{:.1}x", transform.zoom.scale),
                    position: Point::new(bounds.width - 24.0, bounds.height - 24.0),
                    color: GOLD,
                    size: Pixels(14.0),
                    horizontal_alignment: iced::alignment::Horizontal::Right,
                    vertical_alignment: iced::alignment::Vertical::Bottom,
                    ..canvas::Text::default()
                });
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if self.engine.input_suppressed() {
            return mouse::Interaction::default();
        }
        if state.mouse_down {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(position) if self.engine.hit_test(Vector2::new(position.x, position.y)).is_some() => {
                mouse::Interaction::Pointer
            }
            Some(_) => mouse::Interaction::Grab,
            None => mouse::Interaction::default(),
        }
    }
}

pub(super) fn to_rectangle(rect: Rect) -> Rectangle {
    Rectangle::new(Point::new(rect.x, rect.y), Size::new(rect.width, rect.height))
}

pub(super) fn with_alpha(color: Color, alpha: f32) -> Color {
    Color { a: color.a * alpha, ..color }
}

/// Darkening for a card turned by `rotation` (yaw, pitch in degrees),
/// zero when it faces the viewer
fn rim_shade(rotation: Vector2<f32>) -> f32 {
    let facing = rotation.x.to_radians().cos() * rotation.y.to_radians().cos();
    0.65 * (1.0 - facing.clamp(0.0, 1.0))
}
