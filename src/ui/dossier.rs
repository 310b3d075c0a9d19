/// Dossier face of a flipped card
/// Lists the image's metadata rows on a dark panel
use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Frame, Path, Stroke};
use iced::widget::text::Shaping;
use iced::{Color, Pixels, Point};

use super::canvas::{to_rectangle, GOLD};
use crate::geometry::Rect;
use crate::i18n::ChromeLabels;
use crate::state::data::Image;

const PANEL: Color = Color::from_rgb(0.05, 0.05, 0.06);
const MUTED: Color = Color::from_rgb(0.55, 0.55, 0.58);

pub fn draw(frame: &mut Frame, rect: Rect, image: &Image, labels: &ChromeLabels) {
    if rect.is_degenerate() {
        return;
    }
    let bounds = to_rectangle(rect);
    frame.fill_rectangle(bounds.position(), bounds.size(), PANEL);
    frame.stroke(
        &Path::rectangle(bounds.position(), bounds.size()),
        Stroke::default().with_color(GOLD).with_width(1.5),
    );

    // Text would not fit a card squeezed edge-on
    if rect.width < 120.0 {
        return;
    }

    let padding = (rect.width * 0.06).clamp(12.0, 40.0);
    let title_size = (rect.height * 0.05).clamp(14.0, 32.0);
    let row_size = (title_size * 0.55).max(11.0);
    let left = rect.x + padding;
    let right = rect.x + rect.width - padding;
    let mut y = rect.y + padding;

    frame.fill_text(canvas::Text {
        content: image.metadata.title.to_uppercase(),
        position: Point::new(left, y),
        color: GOLD,
        size: Pixels(title_size),
        shaping: Shaping::Advanced,
        ..canvas::Text::default()
    });
    y += title_size * 1.8;

    let divider = Path::line(Point::new(left, y), Point::new(right, y));
    frame.stroke(&divider, Stroke::default().with_color(Color { a: 0.4, ..GOLD }).with_width(1.0));
    y += row_size * 1.5;

    for (label, value) in &image.metadata.fields {
        frame.fill_text(canvas::Text {
            content: label.to_string(),
            position: Point::new(left, y),
            color: MUTED,
            size: Pixels(row_size),
            ..canvas::Text::default()
        });
        frame.fill_text(canvas::Text {
            content: value.clone(),
            position: Point::new(right, y),
            color: Color::WHITE,
            size: Pixels(row_size),
            horizontal_alignment: Horizontal::Right,
            ..canvas::Text::default()
        });
        y += row_size * 2.2;
    }

    frame.fill_text(canvas::Text {
        content: labels.flip_hint.to_string(),
        position: Point::new(rect.center().x, rect.y + rect.height - padding),
        color: MUTED,
        size: Pixels(row_size * 0.9),
        horizontal_alignment: Horizontal::Center,
        vertical_alignment: Vertical::Bottom,
        shaping: Shaping::Advanced,
        ..canvas::Text::default()
    });
}
