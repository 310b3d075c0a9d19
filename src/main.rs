use cgmath::Vector2;
use iced::keyboard::{self, key::Named, Key, Modifiers};
use iced::widget::{button, canvas, column, container, image, row, stack, text, Space};
use iced::widget::text::Shaping;
use iced::{window, Alignment, Element, Length, Size, Subscription, Task, Theme};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod engine;
mod error;
mod geometry;
mod i18n;
mod preload;
mod state;
mod ui;

use config::GalleryConfig;
use engine::focus::{FocusPhase, WheelDelta};
use engine::GalleryEngine;
use geometry::Rect;
use i18n::Language;
use preload::{PreloadCache, PreloadOutcome};
use state::data::{Collection, CollectionId};

const INITIAL_WINDOW: Size = Size::new(1280.0, 800.0);

/// Main application state
struct VaultGallery {
    /// Collections, navigation and focus
    engine: GalleryEngine,
    /// Preload progress for the active collection
    preload: PreloadCache,
    /// Image handles for local files of the active collection
    handles: Vec<Option<image::Handle>>,
    language: Language,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    PointerDown(Vector2<f32>),
    PointerMoved(Vector2<f32>),
    PointerUp(Vector2<f32>),
    PointerCancelled,
    Wheel(WheelDelta),
    PinchStarted,
    /// Finger distance relative to the pinch start
    Pinched(f32),
    PinchEnded,
    /// Animation frame while the engine is animating
    Frame(Instant),
    Resized(Size),
    SelectCollection(CollectionId),
    Close,
    ResetZoom,
    ToggleFlip,
    ToggleLanguage,
    /// Background image probe finished
    Preloaded(PreloadOutcome),
}

impl VaultGallery {
    /// Create the application around an engine that already loaded its content
    fn new(mut engine: GalleryEngine, language: Language) -> (Self, Task<Message>) {
        engine.resize(Rect::new(0.0, 0.0, INITIAL_WINDOW.width, INITIAL_WINDOW.height));
        let preload = PreloadCache::new(engine.active_collection());
        let handles = image_handles(engine.active_collection());
        let task = preload_tasks(&preload);

        (
            VaultGallery {
                engine,
                preload,
                handles,
                language,
            },
            task,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let now = Instant::now();
        match message {
            Message::PointerDown(point) => {
                self.engine.pointer_down(point, now);
            }
            Message::PointerMoved(point) => {
                self.engine.pointer_move(point, now);
            }
            Message::PointerUp(point) => {
                self.engine.pointer_up(point, now);
            }
            Message::PointerCancelled => self.engine.pointer_cancel(),
            Message::Wheel(delta) => {
                self.engine.wheel(delta);
            }
            Message::PinchStarted => {
                self.engine.begin_pinch();
            }
            Message::Pinched(ratio) => {
                self.engine.pinch_to(ratio);
            }
            Message::PinchEnded => self.engine.end_pinch(),
            Message::Frame(at) => {
                self.engine.frame(at);
            }
            Message::Resized(size) => {
                self.engine.resize(Rect::new(0.0, 0.0, size.width, size.height));
            }
            Message::SelectCollection(id) => {
                if id == self.engine.active_collection().id {
                    return Task::none();
                }
                if let Err(e) = self.engine.select_collection(id) {
                    tracing::warn!(error = %e, "collection switch failed");
                    return Task::none();
                }
                // Replacing the cache drops the old one with its pending results
                self.preload = PreloadCache::new(self.engine.active_collection());
                self.handles = image_handles(self.engine.active_collection());
                return preload_tasks(&self.preload);
            }
            Message::Close => {
                self.engine.deactivate(now);
            }
            Message::ResetZoom => {
                self.engine.reset_zoom(now);
            }
            Message::ToggleFlip => {
                self.engine.toggle_flip(now);
            }
            Message::ToggleLanguage => {
                self.language = self.language.toggled();
                tracing::info!(language = self.language.code(), "language switched");
            }
            Message::Preloaded(outcome) => {
                let index = outcome.index;
                if let Some(dimensions) = self.preload.record(outcome) {
                    self.engine.record_image_size(index, dimensions);
                }
                if self.preload.is_complete() {
                    tracing::info!(collection = %self.preload.collection(), "preload complete");
                }
            }
        }

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let labels = i18n::labels(self.language);
        let gallery = canvas(ui::canvas::GalleryCanvas::new(
            &self.engine,
            &self.handles,
            labels,
            Instant::now(),
        ))
        .width(Length::Fill)
        .height(Length::Fill);

        stack![gallery, self.chrome(labels)].into()
    }

    /// Title, collection selector, progress and focus controls
    fn chrome(&self, labels: &'static i18n::ChromeLabels) -> Element<'_, Message> {
        let align = if self.language.is_rtl() {
            Alignment::End
        } else {
            Alignment::Start
        };
        let suppressed = self.engine.input_suppressed();
        let active = self.engine.active_collection().id;

        let selector = self.engine.store().ids().fold(row![].spacing(8), |selector, id| {
            let label = text(labels.category(id).to_uppercase()).shaping(Shaping::Advanced);
            let enabled = !suppressed && id != active;
            selector.push(
                button(label)
                    .padding([6, 14])
                    .style(if id == active { button::primary } else { button::secondary })
                    .on_press_maybe(enabled.then_some(Message::SelectCollection(id))),
            )
        });

        let status: Element<Message> = if self.preload.is_complete() {
            text(labels.tap_hint).size(13).shaping(Shaping::Advanced).into()
        } else {
            text(format!("{} {}%", labels.loading, self.preload.progress()))
                .size(13)
                .shaping(Shaping::Advanced)
                .into()
        };

        let language = button(text(self.language.toggled().code().to_uppercase()))
            .padding([4, 10])
            .style(button::text)
            .on_press(Message::ToggleLanguage);

        let header = column![
            row![
                text(labels.title).size(40).shaping(Shaping::Advanced),
                Space::with_width(Length::Fill),
                language,
            ]
            .align_y(Alignment::Center),
            text(labels.subtitle).size(16).shaping(Shaping::Advanced),
            selector,
            status,
        ]
        .spacing(12)
        .align_x(align);

        let mut content = column![header, Space::with_height(Length::Fill)]
            .padding(32)
            .align_x(align);

        if self.engine.focus_phase() == FocusPhase::Open {
            content = content.push(
                row![
                    text(labels.flip_hint).size(13).shaping(Shaping::Advanced),
                    Space::with_width(Length::Fill),
                    button(text(labels.exit).shaping(Shaping::Advanced))
                        .padding([8, 18])
                        .on_press(Message::Close),
                ]
                .align_y(Alignment::Center),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Frames only while something animates; resize and keys always
    fn subscription(&self) -> Subscription<Message> {
        let resize = window::resize_events().map(|(_id, size)| Message::Resized(size));
        let keys = keyboard::on_key_press(key_message);

        if self.engine.is_animating() {
            Subscription::batch([resize, keys, window::frames().map(Message::Frame)])
        } else {
            Subscription::batch([resize, keys])
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn key_message(key: Key, _modifiers: Modifiers) -> Option<Message> {
    match key.as_ref() {
        Key::Named(Named::Escape) => Some(Message::Close),
        Key::Character(c) if c.eq_ignore_ascii_case("r") => Some(Message::ResetZoom),
        Key::Character(c) if c.eq_ignore_ascii_case("f") => Some(Message::ToggleFlip),
        Key::Character(c) if c.eq_ignore_ascii_case("l") => Some(Message::ToggleLanguage),
        _ => None,
    }
}

/// Handles for images that live on disk; remote images get a placeholder
fn image_handles(collection: &Collection) -> Vec<Option<image::Handle>> {
    collection
        .images
        .iter()
        .map(|img| preload::local_path(&img.uri).map(image::Handle::from_path))
        .collect()
}

/// One background probe per image still pending
fn preload_tasks(cache: &PreloadCache) -> Task<Message> {
    let collection = cache.collection();
    Task::batch(cache.pending().into_iter().map(|(index, uri)| {
        Task::perform(preload::probe_image(collection, index, uri), Message::Preloaded)
    }))
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match GalleryConfig::load(GalleryConfig::default_path().as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load gallery config");
            std::process::exit(1);
        }
    };

    // First argument: a content directory with power/, voyage/ and essence/
    let content_dir = std::env::args_os().nth(1).map(PathBuf::from);
    let manifest = dirs::config_dir().map(|dir| dir.join("vault-gallery").join("collections.json"));

    let engine = state::library::load_collections(content_dir.as_deref(), manifest.as_deref())
        .and_then(|collections| GalleryEngine::new(config.clone(), collections));
    let engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "failed to start the gallery");
            std::process::exit(1);
        }
    };

    let language = config.language;
    iced::application("The Vault", VaultGallery::update, VaultGallery::view)
        .subscription(VaultGallery::subscription)
        .theme(VaultGallery::theme)
        .window_size(INITIAL_WINDOW)
        .centered()
        .run_with(move || VaultGallery::new(engine, language))
}
