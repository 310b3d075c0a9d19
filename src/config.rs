/// Gallery configuration
///
/// All tunables for gestures, animation timing and layout live here.
/// The config is read from `<config_dir>/vault-gallery/gallery.json`;
/// any field left out of the file keeps its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GalleryError, Result};
use crate::i18n::Language;
use crate::state::data::CollectionId;

/// Which layout strategy positions the tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Tiles on a sphere; drag spins and tilts it
    #[default]
    Sphere,
    /// Flat brick wall of tiles; drag pans it
    Grid,
}

/// Complete gallery configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GalleryConfig {
    pub layout: LayoutKind,
    pub language: Language,
    pub initial_collection: Option<CollectionId>,
    pub navigator: NavigatorConfig,
    pub focus: FocusConfig,
    pub sphere: SphereConfig,
    pub grid: GridConfig,
}

/// Drag, tap and inertia tunables
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Pixels of drag per degree of rotation
    pub drag_sensitivity: f32,
    /// Bound of the vertical (tilt) axis in degrees, applied symmetrically
    pub max_tilt_degrees: f32,
    /// Total pointer travel below which a release counts as a tap
    pub tap_threshold_px: f32,
    /// Velocity multiplier applied on every inertia tick (0 < friction < 1)
    pub friction: f32,
    /// Release speed (px/ms) needed to start an inertia loop
    pub inertia_start_speed: f32,
    /// Per-tick speed below which the inertia loop stops
    pub inertia_stop_speed: f32,
    /// Hard cap on inertia ticks
    pub max_inertia_ticks: u32,
    /// Weight of the newest pointer sample in the smoothed velocity
    pub velocity_smoothing: f32,
    /// A release this long after the last move carries no velocity
    pub release_idle_ms: u64,
    /// Nominal frame duration used to turn px/ms into per-tick motion
    pub frame_ms: f32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 15.0,
            max_tilt_degrees: 12.0,
            tap_threshold_px: 4.0,
            friction: 0.94,
            inertia_start_speed: 0.05,
            inertia_stop_speed: 0.01,
            max_inertia_ticks: 360,
            velocity_smoothing: 0.8,
            release_idle_ms: 100,
            frame_ms: 1000.0 / 60.0,
        }
    }
}

/// Focus tween, zoom and flip tunables
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct FocusConfig {
    pub enter_ms: u64,
    pub exit_ms: u64,
    pub reset_ms: u64,
    pub flip_ms: u64,
    /// Minimum time between the end of the enter tween and a close
    pub close_debounce_ms: u64,
    /// Two taps closer than this reset the zoom
    pub double_tap_ms: u64,
    pub max_scale: f32,
    /// Scale change per wheel line
    pub wheel_line_step: f32,
    /// Scale change per wheel pixel
    pub wheel_pixel_step: f32,
    /// Fraction of the viewport's short side kept free around the focused image
    pub frame_margin: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enter_ms: 600,
            exit_ms: 450,
            reset_ms: 300,
            flip_ms: 800,
            close_debounce_ms: 250,
            double_tap_ms: 300,
            max_scale: 5.0,
            wheel_line_step: 0.5,
            wheel_pixel_step: 0.01,
            frame_margin: 0.06,
        }
    }
}

/// Sphere projection tunables
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SphereConfig {
    /// Number of columns around the full circle
    pub segments: u32,
    /// Sphere radius as a fraction of the viewport's short side
    pub radius_factor: f32,
    /// Camera distance from the sphere center, in radii (> 1)
    pub camera_distance: f32,
    /// Fraction of a cell covered by its tile
    pub tile_fill: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            segments: 35,
            radius_factor: 0.9,
            camera_distance: 2.2,
            tile_fill: 0.92,
        }
    }
}

/// Grid layout tunables
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Size of one layout cell in pixels (a tile spans two)
    pub cell_px: f32,
    pub gap_px: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_px: 90.0,
            gap_px: 12.0,
        }
    }
}

impl GalleryConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vault-gallery").join("gallery.json"))
    }

    /// Load the config from `path`, or defaults when the file does not exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path.filter(|path| path.exists()) {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| GalleryError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "loaded gallery config");
                Self::from_json(&json).map_err(|source| GalleryError::Json {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => {
                tracing::info!("no gallery config found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject values that would break the engine's invariants
    pub fn validate(&self) -> Result<()> {
        let nav = &self.navigator;
        let focus = &self.focus;
        let checks = [
            (nav.drag_sensitivity > 0.0, "navigator.drag_sensitivity must be positive"),
            (nav.max_tilt_degrees >= 0.0 && nav.max_tilt_degrees <= 90.0, "navigator.max_tilt_degrees must be within [0, 90]"),
            (nav.friction > 0.0 && nav.friction < 1.0, "navigator.friction must be within (0, 1)"),
            (nav.inertia_stop_speed > 0.0, "navigator.inertia_stop_speed must be positive"),
            (nav.velocity_smoothing > 0.0 && nav.velocity_smoothing <= 1.0, "navigator.velocity_smoothing must be within (0, 1]"),
            (nav.frame_ms > 0.0, "navigator.frame_ms must be positive"),
            (focus.max_scale >= 1.0, "focus.max_scale must be at least 1"),
            (focus.frame_margin >= 0.0 && focus.frame_margin < 0.5, "focus.frame_margin must be within [0, 0.5)"),
            (self.sphere.segments > 0, "sphere.segments must be positive"),
            (self.sphere.radius_factor > 0.0, "sphere.radius_factor must be positive"),
            (self.sphere.camera_distance > 1.0, "sphere.camera_distance must be greater than 1"),
            (self.grid.cell_px > 0.0, "grid.cell_px must be positive"),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(GalleryError::InvalidConfig(reason.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GalleryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GalleryConfig::from_json(r#"{"layout": "grid", "focus": {"max_scale": 3.0}}"#).unwrap();
        assert_eq!(config.layout, LayoutKind::Grid);
        assert_eq!(config.focus.max_scale, 3.0);
        assert_eq!(config.focus.close_debounce_ms, 250);
        assert_eq!(config.navigator, NavigatorConfig::default());
    }

    #[test]
    fn test_serialization() {
        let mut config = GalleryConfig::default();
        config.language = Language::Ar;
        config.initial_collection = Some(CollectionId::Essence);

        let json = config.to_json().unwrap();
        let restored = GalleryConfig::from_json(&json).unwrap();

        assert_eq!(config, restored);
    }

    #[test]
    fn test_invalid_friction_rejected() {
        let mut config = GalleryConfig::default();
        config.navigator.friction = 1.0;
        assert!(matches!(config.validate(), Err(GalleryError::InvalidConfig(_))));
    }

    #[test]
    fn test_max_scale_below_one_rejected() {
        let mut config = GalleryConfig::default();
        config.focus.max_scale = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = GalleryConfig::load(Some(Path::new("/no/such/gallery.json"))).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }
}
