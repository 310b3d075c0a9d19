/// Layout strategies
///
/// A layout maps a tile plus the navigator orientation to a screen rect.
/// The sphere spins tiles around a vertical axis and tilts them; the grid
/// slides a flat brick wall under the pointer.

use cgmath::{Vector2, Zero};
use std::fmt::Debug;

use super::navigator::{AxisBounds, NavigatorAxes};
use crate::config::{GalleryConfig, GridConfig, LayoutKind, NavigatorConfig, SphereConfig};
use crate::geometry::{wrap_degrees, Rect};
use crate::state::data::Tile;

/// Where a tile lands on screen for the current orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    /// Index of the tile (and its image) in the active collection
    pub tile: usize,
    pub rect: Rect,
    /// Effective rotation in degrees (x = yaw, y = pitch)
    pub rotation: Vector2<f32>,
    /// Larger is closer to the viewer
    pub depth: f32,
    pub visible: bool,
}

pub trait LayoutStrategy: Debug + Send {
    fn kind(&self) -> LayoutKind;

    /// Navigator bounds and drag scale for this layout and tile set
    fn axes(&self, tiles: &[Tile]) -> NavigatorAxes;

    /// Orientation the gallery starts from
    fn neutral(&self) -> Vector2<f32> {
        Vector2::zero()
    }

    fn resize(&mut self, viewport: Rect);

    fn project(&self, tile: &Tile, orientation: Vector2<f32>) -> TileTransform;

    /// Project every tile, back to front
    fn project_all(&self, tiles: &[Tile], orientation: Vector2<f32>) -> Vec<TileTransform> {
        let mut transforms: Vec<TileTransform> =
            tiles.iter().map(|tile| self.project(tile, orientation)).collect();
        transforms.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        transforms
    }
}

/// Build the layout named in the config
pub fn build(config: &GalleryConfig) -> Box<dyn LayoutStrategy> {
    match config.layout {
        LayoutKind::Sphere => Box::new(SphereLayout::new(config.sphere, config.navigator)),
        LayoutKind::Grid => Box::new(GridLayout::new(config.grid)),
    }
}

// ========== Sphere ==========

#[derive(Debug, Clone)]
pub struct SphereLayout {
    config: SphereConfig,
    drag_sensitivity: f32,
    max_tilt: f32,
    viewport: Rect,
    radius: f32,
}

impl SphereLayout {
    pub fn new(config: SphereConfig, navigator: NavigatorConfig) -> Self {
        Self {
            config,
            drag_sensitivity: navigator.drag_sensitivity,
            max_tilt: navigator.max_tilt_degrees,
            viewport: Rect::new(0.0, 0.0, 0.0, 0.0),
            radius: 0.0,
        }
    }

    /// Angular size of one layout cell in degrees
    fn unit(&self) -> f32 {
        360.0 / self.config.segments.max(1) as f32 / 2.0
    }
}

impl LayoutStrategy for SphereLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Sphere
    }

    fn axes(&self, _tiles: &[Tile]) -> NavigatorAxes {
        NavigatorAxes {
            horizontal: AxisBounds::Wrap,
            vertical: AxisBounds::Clamp {
                min: -self.max_tilt,
                max: self.max_tilt,
            },
            sensitivity: self.drag_sensitivity,
        }
    }

    fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.radius = viewport.width.min(viewport.height).max(0.0) * self.config.radius_factor / 2.0;
    }

    fn project(&self, tile: &Tile, orientation: Vector2<f32>) -> TileTransform {
        let yaw = wrap_degrees(tile.base_rotation.x + orientation.x);
        let pitch = tile.base_rotation.y;
        let tilt = orientation.y;
        let (lambda, phi, theta) = (yaw.to_radians(), pitch.to_radians(), tilt.to_radians());
        let r = self.radius;

        // Screen convention: y grows downwards, z points at the viewer
        let x = r * phi.cos() * lambda.sin();
        let y = r * phi.sin();
        let z = r * phi.cos() * lambda.cos();

        let y_tilted = y * theta.cos() + z * theta.sin();
        let z_tilted = z * theta.cos() - y * theta.sin();

        let camera = r * self.config.camera_distance;
        let perspective = if camera - z_tilted > f32::EPSILON {
            camera / (camera - z_tilted)
        } else {
            0.0
        };

        let center = self.viewport.center() + Vector2::new(x, y_tilted) * perspective;
        let cell = r * self.unit().to_radians() * perspective * self.config.tile_fill;
        // Foreshortening towards the rim
        let facing = if r > 0.0 { (z_tilted / r).clamp(0.0, 1.0) } else { 0.0 };
        let width = cell * tile.size_x as f32 * lambda.cos().max(0.0).max(facing);
        let height = cell * tile.size_y as f32 * (phi + theta).cos().max(0.0);
        let rect = Rect::from_center(center, width, height);

        TileTransform {
            tile: tile.image,
            rect,
            rotation: Vector2::new(yaw, pitch + tilt),
            depth: z_tilted,
            visible: z_tilted > 0.0 && !rect.is_degenerate() && rect.intersects(&self.viewport),
        }
    }
}

// ========== Grid ==========

#[derive(Debug, Clone)]
pub struct GridLayout {
    config: GridConfig,
    viewport: Rect,
}

impl GridLayout {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            viewport: Rect::new(0.0, 0.0, 0.0, 0.0),
        }
    }
}

impl LayoutStrategy for GridLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Grid
    }

    /// Pan limits that let any tile be dragged to the center, and no further
    fn axes(&self, tiles: &[Tile]) -> NavigatorAxes {
        let cell = self.config.cell_px;
        let extent = |coord: fn(&Tile) -> i32| {
            let min = tiles.iter().map(coord).min().unwrap_or(0) as f32 * cell;
            let max = tiles.iter().map(coord).max().unwrap_or(0) as f32 * cell;
            AxisBounds::Clamp { min: -max, max: -min }
        };

        NavigatorAxes {
            horizontal: extent(|tile| tile.x),
            vertical: extent(|tile| tile.y),
            sensitivity: 1.0,
        }
    }

    fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    fn project(&self, tile: &Tile, orientation: Vector2<f32>) -> TileTransform {
        let cell = self.config.cell_px;
        let offset = Vector2::new(tile.x as f32, tile.y as f32) * cell;
        let center = self.viewport.center() + orientation + offset;
        let width = (tile.size_x as f32 * cell - self.config.gap_px).max(0.0);
        let height = (tile.size_y as f32 * cell - self.config.gap_px).max(0.0);
        let rect = Rect::from_center(center, width, height);

        TileTransform {
            tile: tile.image,
            rect,
            rotation: Vector2::zero(),
            depth: 0.0,
            visible: !self.viewport.is_degenerate() && rect.intersects(&self.viewport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::library::layout_tiles;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn sphere() -> SphereLayout {
        let mut layout = SphereLayout::new(SphereConfig::default(), NavigatorConfig::default());
        layout.resize(VIEWPORT);
        layout
    }

    fn grid() -> GridLayout {
        let mut layout = GridLayout::new(GridConfig::default());
        layout.resize(VIEWPORT);
        layout
    }

    #[test]
    fn test_sphere_front_tile_is_centered() {
        let layout = sphere();
        let tile = Tile::new(0, 0, 0, 1, 1, 35);
        let transform = layout.project(&tile, Vector2::zero());

        assert!(transform.visible);
        let center = transform.rect.center();
        assert!((center.x - 400.0).abs() < 1e-3);
        assert!((center.y - 300.0).abs() < 1e-3);
        assert_eq!(transform.rotation, Vector2::zero());
    }

    #[test]
    fn test_sphere_half_turn_hides_tile() {
        let layout = sphere();
        let tile = Tile::new(0, 0, 0, 1, 1, 35);
        let transform = layout.project(&tile, Vector2::new(180.0, 0.0));
        assert!(!transform.visible);
        assert!(transform.depth < 0.0);
    }

    #[test]
    fn test_sphere_spin_moves_tile_right() {
        let layout = sphere();
        let tile = Tile::new(0, 0, 0, 1, 1, 35);
        let before = layout.project(&tile, Vector2::zero()).rect.center();
        let after = layout.project(&tile, Vector2::new(20.0, 0.0)).rect.center();
        assert!(after.x > before.x);
    }

    #[test]
    fn test_sphere_without_viewport_is_unmeasurable() {
        let layout = SphereLayout::new(SphereConfig::default(), NavigatorConfig::default());
        let tile = Tile::new(0, 0, 0, 2, 2, 35);
        let transform = layout.project(&tile, Vector2::zero());
        assert!(transform.rect.is_degenerate());
        assert!(!transform.visible);
    }

    #[test]
    fn test_sphere_axes() {
        let axes = sphere().axes(&[]);
        assert_eq!(axes.horizontal, AxisBounds::Wrap);
        assert_eq!(axes.vertical, AxisBounds::Clamp { min: -12.0, max: 12.0 });
        assert_eq!(axes.sensitivity, 15.0);
    }

    #[test]
    fn test_project_all_sorts_back_to_front() {
        let layout = sphere();
        let tiles = layout_tiles(20, 35);
        let transforms = layout.project_all(&tiles, Vector2::new(37.0, 4.0));
        assert_eq!(transforms.len(), 20);
        assert!(transforms.windows(2).all(|pair| pair[0].depth <= pair[1].depth));
    }

    #[test]
    fn test_grid_pan_translates_rects() {
        let layout = grid();
        let tile = Tile::new(0, 2, -4, 2, 2, 35);
        let origin = layout.project(&tile, Vector2::zero()).rect;
        let panned = layout.project(&tile, Vector2::new(30.0, -10.0)).rect;

        assert_eq!(origin.center(), Vector2::new(400.0 + 180.0, 300.0 - 360.0));
        assert_eq!(origin.width, 168.0);
        assert_eq!(panned.x - origin.x, 30.0);
        assert_eq!(panned.y - origin.y, -10.0);
    }

    #[test]
    fn test_grid_axes_reach_every_tile() {
        let layout = grid();
        let tiles = layout_tiles(12, 35);
        let axes = layout.axes(&tiles);

        for tile in &tiles {
            let target = -Vector2::new(tile.x as f32, tile.y as f32) * 90.0;
            assert_eq!(axes.horizontal.apply(target.x), target.x);
            assert_eq!(axes.vertical.apply(target.y), target.y);

            let centered = layout.project(tile, target).rect.center();
            assert_eq!(centered, VIEWPORT.center());
        }
    }

    #[test]
    fn test_build_honors_kind() {
        let mut config = GalleryConfig::default();
        assert_eq!(build(&config).kind(), LayoutKind::Sphere);
        config.layout = LayoutKind::Grid;
        assert_eq!(build(&config).kind(), LayoutKind::Grid);
    }
}
