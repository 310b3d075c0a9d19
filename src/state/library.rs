use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::data::{Collection, CollectionId, Tile};
use crate::error::{GalleryError, Result};

/// Rows in every layout column
pub const ROWS_PER_COLUMN: usize = 5;

/// Row offsets for even and odd columns (odd columns sit half a cell lower)
const EVEN_ROWS: [i32; ROWS_PER_COLUMN] = [-4, -2, 0, 2, 4];
const ODD_ROWS: [i32; ROWS_PER_COLUMN] = [-3, -1, 1, 3, 5];

/// Every tile spans 2x2 layout cells
const TILE_CELLS: u32 = 2;

/// Image extensions picked up when scanning a content directory
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// The CollectionStore holds every loaded collection and the active selection.
/// It also owns the tiles laid out for the active collection.
pub struct CollectionStore {
    collections: BTreeMap<CollectionId, Collection>,
    active: CollectionId,
    tiles: Vec<Tile>,
    segments: u32,
}

impl CollectionStore {
    /// Create a store and lay out the initial collection.
    ///
    /// Fails fast on content bugs: an empty collection, a collection larger
    /// than the layout capacity, or an initial id that was never loaded.
    pub fn new(collections: Vec<Collection>, initial: CollectionId, segments: u32) -> Result<Self> {
        let segments = segments.max(1);
        let capacity = segments as usize * ROWS_PER_COLUMN;

        let mut by_id = BTreeMap::new();
        for collection in collections {
            if collection.is_empty() {
                return Err(GalleryError::EmptyCollection(collection.id));
            }
            if collection.len() > capacity {
                return Err(GalleryError::LayoutOverflow {
                    id: collection.id,
                    count: collection.len(),
                    capacity,
                });
            }
            by_id.insert(collection.id, collection);
        }

        let initial_collection = by_id
            .get(&initial)
            .ok_or_else(|| GalleryError::UnknownCollection(initial.to_string()))?;
        let tiles = layout_tiles(initial_collection.len(), segments);

        tracing::info!(
            collections = by_id.len(),
            active = %initial,
            tiles = tiles.len(),
            "collection store initialized"
        );

        Ok(Self {
            collections: by_id,
            active: initial,
            tiles,
            segments,
        })
    }

    /// Make `id` the active collection and regenerate its tiles
    pub fn select_collection(&mut self, id: CollectionId) -> Result<&Collection> {
        let collection = self
            .collections
            .get(&id)
            .ok_or_else(|| GalleryError::UnknownCollection(id.to_string()))?;

        self.active = id;
        self.tiles = layout_tiles(collection.len(), self.segments);
        tracing::debug!(active = %id, tiles = self.tiles.len(), "collection selected");

        Ok(collection)
    }

    pub fn active_id(&self) -> CollectionId {
        self.active
    }

    pub fn active(&self) -> &Collection {
        // The constructor and select_collection only ever store loaded ids
        &self.collections[&self.active]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Ids of every loaded collection, in display order
    pub fn ids(&self) -> impl Iterator<Item = CollectionId> + '_ {
        self.collections.keys().copied()
    }
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("active", &self.active)
            .field("collections", &self.collections.len())
            .field("tiles", &self.tiles.len())
            .finish()
    }
}

/// Assign layout coordinates to `count` images.
///
/// Column-major sweep: image `i` lands in column `i / 5`, row `i % 5`.
/// Columns are centered on x = 0 and step by two cells; odd columns use
/// the shifted row pattern so tiles interlock like bricks.
pub fn layout_tiles(count: usize, segments: u32) -> Vec<Tile> {
    let columns = count.div_ceil(ROWS_PER_COLUMN) as i32;

    (0..count)
        .map(|i| {
            let column = (i / ROWS_PER_COLUMN) as i32;
            let row = i % ROWS_PER_COLUMN;
            let rows = if column % 2 == 0 { &EVEN_ROWS } else { &ODD_ROWS };
            let x = 2 * column - (columns - 1);
            Tile::new(i, x, rows[row], TILE_CELLS, TILE_CELLS, segments)
        })
        .collect()
}

// ========== Content sources ==========

/// Load collections from the first available source:
/// a content directory, the JSON manifest, or the built-in archive.
pub fn load_collections(content_dir: Option<&Path>, manifest: Option<&Path>) -> Result<Vec<Collection>> {
    if let Some(dir) = content_dir {
        tracing::info!(dir = %dir.display(), "scanning content directory");
        return scan_content_dir(dir);
    }

    if let Some(path) = manifest.filter(|path| path.exists()) {
        tracing::info!(path = %path.display(), "loading collection manifest");
        return load_manifest(path);
    }

    tracing::info!("using built-in archive");
    Ok(builtin_collections())
}

/// Read a manifest of the form `{"POWER": ["uri", ...], ...}`
pub fn load_manifest(path: &Path) -> Result<Vec<Collection>> {
    let json = std::fs::read_to_string(path).map_err(|source| GalleryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&json).map_err(|source| GalleryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_manifest(json: &str) -> std::result::Result<Vec<Collection>, serde_json::Error> {
    let manifest: BTreeMap<CollectionId, Vec<String>> = serde_json::from_str(json)?;
    Ok(manifest
        .into_iter()
        .map(|(id, uris)| Collection::new(id, uris))
        .collect())
}

/// Scan `<dir>/power`, `<dir>/voyage` and `<dir>/essence` for images.
/// Missing subdirectories are skipped; files are sorted for a stable order.
pub fn scan_content_dir(dir: &Path) -> Result<Vec<Collection>> {
    if !dir.is_dir() {
        return Err(GalleryError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "content directory not found"),
        });
    }

    let mut collections = Vec::new();
    for id in CollectionId::ALL {
        let sub_dir = dir.join(id.as_str().to_lowercase());
        if !sub_dir.is_dir() {
            tracing::warn!(collection = %id, dir = %sub_dir.display(), "collection folder missing");
            continue;
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&sub_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();
        files.sort();

        tracing::debug!(collection = %id, images = files.len(), "scanned collection folder");
        collections.push(Collection::new(
            id,
            files
                .into_iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect(),
        ));
    }

    Ok(collections)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// The archive shipped with the site: three images per collection
pub fn builtin_collections() -> Vec<Collection> {
    let archive: [(CollectionId, [&str; 3]); 3] = [
        (
            CollectionId::Power,
            [
                "https://images.unsplash.com/photo-1540962351504-03099e0a7782?q=80&w=2000",
                "https://images.unsplash.com/photo-1594938298603-c8148c47e356?q=80&w=2000",
                "https://images.unsplash.com/photo-1497366216548-37526070297c?q=80&w=2000",
            ],
        ),
        (
            CollectionId::Voyage,
            [
                "https://images.unsplash.com/photo-1569263979104-865ab7dd8d36?q=80&w=2000",
                "https://images.unsplash.com/photo-1499856871940-a09627c6d7db?q=80&w=2000",
                "https://images.unsplash.com/photo-1518096232537-88ebf256038f?q=80&w=2000",
            ],
        ),
        (
            CollectionId::Essence,
            [
                "https://images.unsplash.com/photo-1534528741775-53994a69daeb?q=80&w=2000",
                "https://images.unsplash.com/photo-1434389677669-e08b4cac3105?q=80&w=2000",
                "https://images.unsplash.com/photo-1496449903678-68ddcb189a24?q=80&w=2000",
            ],
        ),
    ];

    archive
        .into_iter()
        .map(|(id, uris)| Collection::new(id, uris.iter().map(|uri| uri.to_string()).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CollectionStore {
        CollectionStore::new(builtin_collections(), CollectionId::Power, 35).unwrap()
    }

    #[test]
    fn test_initial_collection_tiles() {
        let store = store();
        assert_eq!(store.active_id(), CollectionId::Power);
        assert_eq!(store.tiles().len(), 3);
        let coords: Vec<(i32, i32)> = store.tiles().iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(coords, [(0, -4), (0, -2), (0, 0)]);
    }

    #[test]
    fn test_layout_alternates_row_parity() {
        let tiles = layout_tiles(7, 35);
        // Two columns centered on zero
        assert_eq!((tiles[0].x, tiles[0].y), (-1, -4));
        assert_eq!((tiles[4].x, tiles[4].y), (-1, 4));
        assert_eq!((tiles[5].x, tiles[5].y), (1, -3));
        assert_eq!((tiles[6].x, tiles[6].y), (1, -1));
    }

    #[test]
    fn test_reselect_is_deterministic() {
        let mut store = store();
        store.select_collection(CollectionId::Voyage).unwrap();
        let first = store.tiles().to_vec();
        store.select_collection(CollectionId::Essence).unwrap();
        store.select_collection(CollectionId::Voyage).unwrap();
        assert_eq!(store.tiles(), first.as_slice());
    }

    #[test]
    fn test_empty_collection_fails_fast() {
        let collections = vec![Collection::new(CollectionId::Power, vec![])];
        let err = CollectionStore::new(collections, CollectionId::Power, 35).unwrap_err();
        assert!(matches!(err, GalleryError::EmptyCollection(CollectionId::Power)));
    }

    #[test]
    fn test_unknown_initial_collection_fails_fast() {
        let collections = vec![Collection::new(CollectionId::Power, vec!["a.jpg".into()])];
        let err = CollectionStore::new(collections, CollectionId::Voyage, 35).unwrap_err();
        assert!(matches!(err, GalleryError::UnknownCollection(_)));
    }

    #[test]
    fn test_select_unloaded_collection_errors() {
        let collections = vec![Collection::new(CollectionId::Power, vec!["a.jpg".into()])];
        let mut store = CollectionStore::new(collections, CollectionId::Power, 35).unwrap();
        assert!(store.select_collection(CollectionId::Essence).is_err());
        assert_eq!(store.active_id(), CollectionId::Power);
    }

    #[test]
    fn test_layout_overflow() {
        let uris = (0..11).map(|i| format!("{i}.jpg")).collect();
        let collections = vec![Collection::new(CollectionId::Power, uris)];
        let err = CollectionStore::new(collections, CollectionId::Power, 2).unwrap_err();
        assert!(matches!(err, GalleryError::LayoutOverflow { count: 11, capacity: 10, .. }));
    }

    #[test]
    fn test_parse_manifest() {
        let json = r#"{"POWER": ["a.jpg", "b.jpg"], "ESSENCE": ["c.jpg"]}"#;
        let collections = parse_manifest(json).unwrap();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].id, CollectionId::Power);
        assert_eq!(collections[0].len(), 2);
        assert_eq!(collections[1].images[0].uri, "c.jpg");
    }

    #[test]
    fn test_parse_manifest_rejects_unknown_id() {
        assert!(parse_manifest(r#"{"LEISURE": ["a.jpg"]}"#).is_err());
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("/tmp/a.JPG")));
        assert!(is_image_file(Path::new("b.webp")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn test_missing_content_dir_is_an_error() {
        let err = scan_content_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, GalleryError::Io { .. }));
    }
}
