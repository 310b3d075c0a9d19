/// Shared data structures for the gallery state
///
/// These structs represent the data model that flows between
/// the content loaders, the collection store and the engine.

use cgmath::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GalleryError;

/// The closed set of vault collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CollectionId {
    Power,
    Voyage,
    Essence,
}

impl CollectionId {
    pub const ALL: [CollectionId; 3] = [CollectionId::Power, CollectionId::Voyage, CollectionId::Essence];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionId::Power => "POWER",
            CollectionId::Voyage => "VOYAGE",
            CollectionId::Essence => "ESSENCE",
        }
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionId {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GalleryError::UnknownCollection(s.to_string()))
    }
}

/// Represents a single image in a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Opaque URI (local path or remote URL)
    pub uri: String,
    /// Stable position within the collection
    pub index: usize,
    /// Dossier metadata shown on the back of a flipped card
    pub metadata: ImageMetadata,
}

/// Display metadata derived from the image's identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub title: String,
    /// Synthetic identifier, e.g. "ANF-3K9Q"
    pub serial: String,
    /// Label/value rows in display order
    pub fields: Vec<(&'static str, String)>,
}

impl ImageMetadata {
    /// Derive metadata from the collection id, the stable index and the URI
    ///
    /// Recomputing for the same image always yields the same strings.
    pub fn derive(collection: CollectionId, index: usize, uri: &str) -> Self {
        let serial = format!(
            "ANF-{}",
            base36_upper(string_hash(&format!("{}:{}", collection, index)), 4)
        );
        let image_hash = format!("{:08X}", string_hash(uri) & 0xFFFF_FFFF);

        Self {
            title: format!("{} Dossier {:03}", collection, index + 1),
            fields: vec![
                ("ID", serial.clone()),
                ("ZONE", collection.to_string()),
                ("AUTH", "INSTITUTIONAL".to_string()),
                ("IMG_HASH", image_hash),
                ("STATUS", "VERIFIED".to_string()),
            ],
            serial,
        }
    }
}

/// djb2-style string hash (stable across runs and platforms)
fn string_hash(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u64::from(byte));
    }
    hash
}

/// Lowest `digits` base-36 digits of `value`, upper-case, zero padded
fn base36_upper(mut value: u64, digits: usize) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut out = vec![b'0'; digits];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// A named, ordered, immutable set of images
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub id: CollectionId,
    pub images: Vec<Image>,
}

impl Collection {
    /// Build a collection from image URIs, deriving each image's metadata
    pub fn new(id: CollectionId, uris: Vec<String>) -> Self {
        let images = uris
            .into_iter()
            .enumerate()
            .map(|(index, uri)| Image {
                metadata: ImageMetadata::derive(id, index, &uri),
                uri,
                index,
            })
            .collect();
        Self { id, images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// A positioned instance of an image within the current layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Index of the image within the active collection
    pub image: usize,
    /// Layout column offset (steps of 2 between columns)
    pub x: i32,
    /// Layout row offset (parity alternates per column)
    pub y: i32,
    /// Width in layout cells
    pub size_x: u32,
    /// Height in layout cells
    pub size_y: u32,
    /// Base orientation in degrees: x = yaw, y = pitch
    pub base_rotation: Vector2<f32>,
}

impl Tile {
    /// Place a tile and derive its base orientation from the segment count
    pub fn new(image: usize, x: i32, y: i32, size_x: u32, size_y: u32, segments: u32) -> Self {
        let unit = 360.0 / segments.max(1) as f32 / 2.0;
        let yaw = unit * (x as f32 + (size_x as f32 - 1.0) / 2.0);
        let pitch = unit * (y as f32 - (size_y as f32 - 1.0) / 2.0);
        Self {
            image,
            x,
            y,
            size_x,
            size_y,
            base_rotation: Vector2::new(yaw, pitch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_id_parse() {
        assert_eq!("power".parse::<CollectionId>().unwrap(), CollectionId::Power);
        assert_eq!(" ESSENCE ".parse::<CollectionId>().unwrap(), CollectionId::Essence);
        assert!(matches!(
            "LEISURE".parse::<CollectionId>(),
            Err(GalleryError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_metadata_is_deterministic() {
        let first = ImageMetadata::derive(CollectionId::Power, 1, "https://example.com/jet.jpg");
        let second = ImageMetadata::derive(CollectionId::Power, 1, "https://example.com/jet.jpg");
        assert_eq!(first, second);
        assert_eq!(first.title, "POWER Dossier 002");
        assert!(first.serial.starts_with("ANF-"));
        assert_eq!(first.serial.len(), 8);
    }

    #[test]
    fn test_metadata_fields_order() {
        let meta = ImageMetadata::derive(CollectionId::Voyage, 0, "yacht.jpg");
        let labels: Vec<&str> = meta.fields.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, ["ID", "ZONE", "AUTH", "IMG_HASH", "STATUS"]);
        assert_eq!(meta.fields[1].1, "VOYAGE");
        assert_eq!(meta.fields[3].1.len(), 8);
    }

    #[test]
    fn test_metadata_differs_per_index() {
        let a = ImageMetadata::derive(CollectionId::Essence, 0, "a.jpg");
        let b = ImageMetadata::derive(CollectionId::Essence, 1, "a.jpg");
        assert_ne!(a.serial, b.serial);
    }

    #[test]
    fn test_tile_base_rotation() {
        // 36 segments: unit = 5 degrees, 2x2 tile shifts by half a cell
        let tile = Tile::new(0, 2, -4, 2, 2, 36);
        assert!((tile.base_rotation.x - 12.5).abs() < 1e-4);
        assert!((tile.base_rotation.y - -22.5).abs() < 1e-4);
    }

    #[test]
    fn test_collection_new_indexes_images() {
        let collection = Collection::new(
            CollectionId::Power,
            vec!["a.jpg".into(), "b.jpg".into()],
        );
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.images[1].index, 1);
        assert_eq!(collection.images[1].uri, "b.jpg");
    }
}
