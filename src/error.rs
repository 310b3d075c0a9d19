/// Error types for the gallery
///
/// Only configuration and content problems are errors. Measurement
/// failures and gesture races are not: those degrade to "nothing happened"
/// inside the engine and never surface here.

use std::path::PathBuf;
use thiserror::Error;

use crate::state::data::CollectionId;

/// Everything that can go wrong while loading config and content
#[derive(Debug, Error)]
pub enum GalleryError {
    /// A collection id that the store does not know about
    #[error("unknown collection id: {0}")]
    UnknownCollection(String),

    /// A collection was loaded without any images
    #[error("collection {0} has no images")]
    EmptyCollection(CollectionId),

    /// More images than the sphere/grid layout has slots for
    #[error("collection {id} holds {count} images but the layout only has {capacity} slots")]
    LayoutOverflow {
        id: CollectionId,
        count: usize,
        capacity: usize,
    },

    /// A config value outside its allowed range
    #[error("invalid gallery config: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, GalleryError>;
