/// Image preloading for the active collection
///
/// Probes every image of the active collection once so the gallery can show
/// a progress figure and size the focused view to the image's aspect ratio.
/// The cache lives as long as its collection stays active; switching
/// collections drops it and starts a new one.

use std::path::Path;

use crate::state::data::{Collection, CollectionId};

/// Per-image preload state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadStatus {
    Pending,
    Loaded { width: u32, height: u32 },
    Failed(String),
}

impl PreloadStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, PreloadStatus::Pending)
    }
}

/// Result of probing one image, tagged with the collection it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadOutcome {
    pub collection: CollectionId,
    pub index: usize,
    pub result: Result<(u32, u32), String>,
}

#[derive(Debug)]
pub struct PreloadCache {
    collection: CollectionId,
    uris: Vec<String>,
    slots: Vec<PreloadStatus>,
}

impl PreloadCache {
    pub fn new(collection: &Collection) -> Self {
        tracing::debug!(collection = %collection.id, images = collection.len(), "preload cache created");
        Self {
            collection: collection.id,
            uris: collection.images.iter().map(|image| image.uri.clone()).collect(),
            slots: vec![PreloadStatus::Pending; collection.len()],
        }
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    /// Images still waiting to be probed, as (index, uri)
    pub fn pending(&self) -> Vec<(usize, String)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, status)| !status.is_settled())
            .filter_map(|(index, _)| self.uris.get(index).map(|uri| (index, uri.clone())))
            .collect()
    }

    /// Store a probe result. Returns the dimensions when the image loaded.
    ///
    /// Results for another collection, or for an index this cache does not
    /// hold, are stale and dropped.
    pub fn record(&mut self, outcome: PreloadOutcome) -> Option<(u32, u32)> {
        if outcome.collection != self.collection {
            tracing::debug!(
                stale = %outcome.collection,
                active = %self.collection,
                "dropping preload result for inactive collection"
            );
            return None;
        }
        let slot = self.slots.get_mut(outcome.index)?;

        match outcome.result {
            Ok((width, height)) => {
                *slot = PreloadStatus::Loaded { width, height };
                Some((width, height))
            }
            Err(reason) => {
                tracing::warn!(index = outcome.index, %reason, "image preload failed");
                *slot = PreloadStatus::Failed(reason);
                None
            }
        }
    }

    pub fn status(&self, index: usize) -> Option<&PreloadStatus> {
        self.slots.get(index)
    }

    /// Settled images as a rounded percentage
    pub fn progress(&self) -> u8 {
        if self.slots.is_empty() {
            return 100;
        }
        let settled = self.slots.iter().filter(|status| status.is_settled()).count();
        ((settled as f32 / self.slots.len() as f32) * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(PreloadStatus::is_settled)
    }
}

impl Drop for PreloadCache {
    fn drop(&mut self) {
        tracing::debug!(collection = %self.collection, progress = self.progress(), "preload cache torn down");
    }
}

/// Probe an image's pixel dimensions off the UI thread
pub async fn probe_image(collection: CollectionId, index: usize, uri: String) -> PreloadOutcome {
    let result = tokio::task::spawn_blocking(move || probe_image_blocking(&uri))
        .await
        .map_err(|e| format!("Task join error: {}", e))
        .and_then(|result| result);

    PreloadOutcome {
        collection,
        index,
        result,
    }
}

/// Blocking version of the probe: reads only the image header
fn probe_image_blocking(uri: &str) -> Result<(u32, u32), String> {
    let path = local_path(uri).ok_or_else(|| format!("Remote image not available offline: {}", uri))?;
    if !path.exists() {
        return Err(format!("Image file does not exist: {}", path.display()));
    }
    image::image_dimensions(path).map_err(|e| format!("Failed to read image header: {}", e))
}

/// The filesystem path behind a URI, or None for remote URIs
pub fn local_path(uri: &str) -> Option<&Path> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Some(Path::new(path));
    }
    if uri.contains("://") {
        return None;
    }
    Some(Path::new(uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> Collection {
        Collection::new(
            CollectionId::Voyage,
            vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()],
        )
    }

    fn outcome(index: usize, result: Result<(u32, u32), String>) -> PreloadOutcome {
        PreloadOutcome {
            collection: CollectionId::Voyage,
            index,
            result,
        }
    }

    #[test]
    fn test_progress_counts_failures_as_settled() {
        let mut cache = PreloadCache::new(&collection());
        assert_eq!(cache.progress(), 0);
        assert!(!cache.is_complete());

        assert_eq!(cache.record(outcome(0, Ok((800, 600)))), Some((800, 600)));
        assert_eq!(cache.progress(), 33);

        assert_eq!(cache.record(outcome(2, Err("broken".into()))), None);
        assert_eq!(cache.progress(), 67);
        assert_eq!(cache.pending(), vec![(1, "b.jpg".to_string())]);

        cache.record(outcome(1, Ok((10, 10))));
        assert_eq!(cache.progress(), 100);
        assert!(cache.is_complete());
        assert_eq!(cache.status(0), Some(&PreloadStatus::Loaded { width: 800, height: 600 }));
        assert!(matches!(cache.status(2), Some(PreloadStatus::Failed(_))));
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut cache = PreloadCache::new(&collection());
        let stale = PreloadOutcome {
            collection: CollectionId::Power,
            index: 0,
            result: Ok((1, 1)),
        };
        assert_eq!(cache.record(stale), None);
        assert_eq!(cache.status(0), Some(&PreloadStatus::Pending));
        assert_eq!(cache.record(outcome(9, Ok((1, 1)))), None);
    }

    #[test]
    fn test_local_path_detection() {
        assert_eq!(local_path("/tmp/a.png"), Some(Path::new("/tmp/a.png")));
        assert_eq!(local_path("file:///tmp/a.png"), Some(Path::new("/tmp/a.png")));
        assert_eq!(local_path("https://example.com/a.png"), None);
    }

    #[test]
    fn test_remote_probe_fails_offline() {
        assert!(probe_image_blocking("https://example.com/a.png").is_err());
        assert!(probe_image_blocking("/no/such/image.png").is_err());
    }
}
