use std::collections::BTreeMap;
use tracing::info;

use super::error::SiteResult;
use super::site::{Site, PANORAMA_DOCUMENT};

/// Keys every panorama document carries, even when empty
pub const DEFAULT_PANORAMA_KEYS: [&str; 3] = [
    "service-panoramic-1",
    "service-panoramic-2",
    "service-panoramic-3",
];

/// Slot id → embed URL
pub type UrlMap = BTreeMap<String, String>;

fn default_shape() -> UrlMap {
    DEFAULT_PANORAMA_KEYS
        .iter()
        .map(|key| (key.to_string(), String::new()))
        .collect()
}

/// Panorama embed URLs being edited.
///
/// `loaded` is a shadow copy of what's on disk; the map is dirty
/// whenever `current` differs from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanoramaMap {
    current: UrlMap,
    loaded: UrlMap,
}

impl Default for PanoramaMap {
    fn default() -> Self {
        Self::from_loaded(default_shape())
    }
}

impl PanoramaMap {
    pub fn from_loaded(urls: UrlMap) -> Self {
        Self { current: urls.clone(), loaded: urls }
    }

    /// Load from the site, defaulting to the empty three-key shape
    pub async fn load(site: &Site) -> Self {
        Self::from_loaded(site.read_json_or(PANORAMA_DOCUMENT, default_shape).await)
    }

    /// URL for a slot, empty if unset
    pub fn get(&self, slot_id: &str) -> &str {
        self.current.get(slot_id).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, slot_id: &str, url: &str) {
        self.current.insert(slot_id.to_string(), url.trim().to_string());
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.loaded
    }

    /// Drop in-memory edits
    pub fn revert(&mut self) {
        self.current = self.loaded.clone();
    }

    pub fn urls(&self) -> &UrlMap {
        &self.current
    }

    /// Full document to write: the default keys overlaid with current values
    pub fn document(&self) -> UrlMap {
        let mut doc = default_shape();
        doc.extend(self.current.iter().map(|(k, v)| (k.clone(), v.clone())));
        doc
    }

    /// Record that `written` is now what's on disk. Edits made since it
    /// was taken stay in place and keep the map dirty.
    pub fn mark_saved(&mut self, written: &PanoramaMap) {
        self.loaded = written.current.clone();
    }

    /// Write the whole map. Dirty is cleared only once the write succeeded.
    pub async fn commit(&mut self, site: &Site) -> SiteResult<()> {
        let doc = self.document();
        site.write_json(PANORAMA_DOCUMENT, &doc).await?;

        info!("🌐 Saved {} panorama URLs", doc.len());
        self.loaded = self.current.clone();
        Ok(())
    }
}
