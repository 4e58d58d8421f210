//! Shared data structures for the application state
//!
//! These structs mirror the JSON documents the site keeps on disk
//! (slot config, portfolio) plus the small records that flow between
//! the commit step and the UI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named media placeholder on the website with a fixed destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSlot {
    /// Unique slot id (e.g. "home-hero")
    pub id: String,
    /// Name shown to the operator; also used as the alt-text preview heuristic
    pub name: String,
    pub category: String,
    /// Site-relative path of the image this slot serves
    pub target_path: String,
    /// Site-relative path used when a video is chosen instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path_video: Option<String>,
    #[serde(default)]
    pub supports_video: bool,
    /// Slot has a panorama embed URL
    #[serde(default)]
    pub supports_embed_url: bool,
    /// Page the slot appears on, used to pick edits for a preview
    #[serde(default)]
    pub html_file: String,
}

impl MediaSlot {
    /// File name component of the image target
    pub fn target_file_name(&self) -> &str {
        self.target_path.rsplit('/').next().unwrap_or(&self.target_path)
    }
}

/// Ordered list of slots loaded from the config document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<MediaSlot>,
}

/// Accepted layouts of the slot config file
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped {
        #[serde(alias = "slots")]
        images: Vec<MediaSlot>,
    },
    Bare(Vec<MediaSlot>),
}

impl SlotCatalog {
    pub fn new(slots: Vec<MediaSlot>) -> Self {
        Self { slots }
    }

    /// Parse `{"images": [...]}` or a bare array of slots
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        let slots = match serde_json::from_slice::<CatalogDocument>(json)? {
            CatalogDocument::Wrapped { images } => images,
            CatalogDocument::Bare(slots) => slots,
        };
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[MediaSlot] {
        &self.slots
    }

    pub fn get(&self, id: &str) -> Option<&MediaSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for slot in &self.slots {
            if !categories.contains(&slot.category) {
                categories.push(slot.category.clone());
            }
        }
        categories
    }

    /// Slots matching a free-text query (name or category, case-insensitive)
    /// and, optionally, one exact category
    pub fn filter(&self, query: &str, category: Option<&str>) -> Vec<&MediaSlot> {
        let query = query.trim().to_lowercase();
        self.slots
            .iter()
            .filter(|slot| category.map_or(true, |c| slot.category == c))
            .filter(|slot| {
                query.is_empty()
                    || slot.name.to_lowercase().contains(&query)
                    || slot.category.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Slots carrying a panorama embed URL
    pub fn embed_slots(&self) -> impl Iterator<Item = &MediaSlot> {
        self.slots.iter().filter(|slot| slot.supports_embed_url)
    }
}

/// A portfolio category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioCategory {
    pub id: String,
    pub name: String,
}

/// One portfolio entry. `images[0]` is the cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
}

impl PortfolioItem {
    pub fn cover(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// The persisted portfolio document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioDocument {
    #[serde(default)]
    pub categories: Vec<PortfolioCategory>,
    #[serde(default)]
    pub items: Vec<PortfolioItem>,
}

/// One file to copy during commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    /// Absolute path of the chosen file
    pub source: PathBuf,
    /// Site-relative destination
    pub target: String,
}

/// Result of one copy in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyOutcome {
    /// File that was copied, so a result only settles that exact selection
    #[serde(skip)]
    pub source: PathBuf,
    pub target_path: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CopyOutcome {
    pub fn succeeded(request: &CopyRequest) -> Self {
        Self {
            source: request.source.clone(),
            target_path: request.target.clone(),
            success: true,
            error: None,
        }
    }

    pub fn failed(request: &CopyRequest, error: String) -> Self {
        Self {
            source: request.source.clone(),
            target_path: request.target.clone(),
            success: false,
            error: Some(error),
        }
    }
}
