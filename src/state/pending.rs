//! Pending (uncommitted) media replacements, keyed by slot id
//!
//! An entry with `source == None` means the slot's target is already on
//! disk and there is nothing to copy. Only entries with a source take part
//! in a commit.

use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::data::{CopyOutcome, CopyRequest, MediaSlot, SlotCatalog};
use super::error::{SiteError, SiteResult};
use super::site::Site;
use crate::media::kind::MediaKind;
use crate::media::preview::{load_preview, MediaPreview};

/// A proposed replacement for one slot
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    /// Chosen file, or None when the slot is already satisfied on disk
    pub source: Option<PathBuf>,
    pub target_path: String,
    /// Resolved video destination (configured or derived)
    pub target_path_video: String,
    pub preview: Option<MediaPreview>,
    pub kind: MediaKind,
}

impl PendingEdit {
    /// Destination for this edit's media kind
    pub fn resolved_target(&self) -> &str {
        match self.kind {
            MediaKind::Image => &self.target_path,
            MediaKind::Video => &self.target_path_video,
        }
    }

    pub fn is_new_file(&self) -> bool {
        self.source.is_some()
    }
}

/// Video destination for a slot: the configured one, otherwise the image
/// target with its image extension swapped for `.mp4`
pub fn video_target(slot: &MediaSlot) -> String {
    static IMAGE_EXT: OnceLock<Regex> = OnceLock::new();

    if let Some(path) = &slot.target_path_video {
        return path.clone();
    }

    let re = IMAGE_EXT.get_or_init(|| {
        Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)$").expect("static regex")
    });
    re.replace(&slot.target_path, ".mp4").into_owned()
}

#[derive(Debug, Clone, Default)]
pub struct PendingEdits {
    entries: HashMap<String, PendingEdit>,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot_id: &str) -> Option<&PendingEdit> {
        self.entries.get(slot_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a newly chosen file for a slot, replacing any previous entry
    pub fn select(&mut self, slot: &MediaSlot, source: PathBuf, preview: MediaPreview) -> SiteResult<&PendingEdit> {
        let kind = MediaKind::from_path(&source)
            .ok_or_else(|| SiteError::UnsupportedMedia { path: source.clone() })?;

        if kind.is_video() && !slot.supports_video {
            return Err(SiteError::VideoNotSupported(slot.id.clone()));
        }

        debug!("Selected {} for slot {}", source.display(), slot.id);

        let edit = PendingEdit {
            source: Some(source),
            target_path: slot.target_path.clone(),
            target_path_video: video_target(slot),
            preview: Some(preview),
            kind,
        };
        self.entries.insert(slot.id.clone(), edit);

        Ok(&self.entries[&slot.id])
    }

    /// Drop a slot's pending edit. Returns the removed entry, if any.
    pub fn remove(&mut self, slot_id: &str) -> Option<PendingEdit> {
        self.entries.remove(slot_id)
    }

    /// Install scan results without clobbering newly chosen files
    pub fn merge_scan(&mut self, scanned: Vec<(String, PendingEdit)>) {
        for (slot_id, edit) in scanned {
            let keep_existing = self
                .entries
                .get(&slot_id)
                .map_or(false, PendingEdit::is_new_file);
            if !keep_existing {
                self.entries.insert(slot_id, edit);
            }
        }
    }

    pub fn has_new_files(&self) -> bool {
        self.entries.values().any(PendingEdit::is_new_file)
    }

    pub fn new_file_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_new_file()).count()
    }

    /// Edits in catalog order, skipping slots without an entry
    pub fn in_catalog_order<'a>(
        &'a self,
        catalog: &'a SlotCatalog,
    ) -> impl Iterator<Item = (&'a MediaSlot, &'a PendingEdit)> + 'a {
        catalog
            .slots()
            .iter()
            .filter_map(move |slot| self.entries.get(&slot.id).map(|edit| (slot, edit)))
    }

    /// Copy pairs for every entry holding a new file, in catalog order
    pub fn copy_requests(&self, catalog: &SlotCatalog) -> Vec<CopyRequest> {
        self.in_catalog_order(catalog)
            .filter_map(|(_, edit)| {
                edit.source.as_ref().map(|source| CopyRequest {
                    source: source.clone(),
                    target: edit.resolved_target().to_string(),
                })
            })
            .collect()
    }

    /// Drain entries whose copy succeeded. Failed ones stay for a retry,
    /// and so does a slot re-picked after the copy was requested.
    pub fn settle(&mut self, outcomes: &[CopyOutcome]) {
        self.entries.retain(|_, edit| {
            let Some(source) = &edit.source else {
                return true;
            };
            !outcomes
                .iter()
                .any(|o| o.success && &o.source == source && o.target_path == edit.resolved_target())
        });
    }
}

/// Find slots whose targets already exist on disk.
///
/// Image targets win over video targets. A preview that can't be read
/// still produces an entry, just without a preview.
pub async fn scan_existing(site: Site, catalog: SlotCatalog) -> Vec<(String, PendingEdit)> {
    let mut found = Vec::new();

    for slot in catalog.slots() {
        let target_path_video = video_target(slot);

        let (kind, existing) = if site.exists(&slot.target_path).await {
            (MediaKind::Image, slot.target_path.clone())
        } else if slot.target_path_video.is_some() && site.exists(&target_path_video).await {
            (MediaKind::Video, target_path_video.clone())
        } else {
            continue;
        };

        let preview = match load_preview(site.resolve(&existing)).await {
            Ok(preview) => Some(preview),
            Err(e) => {
                warn!("⚠️  No preview for {}: {}", slot.id, e);
                None
            }
        };

        found.push((
            slot.id.clone(),
            PendingEdit {
                source: None,
                target_path: slot.target_path.clone(),
                target_path_video,
                preview,
                kind,
            },
        ));
    }

    debug!("Found {} slots already on disk", found.len());
    found
}
