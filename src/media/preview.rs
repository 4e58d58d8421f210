//! Preview payloads for chosen or existing media files
//!
//! A preview keeps the raw file bytes (used for data: URLs when injecting
//! into a page) and, for images, a small thumbnail for the slot list.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::kind::{mime_type, MediaKind};
use super::thumbnail::generate_thumbnail;

/// In-memory preview of one media file
#[derive(Clone, PartialEq)]
pub struct MediaPreview {
    pub kind: MediaKind,
    pub mime: String,
    /// Full file contents
    pub bytes: Arc<Vec<u8>>,
    /// PNG thumbnail, images only
    pub thumbnail: Option<Arc<Vec<u8>>>,
}

impl MediaPreview {
    /// Build a preview from bytes already in memory
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Option<Self> {
        let kind = MediaKind::from_path(path)?;
        let thumbnail = match kind {
            MediaKind::Image => generate_thumbnail(&bytes).map(Arc::new),
            MediaKind::Video => None,
        };

        Some(Self {
            kind,
            mime: mime_type(path),
            bytes: Arc::new(bytes),
            thumbnail,
        })
    }

    /// Render as a `data:` URL suitable for an `src` attribute
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(self.bytes.as_slice()))
    }
}

// Bytes are elided; a video preview can be hundreds of megabytes
impl std::fmt::Debug for MediaPreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPreview")
            .field("kind", &self.kind)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("thumbnail", &self.thumbnail.is_some())
            .finish()
    }
}

/// Read a file and build its preview
///
/// Runs the thumbnail decode on the blocking pool.
pub async fn load_preview(path: PathBuf) -> Result<MediaPreview, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    tokio::task::spawn_blocking(move || {
        MediaPreview::from_bytes(&path, bytes)
            .ok_or_else(|| format!("Unsupported media file: {}", path.display()))
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}
