use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image extensions accepted by the pickers and the slot matcher
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Video extensions accepted by the pickers and the slot matcher
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "webm", "ogg", "mov"];

/// Whether a file renders as `<img>` or `<video>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a file by its extension (case-insensitive).
    /// Returns None for anything that is neither a known image nor video.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = extension_of(path)?;
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn is_video(self) -> bool {
        self == MediaKind::Video
    }
}

/// Lowercased extension without the dot
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// MIME type used for data: URLs
pub fn mime_type(path: &Path) -> String {
    let ext = extension_of(path).unwrap_or_default();
    match MediaKind::from_path(path) {
        Some(MediaKind::Video) if ext == "mov" => "video/quicktime".to_string(),
        Some(MediaKind::Video) => format!("video/{}", ext),
        _ if ext == "jpg" => "image/jpeg".to_string(),
        _ => format!("image/{}", ext),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_by_extension() {
        assert_eq!(MediaKind::from_path(Path::new("a/b.JPG")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("clip.webm")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type(Path::new("x.jpg")), "image/jpeg");
        assert_eq!(mime_type(Path::new("x.jpeg")), "image/jpeg");
        assert_eq!(mime_type(Path::new("x.png")), "image/png");
        assert_eq!(mime_type(Path::new("x.mov")), "video/quicktime");
        assert_eq!(mime_type(Path::new("x.mp4")), "video/mp4");
    }
}
