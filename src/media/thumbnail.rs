use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;

/// Size of generated thumbnails (bounding box, aspect preserved)
const THUMBNAIL_SIZE: u32 = 256;

/// Generate a PNG thumbnail from encoded image bytes.
/// Returns None if the bytes can't be decoded (corrupt file, unsupported codec).
pub fn generate_thumbnail(data: &[u8]) -> Option<Vec<u8>> {
    let img = image::load_from_memory(data).ok()?;

    // Small images are shown as-is
    let thumbnail = if img.width() <= THUMBNAIL_SIZE && img.height() <= THUMBNAIL_SIZE {
        img
    } else {
        img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
    };

    let mut buffer = Cursor::new(Vec::new());
    thumbnail.write_to(&mut buffer, ImageFormat::Png).ok()?;
    Some(buffer.into_inner())
}
