/// Media file handling
///
/// This module handles:
/// - Classifying files as image or video by extension
/// - Loading previews (raw bytes + data: URLs)
/// - Generating thumbnails for the slot list

pub mod kind;
pub mod preview;
pub mod thumbnail;
