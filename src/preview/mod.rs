/// Live preview of pending edits
///
/// This module handles:
/// - Scanning a page for its media elements (document.rs)
/// - Ordered matcher strategies for finding a slot's element (matcher.rs)
/// - Injecting edits, or posting them when the page refuses access (inject.rs)
/// - Rendering previews into the cache directory (host.rs)

pub mod document;
pub mod host;
pub mod inject;
pub mod matcher;
