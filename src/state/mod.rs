/// State management module
///
/// This module handles all application state, including:
/// - The site on disk and its JSON documents (site.rs)
/// - Shared data structures (data.rs)
/// - Pending slot replacements (pending.rs)
/// - Panorama embed URLs (panorama.rs)
/// - Portfolio items (portfolio.rs)
/// - Batch commit (commit.rs)

pub mod commit;
pub mod data;
pub mod error;
pub mod panorama;
pub mod pending;
pub mod portfolio;
pub mod site;
