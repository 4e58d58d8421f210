/// Views for each tab of the editor
///
/// This module handles:
/// - The media slot list with search and preview page selection (slots.rs)
/// - Panorama embed URL fields (panorama.rs)
/// - The portfolio list and item form (portfolio.rs)
/// - Commit confirmation and the per-file report (report.rs)

pub mod panorama;
pub mod portfolio;
pub mod report;
pub mod slots;
