use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::document::PageDocument;
use super::inject::{inject, InjectionOutcome, PreviewError, PreviewHost, PreviewMessage};
use crate::state::data::SlotCatalog;
use crate::state::pending::PendingEdits;
use crate::state::site::Site;

/// Page shown when the editor opens
pub const DEFAULT_PREVIEW_PAGE: &str = "portfolio.html";

/// Get the cache directory for rendered previews
/// Returns ~/.cache/site-media-editor/previews on Linux
pub fn get_preview_cache_dir() -> PathBuf {
    let mut path = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);

    path.push("site-media-editor");
    path.push("previews");
    path
}

/// Pages that can be previewed: top-level HTML files of the site plus
/// any page a slot points at, sorted and de-duplicated
pub fn discover_pages(site_root: &Path, catalog: &SlotCatalog) -> Vec<String> {
    let mut pages: Vec<String> = WalkDir::new(site_root)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.to_lowercase().ends_with(".html").then_some(name)
        })
        .collect();

    pages.extend(
        catalog
            .slots()
            .iter()
            .filter(|slot| !slot.html_file.is_empty())
            .map(|slot| slot.html_file.clone()),
    );

    pages.sort();
    pages.dedup();
    pages
}

/// A site page rendered to a standalone file in the preview cache.
///
/// The page is read lazily on first access; a page that can't be read
/// counts as refusing direct access, and messages are written next to
/// where the rendered page would go.
pub struct FilePageHost {
    site: Site,
    page: String,
    output_dir: PathBuf,
    document: Option<PageDocument>,
    message_path: Option<PathBuf>,
}

impl FilePageHost {
    pub fn new(site: Site, page: &str, output_dir: PathBuf) -> Self {
        Self {
            site,
            page: page.to_string(),
            output_dir,
            document: None,
            message_path: None,
        }
    }

    fn output_path(&self, suffix: &str) -> PathBuf {
        let flat = self.page.replace(['/', '\\'], "_");
        self.output_dir.join(format!("{}{}", flat, suffix))
    }

    /// Write the edited page (if it was opened) and return where the
    /// preview ended up
    pub fn finish(self) -> Result<PathBuf, String> {
        let path = self.output_path("");
        let Some(mut document) = self.document else {
            return self
                .message_path
                .ok_or_else(|| format!("Nothing rendered for {}", self.page));
        };

        // Relative assets keep resolving against the real site
        let page_dir = self
            .site
            .resolve(&self.page)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.site.root().to_path_buf());
        let page_dir = std::path::absolute(&page_dir).unwrap_or(page_dir);
        document.set_base(&directory_url(&page_dir));

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| format!("Failed to create preview directory: {}", e))?;
        fs::write(&path, document.into_html())
            .map_err(|e| format!("Failed to write preview: {}", e))?;

        debug!("Wrote preview {}", path.display());
        Ok(path)
    }
}

/// `file://` URL of a directory, with a trailing slash. Segments are
/// percent-encoded and a Windows drive becomes `/C:`.
fn directory_url(dir: &Path) -> String {
    let mut url = String::from("file://");
    for component in dir.components() {
        match component {
            Component::Prefix(prefix) => {
                url.push('/');
                url.push_str(&prefix.as_os_str().to_string_lossy());
            }
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => url.push_str("/.."),
            Component::Normal(segment) => {
                url.push('/');
                url.push_str(&percent_encode(&segment.to_string_lossy()));
            }
        }
    }
    url.push('/');
    url
}

fn percent_encode(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

impl PreviewHost for FilePageHost {
    fn document(&mut self) -> Result<&mut PageDocument, PreviewError> {
        if self.document.is_none() {
            let path = self.site.resolve(&self.page);
            let html = fs::read_to_string(&path)
                .map_err(|e| PreviewError::AccessDenied(format!("{}: {}", path.display(), e)))?;
            self.document = Some(PageDocument::new(html));
        }

        self.document
            .as_mut()
            .ok_or_else(|| PreviewError::AccessDenied(self.page.clone()))
    }

    fn post_message(&mut self, message: &PreviewMessage) -> Result<(), PreviewError> {
        let path = self.output_path(".update-media.json");
        let json = serde_json::to_string_pretty(message).map_err(|e| PreviewError::Delivery(e.to_string()))?;

        fs::create_dir_all(&self.output_dir).map_err(|e| PreviewError::Delivery(e.to_string()))?;
        fs::write(&path, json).map_err(|e| PreviewError::Delivery(e.to_string()))?;

        self.message_path = Some(path);
        Ok(())
    }
}

/// Result of rendering a preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRender {
    pub page: String,
    /// Rendered page, or the posted message file
    pub path: PathBuf,
    pub outcome: InjectionOutcome,
}

/// Render pending edits into a copy of `page`
///
/// Runs on the blocking pool; pages are small but previews carry
/// base64-encoded media.
pub async fn render_preview(
    site: Site,
    page: String,
    catalog: SlotCatalog,
    pending: PendingEdits,
    output_dir: PathBuf,
) -> Result<PreviewRender, String> {
    tokio::task::spawn_blocking(move || {
        let mut host = FilePageHost::new(site, &page, output_dir);
        let outcome = inject(&mut host, &page, &catalog, &pending).map_err(|e| e.to_string())?;
        let path = host.finish()?;

        info!("🖼️  Preview of {} ready: {:?}", page, outcome);
        Ok(PreviewRender { page, path, outcome })
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}
