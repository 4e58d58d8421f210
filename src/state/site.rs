use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::data::SlotCatalog;
use super::error::{SiteError, SiteResult};

/// Panorama embed URLs, relative to the site root
pub const PANORAMA_DOCUMENT: &str = "data/panoramic-embeds.json";
/// Portfolio document, relative to the site root
pub const PORTFOLIO_DOCUMENT: &str = "data/portfolio.json";
/// Directory that holds one sub-directory of media per portfolio item
pub const PORTFOLIO_MEDIA_DIR: &str = "images/portfolio/items";

/// The Site is the website checkout being edited.
/// Every relative path in the slot config and the JSON documents
/// is resolved against its root directory.
#[derive(Clone, PartialEq, Eq)]
pub struct Site {
    root: PathBuf,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the site root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a site-relative path. Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Check whether a site-relative file exists
    pub async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    /// Copy `source` to a site-relative `target`, creating directories as needed
    pub async fn copy_into(&self, source: &Path, target: &str) -> SiteResult<()> {
        let to = self.resolve(target);
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SiteError::Write { path: parent.to_path_buf(), source })?;
        }

        tokio::fs::copy(source, &to)
            .await
            .map_err(|e| SiteError::Copy { from: source.to_path_buf(), to: to.clone(), source: e })?;

        debug!("Copied {} -> {}", source.display(), to.display());
        Ok(())
    }

    /// Read and parse a JSON document
    pub async fn read_json<T: DeserializeOwned>(&self, path: &str) -> SiteResult<T> {
        let full = self.resolve(path);
        let data = tokio::fs::read(&full)
            .await
            .map_err(|source| SiteError::Read { path: full.clone(), source })?;
        serde_json::from_slice(&data).map_err(|source| SiteError::Parse { path: full, source })
    }

    /// Read a JSON document, falling back to a default when it is
    /// missing or unreadable. Storage read failures are never fatal.
    pub async fn read_json_or<T: DeserializeOwned>(&self, path: &str, fallback: impl FnOnce() -> T) -> T {
        match self.read_json(path).await {
            Ok(value) => value,
            Err(SiteError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, using defaults", path);
                fallback()
            }
            Err(e) => {
                warn!("⚠️  {}; using defaults", e);
                fallback()
            }
        }
    }

    /// Load the slot config. A missing or invalid config gives an empty
    /// catalog so the editor still opens.
    pub async fn load_catalog(&self, path: &Path) -> SlotCatalog {
        let full = self.resolve(path);
        let data = match tokio::fs::read(&full).await {
            Ok(data) => data,
            Err(e) => {
                warn!("⚠️  Could not read slot config {}: {}", full.display(), e);
                return SlotCatalog::default();
            }
        };

        match SlotCatalog::from_json(&data) {
            Ok(catalog) => {
                info!("📋 Loaded {} slots from {}", catalog.slots().len(), full.display());
                catalog
            }
            Err(e) => {
                warn!("⚠️  Invalid slot config {}: {}", full.display(), e);
                SlotCatalog::default()
            }
        }
    }

    /// Serialize a document as pretty JSON and write it in one step.
    ///
    /// The document goes to a temporary sibling first and is then renamed
    /// over the target, so readers never see a half-written file.
    pub async fn write_json<T: Serialize>(&self, path: &str, value: &T) -> SiteResult<()> {
        let full = self.resolve(path);
        let json = serde_json::to_string_pretty(value)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SiteError::Write { path: parent.to_path_buf(), source })?;
        }

        let mut tmp_name = full.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = full.with_file_name(tmp_name);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| SiteError::Write { path: tmp.clone(), source })?;
        tokio::fs::rename(&tmp, &full)
            .await
            .map_err(|source| SiteError::Write { path: full.clone(), source })?;

        debug!("Wrote {}", full.display());
        Ok(())
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site").field("root", &self.root).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let site = Site::new("/srv/site");
        assert_eq!(site.resolve("images/a.jpg"), PathBuf::from("/srv/site/images/a.jpg"));
        assert_eq!(site.resolve("/tmp/b.jpg"), PathBuf::from("/tmp/b.jpg"));
    }

    #[tokio::test]
    async fn test_copy_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path());
        let source = dir.path().join("source.png");
        std::fs::write(&source, b"png").unwrap();

        site.copy_into(&source, "images/deep/nested/target.png").await.unwrap();

        assert!(site.exists("images/deep/nested/target.png").await);
        assert_eq!(std::fs::read(dir.path().join("images/deep/nested/target.png")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_write_json_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path());

        let mut doc = BTreeMap::new();
        doc.insert("a".to_string(), "1".to_string());
        doc.insert("b".to_string(), "2".to_string());
        site.write_json("data/doc.json", &doc).await.unwrap();

        doc.remove("b");
        site.write_json("data/doc.json", &doc).await.unwrap();

        let read: BTreeMap<String, String> = site.read_json("data/doc.json").await.unwrap();
        assert_eq!(read, doc);
        assert!(!dir.path().join("data/doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_catalog_relative_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path());
        std::fs::create_dir_all(dir.path().join("image-replacer")).unwrap();
        std::fs::write(
            dir.path().join("image-replacer/image-config.json"),
            r#"{"images": [{"id": "a", "name": "A", "category": "C", "targetPath": "a.jpg", "htmlFile": "index.html"}]}"#,
        )
        .unwrap();

        let catalog = site.load_catalog(Path::new("image-replacer/image-config.json")).await;
        assert_eq!(catalog.slots().len(), 1);

        let empty = site.load_catalog(Path::new("nope.json")).await;
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_read_json_or_falls_back_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path());
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/bad.json"), b"{ not json").unwrap();

        let value: Vec<u32> = site.read_json_or("data/bad.json", || vec![7]).await;
        assert_eq!(value, vec![7]);

        let missing: Vec<u32> = site.read_json_or("data/missing.json", Vec::new).await;
        assert!(missing.is_empty());
    }
}
