//! Portfolio items, persisted on every change
//!
//! Unlike media slots there is no pending/commit split here: each
//! create, update, move or delete rewrites `data/portfolio.json` before
//! returning. Media files of superseded or deleted items are left on disk.

use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

use super::data::{PortfolioCategory, PortfolioDocument, PortfolioItem};
use super::error::{SiteError, SiteResult};
use super::site::{Site, PORTFOLIO_DOCUMENT, PORTFOLIO_MEDIA_DIR};
use crate::media::kind::extension_of;

/// Fields of a new item, with media still at their picked locations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub category: String,
    pub name: String,
    pub description: String,
    pub images: Vec<PathBuf>,
    pub videos: Vec<PathBuf>,
    pub embed_url: Option<String>,
}

/// Partial update: `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub category: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Newly picked images replacing the list
    pub images: Option<Vec<PathBuf>>,
    pub videos: Option<Vec<PathBuf>>,
    /// `Some(None)` clears the embed URL
    pub embed_url: Option<Option<String>>,
}

/// Which way a move goes in the display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioStore {
    document: PortfolioDocument,
}

impl PortfolioStore {
    pub fn new(document: PortfolioDocument) -> Self {
        Self { document }
    }

    /// Load the portfolio; a missing or broken file gives an empty one
    pub async fn load(site: &Site) -> Self {
        Self::new(site.read_json_or(PORTFOLIO_DOCUMENT, PortfolioDocument::default).await)
    }

    pub fn items(&self) -> &[PortfolioItem] {
        &self.document.items
    }

    pub fn categories(&self) -> &[PortfolioCategory] {
        &self.document.categories
    }

    pub fn get(&self, id: &str) -> Option<&PortfolioItem> {
        self.document.items.iter().find(|item| item.id == id)
    }

    fn position(&self, id: &str) -> SiteResult<usize> {
        self.document
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| SiteError::UnknownItem(id.to_string()))
    }

    /// Time-based id, suffixed if the same millisecond is already taken
    fn fresh_id(&self) -> String {
        let base = format!("item-{}", Utc::now().timestamp_millis());
        let mut id = base.clone();
        let mut n = 1;
        while self.get(&id).is_some() {
            n += 1;
            id = format!("{}-{}", base, n);
        }
        id
    }

    async fn save(&self, site: &Site) -> SiteResult<()> {
        site.write_json(PORTFOLIO_DOCUMENT, &self.document).await
    }

    /// Create an item, copy its media into its own directory and persist
    pub async fn create(&mut self, site: &Site, draft: ItemDraft) -> SiteResult<&PortfolioItem> {
        let id = self.fresh_id();
        let images = copy_item_media(site, &id, &draft.images, MediaRole::Image).await?;
        let videos = copy_item_media(site, &id, &draft.videos, MediaRole::Video).await?;

        self.document.items.push(PortfolioItem {
            id: id.clone(),
            category: draft.category,
            name: draft.name,
            description: draft.description,
            images,
            videos,
            embed_url: normalize_url(draft.embed_url),
        });
        self.save(site).await?;

        info!("📁 Created portfolio item {}", id);
        let index = self.document.items.len() - 1;
        Ok(&self.document.items[index])
    }

    /// Apply a partial update and persist
    pub async fn update(&mut self, site: &Site, id: &str, patch: ItemPatch) -> SiteResult<&PortfolioItem> {
        let index = self.position(id)?;

        // Copy first so a failed copy leaves the item untouched
        let images = match &patch.images {
            Some(sources) => Some(copy_item_media(site, id, sources, MediaRole::Image).await?),
            None => None,
        };
        let videos = match &patch.videos {
            Some(sources) => Some(copy_item_media(site, id, sources, MediaRole::Video).await?),
            None => None,
        };

        let item = &mut self.document.items[index];
        if let Some(category) = patch.category {
            item.category = category;
        }
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(images) = images {
            item.images = images;
        }
        if let Some(videos) = videos {
            item.videos = videos;
        }
        if let Some(embed_url) = patch.embed_url {
            item.embed_url = normalize_url(embed_url);
        }
        self.save(site).await?;

        info!("✏️  Updated portfolio item {}", id);
        Ok(&self.document.items[index])
    }

    /// Swap the item at `index` with its neighbour and persist
    pub async fn move_item(&mut self, site: &Site, index: usize, direction: Direction) -> SiteResult<()> {
        swap_adjacent(&mut self.document.items, index, direction)?;
        self.save(site).await
    }

    /// Remove an item and persist. Its media files stay on disk.
    pub async fn delete(&mut self, site: &Site, id: &str) -> SiteResult<PortfolioItem> {
        let index = self.position(id)?;
        let removed = self.document.items.remove(index);
        self.save(site).await?;

        info!("🗑️  Deleted portfolio item {}", id);
        Ok(removed)
    }
}

/// Swap `items[index]` with the item above or below it
pub fn swap_adjacent<T>(items: &mut [T], index: usize, direction: Direction) -> SiteResult<()> {
    let len = items.len();
    let other = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => index.checked_add(1).filter(|i| *i < len),
    };

    match other {
        Some(other) if index < len => {
            items.swap(index, other);
            Ok(())
        }
        _ => Err(SiteError::InvalidIndex { index, len }),
    }
}

fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

#[derive(Clone, Copy)]
enum MediaRole {
    Image,
    Video,
}

/// Copy media into `images/portfolio/items/<id>/`, named by position:
/// images as `1.jpg, 2.png, ...`, videos as `v1.mp4, ...`.
async fn copy_item_media(site: &Site, id: &str, sources: &[PathBuf], role: MediaRole) -> SiteResult<Vec<String>> {
    let (prefix, default_ext) = match role {
        MediaRole::Image => ("", "jpg"),
        MediaRole::Video => ("v", "mp4"),
    };

    let mut paths = Vec::with_capacity(sources.len());
    for (i, source) in sources.iter().enumerate() {
        let ext = extension_of(source).unwrap_or_else(|| default_ext.to_string());
        let target = format!("{}/{}/{}{}.{}", PORTFOLIO_MEDIA_DIR, id, prefix, i + 1, ext);
        site.copy_into(source, &target).await?;
        paths.push(target);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_sources(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        let picked = dir.join("picked");
        std::fs::create_dir_all(&picked).unwrap();
        names
            .iter()
            .map(|name| {
                let path = picked.join(name);
                std::fs::write(&path, name.as_bytes()).unwrap();
                path
            })
            .collect()
    }

    fn draft(name: &str) -> ItemDraft {
        ItemDraft {
            category: "residential".to_string(),
            name: name.to_string(),
            description: String::new(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_names_media_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path().join("site"));
        let mut store = PortfolioStore::default();

        let mut new_item = draft("Loft");
        new_item.images = write_sources(dir.path(), &["cover.JPG", "b.png", "c"]);
        new_item.videos = write_sources(dir.path(), &["walk.mov"]);
        new_item.embed_url = Some("  ".to_string());

        let item = store.create(&site, new_item).await.unwrap().clone();

        let base = format!("images/portfolio/items/{}", item.id);
        assert_eq!(
            item.images,
            vec![format!("{}/1.jpg", base), format!("{}/2.png", base), format!("{}/3.jpg", base)]
        );
        assert_eq!(item.cover(), Some(format!("{}/1.jpg", base).as_str()));
        assert_eq!(item.videos, vec![format!("{}/v1.mov", base)]);
        assert_eq!(item.embed_url, None);

        assert_eq!(std::fs::read(site.resolve(&item.images[0])).unwrap(), b"cover.JPG");

        let reloaded = PortfolioStore::load(&site).await;
        assert_eq!(reloaded.items(), store.items());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path());
        let mut store = PortfolioStore::default();

        let a = store.create(&site, draft("A")).await.unwrap().id.clone();
        let b = store.create(&site, draft("B")).await.unwrap().id.clone();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_update_only_touches_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path().join("site"));
        let mut store = PortfolioStore::default();

        let mut new_item = draft("Loft");
        new_item.description = "Original".to_string();
        new_item.images = write_sources(dir.path(), &["old.jpg"]);
        new_item.embed_url = Some("https://tour".to_string());
        let id = store.create(&site, new_item).await.unwrap().id.clone();
        let old_cover = store.get(&id).unwrap().images[0].clone();

        let patch = ItemPatch {
            name: Some("Loft renovated".to_string()),
            images: Some(write_sources(dir.path(), &["new1.webp", "new2.webp"])),
            ..Default::default()
        };
        let item = store.update(&site, &id, patch).await.unwrap().clone();

        assert_eq!(item.name, "Loft renovated");
        assert_eq!(item.description, "Original");
        assert_eq!(item.embed_url.as_deref(), Some("https://tour"));
        assert_eq!(item.images.len(), 2);
        assert!(item.images[0].ends_with("/1.webp"));
        // The superseded file is not cleaned up
        assert!(site.exists(&old_cover).await);

        let cleared = ItemPatch { embed_url: Some(None), ..Default::default() };
        let item = store.update(&site, &id, cleared).await.unwrap();
        assert_eq!(item.embed_url, None);
    }

    #[tokio::test]
    async fn test_update_unknown_item() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PortfolioStore::default();
        let err = store.update(&Site::new(dir.path()), "nope", ItemPatch::default()).await;
        assert!(matches!(err, Err(SiteError::UnknownItem(_))));
    }

    #[test]
    fn test_swap_adjacent_is_an_involution() {
        let original = vec!["a", "b", "c"];
        let mut items = original.clone();

        swap_adjacent(&mut items, 1, Direction::Up).unwrap();
        assert_eq!(items, vec!["b", "a", "c"]);

        swap_adjacent(&mut items, 1, Direction::Up).unwrap();
        assert_eq!(items, original);

        swap_adjacent(&mut items, 1, Direction::Down).unwrap();
        assert_eq!(items, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_swap_adjacent_rejects_edges() {
        let mut items = vec![1, 2];
        assert!(swap_adjacent(&mut items, 0, Direction::Up).is_err());
        assert!(swap_adjacent(&mut items, 1, Direction::Down).is_err());
        assert!(swap_adjacent(&mut items, 5, Direction::Up).is_err());
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_move_and_delete_persist() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path());
        let mut store = PortfolioStore::default();

        let mut new_item = draft("A");
        new_item.images = write_sources(dir.path(), &["a.jpg"]);
        let a = store.create(&site, new_item).await.unwrap().clone();
        let b = store.create(&site, draft("B")).await.unwrap().id.clone();

        store.move_item(&site, 1, Direction::Up).await.unwrap();
        let reloaded = PortfolioStore::load(&site).await;
        assert_eq!(reloaded.items()[0].id, b);
        assert_eq!(reloaded.items()[1].id, a.id);

        let removed = store.delete(&site, &a.id).await.unwrap();
        assert_eq!(removed.id, a.id);
        let reloaded = PortfolioStore::load(&site).await;
        assert_eq!(reloaded.items().len(), 1);
        // Orphaned media stays on disk
        assert!(site.exists(&a.images[0]).await);
    }
}
