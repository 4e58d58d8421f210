use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::document::{image_markup, video_markup, PageDocument};
use super::matcher::{first_match, strategies_for};
use crate::media::kind::MediaKind;
use crate::state::data::{MediaSlot, SlotCatalog};
use crate::state::pending::{PendingEdit, PendingEdits};

#[derive(Debug, Error)]
pub enum PreviewError {
    /// The page can't be opened for direct editing
    #[error("preview page is not accessible: {0}")]
    AccessDenied(String),

    #[error("failed to deliver preview message: {0}")]
    Delivery(String),
}

/// Where a preview is rendered.
///
/// Hosts either hand out the page for direct editing or, when that is
/// blocked, accept a message describing the edits.
pub trait PreviewHost {
    fn document(&mut self) -> Result<&mut PageDocument, PreviewError>;

    fn post_message(&mut self, message: &PreviewMessage) -> Result<(), PreviewError>;
}

/// One edit as described to a host that can't be edited directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewMedia {
    pub slot_id: String,
    pub target_path: String,
    pub target_path_video: Option<String>,
    /// data: URL of the new media
    pub preview: String,
    pub is_video: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media: Vec<PreviewMedia>,
}

impl PreviewMessage {
    pub const UPDATE_MEDIA: &'static str = "update-media";
}

/// What happened to a preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// Edited in place
    Applied {
        replaced: Vec<String>,
        /// Slots with no matching element on the page
        unmatched: Vec<String>,
    },
    /// Direct access was refused; this many edits were posted instead
    Posted { media: usize },
}

/// Edits that belong on `page` and have something to show
fn relevant_edits<'a>(
    page: &'a str,
    catalog: &'a SlotCatalog,
    pending: &'a PendingEdits,
) -> Vec<(&'a MediaSlot, &'a PendingEdit)> {
    pending
        .in_catalog_order(catalog)
        .filter(|(slot, edit)| slot.html_file == page && edit.preview.is_some())
        .collect()
}

/// Show pending edits for `page` in the host.
///
/// A host that refuses direct access gets an `update-media` message
/// instead; that refusal is logged and is not an error.
pub fn inject<H: PreviewHost>(
    host: &mut H,
    page: &str,
    catalog: &SlotCatalog,
    pending: &PendingEdits,
) -> Result<InjectionOutcome, PreviewError> {
    let edits = relevant_edits(page, catalog, pending);

    let document = match host.document() {
        Ok(document) => document,
        Err(e) => {
            info!("Preview falls back to messaging ({})", e);
            let message = PreviewMessage {
                kind: PreviewMessage::UPDATE_MEDIA,
                media: edits.iter().filter_map(|(slot, edit)| describe(slot, edit)).collect(),
            };
            host.post_message(&message)?;
            return Ok(InjectionOutcome::Posted { media: message.media.len() });
        }
    };

    let mut replaced = Vec::new();
    let mut unmatched = Vec::new();

    for (slot, edit) in edits {
        let Some(preview) = &edit.preview else {
            continue;
        };

        // Re-scan each time: earlier edits shift byte offsets
        let elements = document.media_elements();
        let Some(element) = first_match(&strategies_for(slot), &elements) else {
            debug!("No element for slot {} on {}", slot.id, page);
            unmatched.push(slot.id.clone());
            continue;
        };

        let src = preview.data_url();
        if element.kind == edit.kind {
            document.set_src(element, &src);
        } else {
            let markup = match edit.kind {
                MediaKind::Video => video_markup(&src, element.attr("class"), element.attr("style")),
                MediaKind::Image => image_markup(&src, element.attr("class"), element.attr("style"), &slot.name),
            };
            document.replace_element(element, &markup);
        }
        replaced.push(slot.id.clone());
    }

    Ok(InjectionOutcome::Applied { replaced, unmatched })
}

fn describe(slot: &MediaSlot, edit: &PendingEdit) -> Option<PreviewMedia> {
    let preview = edit.preview.as_ref()?;
    Some(PreviewMedia {
        slot_id: slot.id.clone(),
        target_path: slot.target_path.clone(),
        target_path_video: slot.target_path_video.clone(),
        preview: preview.data_url(),
        is_video: edit.kind.is_video(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::preview::MediaPreview;
    use std::path::Path;

    /// In-memory host; `blocked` simulates a page that refuses access
    struct MemoryHost {
        document: PageDocument,
        blocked: bool,
        posted: Vec<PreviewMessage>,
    }

    impl MemoryHost {
        fn new(html: &str, blocked: bool) -> Self {
            Self { document: PageDocument::new(html), blocked, posted: Vec::new() }
        }
    }

    impl PreviewHost for MemoryHost {
        fn document(&mut self) -> Result<&mut PageDocument, PreviewError> {
            if self.blocked {
                Err(PreviewError::AccessDenied("cross-origin".to_string()))
            } else {
                Ok(&mut self.document)
            }
        }

        fn post_message(&mut self, message: &PreviewMessage) -> Result<(), PreviewError> {
            self.posted.push(message.clone());
            Ok(())
        }
    }

    fn slot(id: &str, target: &str, page: &str) -> MediaSlot {
        MediaSlot {
            id: id.to_string(),
            name: format!("{} photo", id),
            category: "Home".to_string(),
            target_path: target.to_string(),
            target_path_video: None,
            supports_video: true,
            supports_embed_url: false,
            html_file: page.to_string(),
        }
    }

    fn setup() -> (SlotCatalog, PendingEdits) {
        let hero = slot("hero", "images/hero.jpg", "index.html");
        let banner = slot("banner", "images/banner.jpg", "index.html");
        let other = slot("other", "images/other.jpg", "about.html");
        let missing = slot("missing", "images/missing.jpg", "index.html");
        let catalog = SlotCatalog::new(vec![hero.clone(), banner.clone(), other.clone(), missing.clone()]);

        let preview = |name: &str| MediaPreview::from_bytes(Path::new(name), b"xyz".to_vec()).unwrap();
        let mut pending = PendingEdits::new();
        pending.select(&hero, "/tmp/hero.mp4".into(), preview("hero.mp4")).unwrap();
        pending.select(&banner, "/tmp/banner.png".into(), preview("banner.png")).unwrap();
        pending.select(&other, "/tmp/other.png".into(), preview("other.png")).unwrap();
        pending.select(&missing, "/tmp/m.png".into(), preview("m.png")).unwrap();
        (catalog, pending)
    }

    const PAGE: &str = r#"<body><img class="cover" style="height:10px" src="images/hero.jpg"><img src="images/banner.jpg" alt="b"></body>"#;

    #[test]
    fn test_swaps_tag_kind_and_keeps_presentation() {
        let (catalog, pending) = setup();
        let mut host = MemoryHost::new(PAGE, false);

        let outcome = inject(&mut host, "index.html", &catalog, &pending).unwrap();
        assert_eq!(
            outcome,
            InjectionOutcome::Applied {
                replaced: vec!["hero".to_string(), "banner".to_string()],
                unmatched: vec!["missing".to_string()],
            }
        );

        let elements = host.document.media_elements();
        assert_eq!(elements[0].kind, MediaKind::Video);
        assert_eq!(elements[0].attr("class"), Some("cover"));
        assert_eq!(elements[0].attr("style"), Some("height:10px"));
        assert_eq!(elements[0].attr("src"), Some("data:video/mp4;base64,eHl6"));
        assert!(elements[0].attr("playsinline").is_some());

        assert_eq!(elements[1].kind, MediaKind::Image);
        assert_eq!(elements[1].attr("src"), Some("data:image/png;base64,eHl6"));
        assert_eq!(elements[1].attr("alt"), Some("b"));
        assert!(host.posted.is_empty());
    }

    #[test]
    fn test_blocked_host_gets_a_message() {
        let (catalog, pending) = setup();
        let mut host = MemoryHost::new(PAGE, true);

        let outcome = inject(&mut host, "index.html", &catalog, &pending).unwrap();
        assert_eq!(outcome, InjectionOutcome::Posted { media: 3 });

        let message = &host.posted[0];
        assert_eq!(message.kind, "update-media");
        let ids: Vec<&str> = message.media.iter().map(|m| m.slot_id.as_str()).collect();
        assert_eq!(ids, vec!["hero", "banner", "missing"]);
        assert!(message.media[0].is_video);

        let json = serde_json::to_value(message).unwrap();
        assert_eq!(json["type"], "update-media");
        assert_eq!(json["media"][1]["targetPath"], "images/banner.jpg");
        // The page itself is untouched
        assert_eq!(host.document.html(), PAGE);
    }

    #[test]
    fn test_edits_without_preview_are_skipped() {
        let (catalog, _) = setup();
        let mut pending = PendingEdits::new();
        pending.merge_scan(vec![(
            "hero".to_string(),
            PendingEdit {
                source: None,
                target_path: "images/hero.jpg".to_string(),
                target_path_video: "images/hero.mp4".to_string(),
                preview: None,
                kind: MediaKind::Image,
            },
        )]);

        let mut host = MemoryHost::new(PAGE, false);
        let outcome = inject(&mut host, "index.html", &catalog, &pending).unwrap();
        assert_eq!(outcome, InjectionOutcome::Applied { replaced: vec![], unmatched: vec![] });
        assert_eq!(host.document.html(), PAGE);
    }
}
