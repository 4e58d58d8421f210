use super::document::MediaElement;
use crate::media::kind::MediaKind;
use crate::state::data::MediaSlot;
use crate::state::pending::video_target;

/// One heuristic for locating a slot's element in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// `<img>` whose src contains the text
    ImageSrcContains(String),
    /// `<img>` whose alt contains the text
    ImageAltContains(String),
    /// `<video>` whose src contains the text
    VideoSrcContains(String),
}

impl Matcher {
    pub fn matches(&self, element: &MediaElement) -> bool {
        let (kind, attr, needle) = match self {
            Matcher::ImageSrcContains(needle) => (MediaKind::Image, "src", needle),
            Matcher::ImageAltContains(needle) => (MediaKind::Image, "alt", needle),
            Matcher::VideoSrcContains(needle) => (MediaKind::Video, "src", needle),
        };

        !needle.is_empty()
            && element.kind == kind
            && element.attr(attr).map_or(false, |value| value.contains(needle.as_str()))
    }
}

/// Strategies for a slot, most specific first
pub fn strategies_for(slot: &MediaSlot) -> Vec<Matcher> {
    let video_src = if slot.target_path_video.is_some() {
        video_target(slot)
    } else {
        slot.target_path.clone()
    };

    vec![
        Matcher::ImageSrcContains(slot.target_path.clone()),
        Matcher::ImageSrcContains(slot.target_file_name().to_string()),
        Matcher::ImageAltContains(slot.name.clone()),
        Matcher::VideoSrcContains(video_src),
    ]
}

/// First element matched by the earliest strategy that matches anything.
/// Strategy order outranks document order.
pub fn first_match<'a>(strategies: &[Matcher], elements: &'a [MediaElement]) -> Option<&'a MediaElement> {
    strategies
        .iter()
        .find_map(|matcher| elements.iter().find(|element| matcher.matches(element)))
}
