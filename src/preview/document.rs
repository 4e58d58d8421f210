//! A lightweight view of an HTML page's `<img>` and `<video>` elements
//!
//! The preview only ever needs to find media tags and swap them out, so
//! rather than building a DOM the page is kept as text and scanned for
//! opening tags. Edits splice new markup into the text.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use crate::media::kind::MediaKind;

fn open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<(img|video)\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("static regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("static regex")
    })
}

fn video_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</video\s*>").expect("static regex"))
}

fn base_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<base\b[^>]*>").expect("static regex"))
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(amp|quot|apos|lt|gt|#39|#x27);").expect("static regex"))
}

fn head_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<head\b[^>]*>").expect("static regex"))
}

/// One `<img>` or `<video>` found in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaElement {
    pub kind: MediaKind,
    /// Byte range of the opening tag
    pub open: Range<usize>,
    /// Byte range of the whole element, including `</video>` when present
    pub outer: Range<usize>,
    /// Attribute values with character references decoded
    pub attributes: Vec<(String, String)>,
}

impl MediaElement {
    /// Attribute value by (case-insensitive) name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    html: String,
}

impl PageDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    /// All media elements in document order
    pub fn media_elements(&self) -> Vec<MediaElement> {
        let mut elements = Vec::new();

        for caps in open_tag_regex().captures_iter(&self.html) {
            let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let body = caps.get(2).map_or("", |m| m.as_str());
            let self_closing = body.trim_end().ends_with('/');

            let kind = if tag.as_str().eq_ignore_ascii_case("video") {
                MediaKind::Video
            } else {
                MediaKind::Image
            };

            let end = match kind {
                MediaKind::Video if !self_closing => video_close_regex()
                    .find_at(&self.html, whole.end())
                    .map_or(whole.end(), |close| close.end()),
                _ => whole.end(),
            };

            elements.push(MediaElement {
                kind,
                open: whole.range(),
                outer: whole.start()..end,
                attributes: parse_attributes(body.trim_end_matches('/')),
            });
        }

        elements
    }

    /// Replace an element (including its children) with new markup
    pub fn replace_element(&mut self, element: &MediaElement, markup: &str) {
        self.html.replace_range(element.outer.clone(), markup);
    }

    /// Point an element at a new source, keeping its other attributes
    /// and, for videos, its children
    pub fn set_src(&mut self, element: &MediaElement, src: &str) {
        let tag = match element.kind {
            MediaKind::Image => "img",
            MediaKind::Video => "video",
        };

        let mut attributes = element.attributes.clone();
        match attributes.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case("src")) {
            Some(entry) => entry.1 = src.to_string(),
            None => attributes.insert(0, ("src".to_string(), src.to_string())),
        }

        let markup = render_open_tag(tag, &attributes);
        self.html.replace_range(element.open.clone(), &markup);
    }

    /// Point relative URLs at `href`, replacing the page's own `<base>` if it has one
    pub fn set_base(&mut self, href: &str) {
        let base = format!(r#"<base href="{}">"#, escape_attr(href));

        if let Some(existing) = base_regex().find(&self.html) {
            let range = existing.range();
            self.html.replace_range(range, &base);
        } else if let Some(head) = head_regex().find(&self.html) {
            let insert_at = head.end();
            self.html.insert_str(insert_at, &base);
        } else {
            self.html.insert_str(0, &base);
        }
    }
}

fn parse_attributes(body: &str) -> Vec<(String, String)> {
    attribute_regex()
        .captures_iter(body)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or(String::new(), |m| decode_entities(m.as_str()));
            Some((name, value))
        })
        .collect()
}

/// Decode the character references `escape_attr` produces, plus `&gt;`
/// and the apostrophe forms. Other references are left as written.
fn decode_entities(value: &str) -> String {
    entity_regex()
        .replace_all(value, |caps: &regex::Captures| match &caps[1] {
            "amp" => "&",
            "quot" => "\"",
            "lt" => "<",
            "gt" => ">",
            _ => "'",
        })
        .into_owned()
}

/// Escape a value for use inside a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

fn render_open_tag(tag: &str, attributes: &[(String, String)]) -> String {
    let mut markup = format!("<{}", tag);
    for (name, value) in attributes {
        if value.is_empty() && name != "src" && name != "alt" {
            markup.push_str(&format!(" {}", name));
        } else {
            markup.push_str(&format!(r#" {}="{}""#, name, escape_attr(value)));
        }
    }
    markup.push('>');
    markup
}

/// Markup for an `<img>` replacing an element of another kind
pub fn image_markup(src: &str, class: Option<&str>, style: Option<&str>, alt: &str) -> String {
    let mut attributes = vec![("src".to_string(), src.to_string())];
    push_presentation(&mut attributes, class, style);
    attributes.push(("alt".to_string(), alt.to_string()));
    render_open_tag("img", &attributes)
}

/// Markup for an autoplaying, muted, looping `<video>`
pub fn video_markup(src: &str, class: Option<&str>, style: Option<&str>) -> String {
    let mut attributes = vec![("src".to_string(), src.to_string())];
    push_presentation(&mut attributes, class, style);
    for flag in ["autoplay", "loop", "muted", "playsinline"] {
        attributes.push((flag.to_string(), String::new()));
    }
    format!("{}</video>", render_open_tag("video", &attributes))
}

fn push_presentation(attributes: &mut Vec<(String, String)>, class: Option<&str>, style: Option<&str>) {
    if let Some(class) = class.filter(|c| !c.is_empty()) {
        attributes.push(("class".to_string(), class.to_string()));
    }
    if let Some(style) = style.filter(|s| !s.is_empty()) {
        attributes.push(("style".to_string(), style.to_string()));
    }
}
