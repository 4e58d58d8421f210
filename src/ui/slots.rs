use iced::widget::{button, column, image, pick_list, row, scrollable, text, text_input, Column, Row};
use iced::{Alignment, Element, Length};
use std::fmt;

use crate::media::kind::MediaKind;
use crate::preview::host::PreviewRender;
use crate::preview::inject::InjectionOutcome;
use crate::state::data::{MediaSlot, SlotCatalog};
use crate::state::pending::{PendingEdit, PendingEdits};
use crate::Message;

/// Size of the preview box in a slot row
const PREVIEW_SIZE: f32 = 96.0;

/// Category dropdown value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn as_category(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(category) => Some(category),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "All categories"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

/// Searchable slot list with the preview page selector on top
pub fn view<'a>(
    catalog: &'a SlotCatalog,
    pending: &'a PendingEdits,
    search: &'a str,
    category: &'a CategoryFilter,
    pages: &'a [String],
    page: &'a str,
    last_preview: Option<&'a PreviewRender>,
    busy: bool,
) -> Element<'a, Message> {
    let mut categories = vec![CategoryFilter::All];
    categories.extend(catalog.categories().into_iter().map(CategoryFilter::Only));

    let filters = row![
        text_input("Search by name or category", search)
            .on_input(Message::SearchChanged)
            .width(Length::FillPortion(2)),
        pick_list(categories, Some(category.clone()), Message::CategorySelected),
        text("Preview page:"),
        pick_list(pages, Some(page.to_string()), Message::PageSelected),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    let slots = catalog.filter(search, category.as_category());
    let list = slots.into_iter().fold(Column::new().spacing(12), |list, slot| {
        list.push(slot_row(slot, pending.get(&slot.id), busy))
    });

    let preview_note = match last_preview.map(|render| &render.outcome) {
        Some(InjectionOutcome::Applied { unmatched, .. }) if !unmatched.is_empty() => {
            text(format!("Not found on this page: {}", unmatched.join(", "))).size(12)
        }
        Some(InjectionOutcome::Applied { replaced, .. }) if !replaced.is_empty() => {
            text(format!("{} edits shown in the preview", replaced.len())).size(12)
        }
        Some(InjectionOutcome::Posted { media }) => {
            text(format!("Page could not be opened; {} edits sent as a message", media)).size(12)
        }
        _ => text("").size(12),
    };

    column![filters, preview_note, scrollable(list).height(Length::Fill)]
        .spacing(12)
        .into()
}

/// Action buttons are disabled while a commit is copying files
fn slot_row<'a>(slot: &'a MediaSlot, edit: Option<&'a PendingEdit>, busy: bool) -> Element<'a, Message> {
    let status = match edit {
        Some(edit) if edit.kind.is_video() => "Selected (video)",
        Some(_) => "Selected",
        None => "Not selected",
    };

    let category = if slot.supports_video {
        format!("{} (video allowed)", slot.category)
    } else {
        slot.category.clone()
    };

    let info = column![
        text(&slot.name).size(16),
        text(category).size(12),
        text(status).size(12),
    ]
    .spacing(4)
    .width(Length::Fill);

    let idle = |message: Message| (!busy).then_some(message);

    let mut actions = Row::new().spacing(8).push(
        button(if edit.is_some() { "Change" } else { "Choose image" })
            .on_press_maybe(idle(Message::PickMedia(slot.id.clone(), false))),
    );
    if slot.supports_video {
        actions = actions.push(
            button("Choose video").on_press_maybe(idle(Message::PickMedia(slot.id.clone(), true))),
        );
    }
    if edit.is_some() {
        actions = actions.push(
            button("Remove")
                .style(button::danger)
                .on_press_maybe(idle(Message::RemoveMedia(slot.id.clone()))),
        );
    }

    row![preview_box(edit), info, actions]
        .spacing(16)
        .align_y(Alignment::Center)
        .into()
}

fn preview_box<'a>(edit: Option<&PendingEdit>) -> Element<'a, Message> {
    let preview = edit.and_then(|edit| edit.preview.as_ref());

    match preview {
        Some(preview) if preview.kind == MediaKind::Image => match &preview.thumbnail {
            Some(thumbnail) => image(image::Handle::from_bytes(thumbnail.to_vec()))
                .width(Length::Fixed(PREVIEW_SIZE))
                .height(Length::Fixed(PREVIEW_SIZE))
                .into(),
            None => placeholder("Image"),
        },
        Some(_) => placeholder("🎬 Video"),
        None => placeholder("No preview"),
    }
}

fn placeholder<'a>(label: &str) -> Element<'a, Message> {
    iced::widget::container(text(label.to_string()).size(12))
        .width(Length::Fixed(PREVIEW_SIZE))
        .height(Length::Fixed(PREVIEW_SIZE))
        .center_x(Length::Fixed(PREVIEW_SIZE))
        .center_y(Length::Fixed(PREVIEW_SIZE))
        .into()
}
