use iced::widget::{button, column, pick_list, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};
use std::fmt;
use std::path::PathBuf;

use crate::state::data::{PortfolioCategory, PortfolioItem};
use crate::state::portfolio::{Direction, ItemDraft, ItemPatch, PortfolioStore};
use crate::Message;

/// Item form being filled in, either for a new item or an existing one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    /// Id of the item being edited, None for a new item
    pub editing: Option<String>,
    pub category: String,
    pub name: String,
    pub description: String,
    pub embed_url: String,
    /// Newly picked images; None keeps the item's current ones
    pub images: Option<Vec<PathBuf>>,
    pub videos: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone)]
pub enum FormMessage {
    Category(String),
    Name(String),
    Description(String),
    EmbedUrl(String),
}

impl ItemForm {
    pub fn new(category: String) -> Self {
        Self { category, ..Self::default() }
    }

    pub fn editing(item: &PortfolioItem) -> Self {
        Self {
            editing: Some(item.id.clone()),
            category: item.category.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            embed_url: item.embed_url.clone().unwrap_or_default(),
            images: None,
            videos: None,
        }
    }

    pub fn update(&mut self, message: FormMessage) {
        match message {
            FormMessage::Category(category) => self.category = category,
            FormMessage::Name(name) => self.name = name,
            FormMessage::Description(description) => self.description = description,
            FormMessage::EmbedUrl(url) => self.embed_url = url,
        }
    }

    fn embed_url(&self) -> Option<String> {
        let url = self.embed_url.trim();
        (!url.is_empty()).then(|| url.to_string())
    }

    /// Every text field is written back; media only when re-picked
    pub fn into_patch(self) -> ItemPatch {
        let embed_url = Some(self.embed_url());
        ItemPatch {
            category: Some(self.category),
            name: Some(self.name.trim().to_string()),
            description: Some(self.description),
            images: self.images,
            videos: self.videos,
            embed_url,
        }
    }

    pub fn into_draft(self) -> ItemDraft {
        let embed_url = self.embed_url();
        ItemDraft {
            category: self.category,
            name: self.name.trim().to_string(),
            description: self.description,
            images: self.images.unwrap_or_default(),
            videos: self.videos.unwrap_or_default(),
            embed_url,
        }
    }
}

/// Category as shown in the dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryChoice {
    id: String,
    name: String,
}

impl fmt::Display for CategoryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Portfolio items in display order. Every action writes the whole
/// document, so none is offered until the previous write has landed.
pub fn list_view(store: &PortfolioStore, busy: bool) -> Element<'_, Message> {
    let last = store.items().len().saturating_sub(1);
    let idle = |message: Message| (!busy).then_some(message);

    let list = store
        .items()
        .iter()
        .enumerate()
        .fold(Column::new().spacing(10), |list, (index, item)| {
            let category = store
                .categories()
                .iter()
                .find(|c| c.id == item.category)
                .map(|c| c.name.as_str())
                .unwrap_or(item.category.as_str());

            let info = column![
                text(&item.name).size(16),
                text(format!(
                    "{} · {} images, {} videos{}",
                    category,
                    item.images.len(),
                    item.videos.len(),
                    if item.embed_url.is_some() { " · embed" } else { "" }
                ))
                .size(12),
                text(item.cover().unwrap_or("No cover image")).size(12),
            ]
            .spacing(4)
            .width(Length::Fill);

            let actions = row![
                button("▲").on_press_maybe(
                    idle(Message::MoveItem(index, Direction::Up)).filter(|_| index > 0)
                ),
                button("▼").on_press_maybe(
                    idle(Message::MoveItem(index, Direction::Down)).filter(|_| index < last)
                ),
                button("Edit").on_press_maybe(idle(Message::EditItem(item.id.clone()))),
                button("Delete")
                    .style(button::danger)
                    .on_press_maybe(idle(Message::DeleteItem(item.id.clone()))),
            ]
            .spacing(6);

            list.push(row![info, actions].spacing(16).align_y(Alignment::Center))
        });

    let header = row![
        text(format!("Portfolio ({} items)", store.items().len())).size(20),
        button("New item").on_press_maybe(idle(Message::NewItem)),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    column![header, scrollable(list).height(Length::Fill)]
        .spacing(12)
        .into()
}

/// Create/edit form
pub fn form_view<'a>(form: &'a ItemForm, categories: &'a [PortfolioCategory], busy: bool) -> Element<'a, Message> {
    let title = if form.editing.is_some() { "Edit item" } else { "New item" };

    let category: Element<'a, Message> = if categories.is_empty() {
        text_input("Category id", &form.category)
            .on_input(|c| Message::Form(FormMessage::Category(c)))
            .into()
    } else {
        let choices: Vec<CategoryChoice> = categories
            .iter()
            .map(|c| CategoryChoice { id: c.id.clone(), name: c.name.clone() })
            .collect();
        let selected = choices.iter().find(|c| c.id == form.category).cloned();
        pick_list(choices, selected, |choice: CategoryChoice| {
            Message::Form(FormMessage::Category(choice.id))
        })
        .into()
    };

    let images = match &form.images {
        Some(files) => format!("{} images chosen", files.len()),
        None if form.editing.is_some() => "Keeping current images".to_string(),
        None => "No images chosen".to_string(),
    };
    let videos = match &form.videos {
        Some(files) => format!("{} videos chosen", files.len()),
        None if form.editing.is_some() => "Keeping current videos".to_string(),
        None => "No videos chosen".to_string(),
    };

    column![
        text(title).size(20),
        category,
        text_input("Name", &form.name).on_input(|n| Message::Form(FormMessage::Name(n))),
        text_input("Description", &form.description)
            .on_input(|d| Message::Form(FormMessage::Description(d))),
        text_input("Panorama embed URL (optional)", &form.embed_url)
            .on_input(|u| Message::Form(FormMessage::EmbedUrl(u))),
        row![button("Choose images").on_press(Message::PickItemImages), text(images)]
            .spacing(10)
            .align_y(Alignment::Center),
        row![button("Choose videos").on_press(Message::PickItemVideos), text(videos)]
            .spacing(10)
            .align_y(Alignment::Center),
        row![
            button("Save")
                .style(button::primary)
                .on_press_maybe((!busy).then_some(Message::SaveItem)),
            button("Cancel").style(button::secondary).on_press(Message::CancelItem),
        ]
        .spacing(10),
    ]
    .spacing(12)
    .max_width(700.0)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> PortfolioItem {
        PortfolioItem {
            id: "item-1".to_string(),
            category: "residential".to_string(),
            name: "Loft".to_string(),
            description: "Open plan".to_string(),
            images: vec!["images/portfolio/items/item-1/1.jpg".to_string()],
            videos: Vec::new(),
            embed_url: Some("https://tour.example/loft".to_string()),
        }
    }

    #[test]
    fn test_patch_keeps_media_unless_repicked() {
        let mut form = ItemForm::editing(&item());
        form.update(FormMessage::Name("  Loft 2 ".to_string()));

        let patch = form.into_patch();
        assert_eq!(patch.name.as_deref(), Some("Loft 2"));
        assert_eq!(patch.images, None);
        assert_eq!(patch.videos, None);
        assert_eq!(patch.embed_url, Some(Some("https://tour.example/loft".to_string())));
    }

    #[test]
    fn test_blank_embed_url_clears_it() {
        let mut form = ItemForm::editing(&item());
        form.update(FormMessage::EmbedUrl("   ".to_string()));
        form.images = Some(vec![PathBuf::from("/tmp/new.png")]);

        let patch = form.into_patch();
        assert_eq!(patch.embed_url, Some(None));
        assert_eq!(patch.images, Some(vec![PathBuf::from("/tmp/new.png")]));
    }

    #[test]
    fn test_draft_from_new_form() {
        let mut form = ItemForm::new("commercial".to_string());
        form.update(FormMessage::Name("Office".to_string()));
        form.update(FormMessage::Description("Fit-out".to_string()));
        form.videos = Some(vec![PathBuf::from("/tmp/walk.mov")]);

        let draft = form.into_draft();
        assert_eq!(draft.category, "commercial");
        assert_eq!(draft.name, "Office");
        assert!(draft.images.is_empty());
        assert_eq!(draft.videos.len(), 1);
        assert_eq!(draft.embed_url, None);
    }
}
