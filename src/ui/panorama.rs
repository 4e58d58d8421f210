use iced::widget::{button, column, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};

use crate::state::data::SlotCatalog;
use crate::state::panorama::PanoramaMap;
use crate::Message;

/// One URL field per embed slot, plus save state. Fields are read-only
/// while a commit is writing the map.
pub fn view<'a>(catalog: &'a SlotCatalog, panorama: &'a PanoramaMap, busy: bool) -> Element<'a, Message> {
    // Slots from the config first, then any other key already in the document
    let mut fields: Vec<(String, String)> = catalog
        .embed_slots()
        .map(|slot| (slot.id.clone(), slot.name.clone()))
        .collect();
    for key in panorama.urls().keys() {
        if !fields.iter().any(|(id, _)| id == key) {
            fields.push((key.clone(), key.clone()));
        }
    }

    let list = fields.into_iter().fold(Column::new().spacing(14), |list, (id, label)| {
        let value = panorama.get(&id);
        let input = text_input("https://...", value)
            .on_input_maybe((!busy).then_some(move |url| Message::PanoramaChanged(id.clone(), url)))
            .width(Length::Fill);

        list.push(column![text(label).size(14), input].spacing(4))
    });

    let state = if panorama.is_dirty() {
        text("Unsaved changes. They are written with the next replace.").size(12)
    } else {
        text("Saved").size(12)
    };

    let header = row![
        text("Panorama embed URLs").size(20),
        state,
        button("Revert").on_press_maybe((panorama.is_dirty() && !busy).then_some(Message::PanoramaReverted)),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    column![header, scrollable(list).height(Length::Fill)]
        .spacing(12)
        .into()
}
