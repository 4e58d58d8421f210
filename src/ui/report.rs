use iced::widget::{button, column, row, scrollable, text, Column};
use iced::{Element, Length};

use crate::state::commit::CommitReport;
use crate::Message;

/// Ask before anything is overwritten
pub fn confirm<'a>(files: usize, panorama_dirty: bool) -> Element<'a, Message> {
    let mut summary = format!("{} files will be copied over the site's existing media.", files);
    if panorama_dirty {
        summary.push_str(" Panorama URLs will be saved.");
    }

    column![
        text("Replace media?").size(20),
        text(summary),
        text("This cannot be undone from the editor.").size(12),
        row![
            button("Replace").style(button::danger).on_press(Message::CommitConfirmed),
            button("Cancel").style(button::secondary).on_press(Message::CommitCancelled),
        ]
        .spacing(10),
    ]
    .spacing(12)
    .into()
}

/// Per-target outcome of the last commit
pub fn view(report: &CommitReport) -> Element<'_, Message> {
    let title = if report.all_succeeded() {
        format!("✅ Replaced {} files", report.success_count())
    } else {
        format!(
            "⚠️  {} succeeded, {} failed",
            report.success_count(),
            report.failure_count()
        )
    };

    let lines = report.copies.iter().fold(Column::new().spacing(4), |lines, outcome| {
        let line = match &outcome.error {
            None => format!("✓ {}", outcome.target_path),
            Some(error) => format!("✗ {}: {}", outcome.target_path, error),
        };
        lines.push(text(line).size(13))
    });

    let panorama = match &report.panorama {
        None => text(""),
        Some(Ok(())) => text("✓ Panorama URLs saved"),
        Some(Err(error)) => text(format!("✗ Panorama URLs not saved: {}", error)),
    };

    column![
        text(title).size(20),
        scrollable(lines).height(Length::Fill),
        panorama.size(13),
        button("OK").on_press(Message::ReportDismissed),
    ]
    .spacing(12)
    .into()
}
