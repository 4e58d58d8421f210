use clap::Parser;
use iced::widget::{button, column, container, row, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing::{info, warn};

mod config;
mod media;
mod preview;
mod state;
mod ui;

use config::{AppConfig, Cli};
use media::kind::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use media::preview::{load_preview, MediaPreview};
use preview::host::{discover_pages, render_preview, PreviewRender};
use state::commit::{commit, CommitReport};
use state::data::SlotCatalog;
use state::panorama::PanoramaMap;
use state::pending::{scan_existing, PendingEdit, PendingEdits};
use state::portfolio::{Direction, PortfolioStore};
use state::site::Site;
use ui::portfolio::ItemForm;
use ui::slots::CategoryFilter;

/// Everything read from disk on startup
#[derive(Debug, Clone)]
pub struct LoadedSite {
    catalog: SlotCatalog,
    existing: Vec<(String, PendingEdit)>,
    panorama: PanoramaMap,
    portfolio: PortfolioStore,
    pages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Slots,
    Panorama,
    Portfolio,
}

/// Main application state
struct SiteMediaEditor {
    config: AppConfig,
    site: Site,
    catalog: SlotCatalog,
    pending: PendingEdits,
    panorama: PanoramaMap,
    portfolio: PortfolioStore,
    /// Pages available for preview
    pages: Vec<String>,
    page: String,
    tab: Tab,
    search: String,
    category: CategoryFilter,
    /// Confirm dialog for commit is open
    confirming: bool,
    busy: bool,
    report: Option<CommitReport>,
    last_preview: Option<PreviewRender>,
    form: Option<ItemForm>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Loaded(LoadedSite),
    Rescanned(Vec<(String, PendingEdit)>),
    TabSelected(Tab),
    SearchChanged(String),
    CategorySelected(CategoryFilter),
    PageSelected(String),

    /// Pick a file for a slot; `true` asks for video
    PickMedia(String, bool),
    MediaLoaded(String, PathBuf, Result<MediaPreview, String>),
    RemoveMedia(String),
    RefreshPreview,
    PreviewRendered(Result<PreviewRender, String>),

    PanoramaChanged(String, String),
    PanoramaReverted,

    CommitRequested,
    CommitCancelled,
    CommitConfirmed,
    Committed(CommitReport, PanoramaMap),
    ReportDismissed,

    NewItem,
    EditItem(String),
    Form(ui::portfolio::FormMessage),
    PickItemImages,
    PickItemVideos,
    SaveItem,
    CancelItem,
    MoveItem(usize, Direction),
    DeleteItem(String),
    PortfolioSaved(Result<PortfolioStore, String>),
}

/// Shown when a change is attempted while a save or commit is running
const BUSY_STATUS: &str = "Still saving, try again in a moment.";

impl Message {
    /// Messages that change slots, panoramas or the portfolio. They are
    /// dropped while a save or commit is running, which works from a
    /// snapshot and would otherwise overwrite them.
    fn waits_for_idle(&self) -> bool {
        matches!(
            self,
            Message::PickMedia(..)
                | Message::RemoveMedia(_)
                | Message::PanoramaChanged(..)
                | Message::PanoramaReverted
                | Message::CommitRequested
                | Message::CommitConfirmed
                | Message::NewItem
                | Message::EditItem(_)
                | Message::SaveItem
                | Message::MoveItem(..)
                | Message::DeleteItem(_)
        )
    }
}

impl SiteMediaEditor {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let site = Site::new(config.root.clone());
        info!("📁 Editing site at {}", site.root().display());

        let editor = SiteMediaEditor {
            page: config.start_page.clone(),
            site: site.clone(),
            catalog: SlotCatalog::default(),
            pending: PendingEdits::new(),
            panorama: PanoramaMap::default(),
            portfolio: PortfolioStore::default(),
            pages: Vec::new(),
            tab: Tab::Slots,
            search: String::new(),
            category: CategoryFilter::All,
            confirming: false,
            busy: true,
            report: None,
            last_preview: None,
            form: None,
            status: "Loading site...".to_string(),
            config: config.clone(),
        };

        (
            editor,
            Task::perform(load_site(site, config.slot_config), Message::Loaded),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        if self.busy && message.waits_for_idle() {
            self.status = BUSY_STATUS.to_string();
            return Task::none();
        }

        match message {
            Message::Loaded(loaded) => {
                self.catalog = loaded.catalog;
                self.pending = PendingEdits::new();
                self.pending.merge_scan(loaded.existing);
                self.panorama = loaded.panorama;
                self.portfolio = loaded.portfolio;
                self.pages = loaded.pages;
                self.busy = false;
                self.status = format!(
                    "Ready. {} slots, {} already on disk, {} portfolio items.",
                    self.catalog.slots().len(),
                    self.pending.len(),
                    self.portfolio.items().len()
                );
                self.preview_task()
            }
            Message::Rescanned(existing) => {
                self.pending.merge_scan(existing);
                self.preview_task()
            }
            Message::TabSelected(tab) => {
                self.tab = tab;
                Task::none()
            }
            Message::SearchChanged(search) => {
                self.search = search;
                Task::none()
            }
            Message::CategorySelected(category) => {
                self.category = category;
                Task::none()
            }
            Message::PageSelected(page) => {
                self.page = page;
                self.preview_task()
            }
            Message::PickMedia(slot_id, want_video) => {
                let Some(slot) = self.catalog.get(&slot_id) else {
                    return Task::none();
                };

                let mut dialog = FileDialog::new().set_title(format!("Choose media for {}", slot.name));
                dialog = if want_video {
                    dialog.add_filter("Videos", &VIDEO_EXTENSIONS)
                } else {
                    dialog.add_filter("Images", &IMAGE_EXTENSIONS)
                };
                if slot.supports_video && !want_video {
                    dialog = dialog.add_filter("Videos", &VIDEO_EXTENSIONS);
                }

                match dialog.pick_file() {
                    Some(path) => Task::perform(load_preview(path.clone()), move |preview| {
                        Message::MediaLoaded(slot_id.clone(), path.clone(), preview)
                    }),
                    None => Task::none(),
                }
            }
            Message::MediaLoaded(slot_id, path, preview) => {
                let Some(slot) = self.catalog.get(&slot_id) else {
                    return Task::none();
                };

                let selected = match preview {
                    Ok(preview) => self.pending.select(slot, path, preview).map_err(|e| e.to_string()),
                    Err(e) => Err(e),
                };
                match selected {
                    Ok(edit) => {
                        self.status = format!("{} will be replaced by {}", slot.name, source_name(edit));
                        self.preview_task()
                    }
                    Err(e) => {
                        warn!("⚠️  {}", e);
                        self.status = format!("Could not use that file: {}", e);
                        Task::none()
                    }
                }
            }
            Message::RemoveMedia(slot_id) => {
                self.pending.remove(&slot_id);
                self.preview_task()
            }
            Message::RefreshPreview => self.preview_task(),
            Message::PreviewRendered(result) => {
                match result {
                    Ok(render) => {
                        self.status = format!("Preview of {} written to {}", render.page, render.path.display());
                        self.last_preview = Some(render);
                    }
                    Err(e) => {
                        warn!("⚠️  Preview failed: {}", e);
                        self.status = format!("Preview failed: {}", e);
                    }
                }
                Task::none()
            }
            Message::PanoramaChanged(slot_id, url) => {
                self.panorama.set(&slot_id, &url);
                Task::none()
            }
            Message::PanoramaReverted => {
                self.panorama.revert();
                Task::none()
            }
            Message::CommitRequested => {
                if self.pending.has_new_files() || self.panorama.is_dirty() {
                    self.confirming = true;
                } else {
                    self.status = "Nothing to replace yet.".to_string();
                }
                Task::none()
            }
            Message::CommitCancelled => {
                self.confirming = false;
                Task::none()
            }
            Message::CommitConfirmed => {
                self.confirming = false;
                self.busy = true;
                self.status = format!("Replacing {} files...", self.pending.new_file_count());

                let requests = self.pending.copy_requests(&self.catalog);
                Task::perform(
                    commit(self.site.clone(), requests, self.panorama.clone()),
                    |(report, panorama)| Message::Committed(report, panorama),
                )
            }
            Message::Committed(report, panorama) => {
                self.busy = false;
                self.pending.settle(&report.copies);
                if let Some(Ok(())) = report.panorama {
                    self.panorama.mark_saved(&panorama);
                }
                self.status = format!(
                    "Replacement finished (succeeded: {}, failed: {})",
                    report.success_count(),
                    report.failure_count()
                );
                self.report = Some(report);

                // Committed files are now "already on disk"
                Task::perform(
                    scan_existing(self.site.clone(), self.catalog.clone()),
                    Message::Rescanned,
                )
            }
            Message::ReportDismissed => {
                self.report = None;
                Task::none()
            }
            Message::NewItem => {
                let category = self
                    .portfolio
                    .categories()
                    .first()
                    .map(|c| c.id.clone())
                    .unwrap_or_default();
                self.form = Some(ItemForm::new(category));
                Task::none()
            }
            Message::EditItem(id) => {
                if let Some(item) = self.portfolio.get(&id) {
                    self.form = Some(ItemForm::editing(item));
                }
                Task::none()
            }
            Message::Form(form_message) => {
                if let Some(form) = &mut self.form {
                    form.update(form_message);
                }
                Task::none()
            }
            Message::PickItemImages => {
                let picked = FileDialog::new()
                    .set_title("Choose images (the first one is the cover)")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_files();
                if let (Some(form), Some(files)) = (&mut self.form, picked) {
                    form.images = Some(files);
                }
                Task::none()
            }
            Message::PickItemVideos => {
                let picked = FileDialog::new()
                    .set_title("Choose videos")
                    .add_filter("Videos", &VIDEO_EXTENSIONS)
                    .pick_files();
                if let (Some(form), Some(files)) = (&mut self.form, picked) {
                    form.videos = Some(files);
                }
                Task::none()
            }
            Message::SaveItem => {
                let Some(form) = self.form.take() else {
                    return Task::none();
                };
                if form.name.trim().is_empty() {
                    self.status = "A portfolio item needs a name.".to_string();
                    self.form = Some(form);
                    return Task::none();
                }

                self.busy = true;
                let site = self.site.clone();
                let mut store = self.portfolio.clone();
                match form.editing.clone() {
                    Some(id) => {
                        let patch = form.into_patch();
                        Task::perform(
                            async move {
                                store.update(&site, &id, patch).await.map_err(|e| e.to_string())?;
                                Ok::<_, String>(store)
                            },
                            Message::PortfolioSaved,
                        )
                    }
                    None => {
                        let draft = form.into_draft();
                        Task::perform(
                            async move {
                                store.create(&site, draft).await.map_err(|e| e.to_string())?;
                                Ok::<_, String>(store)
                            },
                            Message::PortfolioSaved,
                        )
                    }
                }
            }
            Message::CancelItem => {
                self.form = None;
                Task::none()
            }
            Message::MoveItem(index, direction) => {
                self.busy = true;
                let site = self.site.clone();
                let mut store = self.portfolio.clone();
                Task::perform(
                    async move {
                        store.move_item(&site, index, direction).await.map_err(|e| e.to_string())?;
                        Ok::<_, String>(store)
                    },
                    Message::PortfolioSaved,
                )
            }
            Message::DeleteItem(id) => {
                self.busy = true;
                let site = self.site.clone();
                let mut store = self.portfolio.clone();
                Task::perform(
                    async move {
                        store.delete(&site, &id).await.map_err(|e| e.to_string())?;
                        Ok::<_, String>(store)
                    },
                    Message::PortfolioSaved,
                )
            }
            Message::PortfolioSaved(result) => {
                self.busy = false;
                match result {
                    Ok(store) => {
                        self.portfolio = store;
                        self.status = "Portfolio saved.".to_string();
                    }
                    Err(e) => {
                        warn!("⚠️  Portfolio save failed: {}", e);
                        self.status = format!("Portfolio save failed: {}", e);
                    }
                }
                Task::none()
            }
        }
    }

    /// Re-render the current page with pending edits
    fn preview_task(&self) -> Task<Message> {
        Task::perform(
            render_preview(
                self.site.clone(),
                self.page.clone(),
                self.catalog.clone(),
                self.pending.clone(),
                self.config.preview_dir.clone(),
            ),
            Message::PreviewRendered,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let tabs = row![
            tab_button("Media slots", Tab::Slots, self.tab),
            tab_button("Panoramas", Tab::Panorama, self.tab),
            tab_button("Portfolio", Tab::Portfolio, self.tab),
        ]
        .spacing(10);

        let body: Element<Message> = if let Some(report) = &self.report {
            ui::report::view(report)
        } else if self.confirming {
            ui::report::confirm(self.pending.new_file_count(), self.panorama.is_dirty())
        } else {
            match self.tab {
                Tab::Slots => ui::slots::view(
                    &self.catalog,
                    &self.pending,
                    &self.search,
                    &self.category,
                    &self.pages,
                    &self.page,
                    self.last_preview.as_ref(),
                    self.busy,
                ),
                Tab::Panorama => ui::panorama::view(&self.catalog, &self.panorama, self.busy),
                Tab::Portfolio => match &self.form {
                    Some(form) => ui::portfolio::form_view(form, self.portfolio.categories(), self.busy),
                    None => ui::portfolio::list_view(&self.portfolio, self.busy),
                },
            }
        };

        let can_commit = !self.busy && (self.pending.has_new_files() || self.panorama.is_dirty());
        let footer = row![
            button("Preview changes")
                .on_press_maybe((!self.busy).then_some(Message::RefreshPreview))
                .padding(10),
            button("Confirm and replace")
                .on_press_maybe(can_commit.then_some(Message::CommitRequested))
                .padding(10),
            text(&self.status).size(14),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let content: Column<Message> = column![tabs, body, footer]
            .spacing(20)
            .padding(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn tab_button(label: &str, tab: Tab, current: Tab) -> Element<'_, Message> {
    let style = if tab == current { button::primary } else { button::secondary };
    button(text(label))
        .style(style)
        .on_press(Message::TabSelected(tab))
        .padding(8)
        .into()
}

fn source_name(edit: &PendingEdit) -> String {
    edit.source
        .as_ref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Read the slot config, documents, and existing files
async fn load_site(site: Site, slot_config: PathBuf) -> LoadedSite {
    let catalog = site.load_catalog(&slot_config).await;
    let existing = scan_existing(site.clone(), catalog.clone()).await;
    let panorama = PanoramaMap::load(&site).await;
    let portfolio = PortfolioStore::load(&site).await;
    let pages = discover_pages(site.root(), &catalog);

    LoadedSite { catalog, existing, panorama, portfolio, pages }
}

fn main() -> iced::Result {
    config::init_logging();
    let config = AppConfig::from(Cli::parse());

    iced::application(
        "Site Media Editor",
        SiteMediaEditor::update,
        SiteMediaEditor::view,
    )
    .theme(SiteMediaEditor::theme)
    .window_size((1400.0, 900.0))
    .centered()
    .run_with(move || SiteMediaEditor::new(config))
}
