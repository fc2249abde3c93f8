use std::path::{Path, PathBuf};
use std::time::Instant;

use ratatui::widgets::ListState;
use tokio::sync::mpsc;

use crate::app::preview::{Preview, PreviewState};
use crate::app::types::{App, FileDetails, InputMode};
use crate::app_event::{BrowserEvent, DownloadFailure, TransferEvent};
use crate::explorer::path::display_child;
use crate::explorer::types::WirePath;
use crate::explorer::{
    ApplyOutcome, CommandDispatcher, ExplorerError, FileEntry, NavTicket, NavigationController,
};

impl App {
    pub fn new(dispatcher: CommandDispatcher, download_dir: PathBuf) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            should_quit: false,
            exit_reason: None,
            input_mode: InputMode::Normal,
            navigator: NavigationController::new(),
            dispatcher,
            selected: 0,
            list_state: ListState::default(),
            path_input: String::new(),
            details: None,
            preview: None,
            download_dir,
            downloads_in_flight: 0,
            status_message: None,
            event_tx,
            event_rx,
        }
    }

    /// Kick off the first listing of the agent's working directory
    pub fn start(&mut self) {
        let ticket = self.navigator.begin_initial();
        self.set_status("Loading remote directory...");
        self.spawn_navigation(ticket);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.navigator.listing().entries
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.entries().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
            self.list_state.select(Some(self.selected));
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
            self.list_state.select(Some(self.selected));
        }
    }

    fn reset_selection(&mut self) {
        self.selected = 0;
        if self.entries().is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn spawn_navigation(&self, ticket: NavTicket) {
        let dispatcher = self.dispatcher.clone();
        let sender = self.event_tx.clone();
        tokio::spawn(async move {
            let result = NavigationController::execute(&dispatcher, &ticket).await;
            if sender.send(BrowserEvent::Navigation { ticket, result }).is_err() {
                tracing::warn!("UI loop gone before navigation finished");
            }
        });
    }

    /// Enter on the selected row: descend into a directory or show file details
    pub fn open_selected(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        if !entry.is_dir {
            tracing::debug!("Showing details for {}", entry.name);
            self.details = Some(FileDetails {
                location: display_child(self.navigator.current_path(), &entry.name),
                target: self.navigator.file_target(&entry),
                entry,
            });
            self.preview = None;
            self.input_mode = InputMode::Details;
            return;
        }
        if let Some(ticket) = self.navigator.begin_open(&entry) {
            self.set_status(format!("Opening {}...", entry.name));
            self.spawn_navigation(ticket);
        }
    }

    pub fn go_back(&mut self) {
        if let Some(ticket) = self.navigator.begin_back() {
            self.set_status("Going back...");
            self.spawn_navigation(ticket);
        }
    }

    pub fn refresh(&mut self) {
        if let Some(ticket) = self.navigator.begin_refresh() {
            self.set_status("Reloading...");
            self.spawn_navigation(ticket);
        }
    }

    pub fn retry(&mut self) {
        match self.navigator.retry() {
            Some(ticket) => {
                self.set_status("Retrying...");
                self.spawn_navigation(ticket);
            }
            None => self.set_status("Nothing to retry"),
        }
    }

    pub fn begin_path_edit(&mut self) {
        if self.navigator.is_loading() {
            return;
        }
        self.path_input = self.navigator.current_path().to_string();
        self.input_mode = InputMode::EditPath;
    }

    pub fn cancel_path_edit(&mut self) {
        self.path_input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_path(&mut self) {
        let typed = std::mem::take(&mut self.path_input);
        self.input_mode = InputMode::Normal;
        if let Some(ticket) = self.navigator.begin_manual(&typed) {
            self.set_status(format!("Changing directory to {}...", typed.trim()));
            self.spawn_navigation(ticket);
        }
    }

    pub fn close_details(&mut self) {
        self.details = None;
        self.preview = None;
        self.input_mode = InputMode::Normal;
    }

    /// Download the file shown in the details popup, or the selected file.
    ///
    /// The popup keeps the target computed when it opened, so a navigation
    /// landing in between does not change which remote file is fetched.
    pub fn download_selected(&mut self) {
        let (name, target) = if let Some(details) = &self.details {
            (details.entry.name.clone(), details.target.clone())
        } else {
            let Some(entry) = self.selected_entry() else {
                return;
            };
            if entry.is_dir {
                self.set_status("Only files can be downloaded");
                return;
            }
            (entry.name.clone(), self.navigator.file_target(entry))
        };
        self.spawn_download(name, target);
    }

    fn spawn_download(&mut self, name: String, target: WirePath) {
        let destination = self.download_dir.join(local_file_name(&name));
        let dispatcher = self.dispatcher.clone();
        let sender = self.event_tx.clone();

        tracing::info!("Downloading {} to {:?}", target, destination);
        self.downloads_in_flight += 1;
        self.set_status(format!("Downloading {}...", name));

        tokio::spawn(async move {
            let event = match dispatcher.download(&target).await {
                Ok(bytes) => match persist(&destination, &bytes).await {
                    Ok(()) => TransferEvent::DownloadComplete {
                        name,
                        saved_to: destination,
                        bytes: bytes.len(),
                    },
                    Err(e) => TransferEvent::DownloadError {
                        name,
                        error: DownloadFailure::Local(e.to_string()),
                    },
                },
                Err(e) => TransferEvent::DownloadError {
                    name,
                    error: DownloadFailure::Remote(e),
                },
            };
            if sender.send(BrowserEvent::Download(event)).is_err() {
                tracing::warn!("UI loop gone before download finished");
            }
        });
    }

    /// Fetch the file shown in the details popup and show its leading bytes.
    /// Nothing is written to disk and navigation state is untouched.
    pub fn preview_details(&mut self) {
        let Some(details) = &self.details else {
            return;
        };
        if matches!(self.preview, Some(PreviewState::Loading { .. })) {
            return;
        }
        let target = details.target.clone();
        let name = details.entry.name.clone();
        tracing::info!("Previewing {}", target);
        self.preview = Some(PreviewState::Loading { name });

        let dispatcher = self.dispatcher.clone();
        let sender = self.event_tx.clone();
        tokio::spawn(async move {
            let result = dispatcher.download(&target).await;
            if sender.send(BrowserEvent::Preview { target, result }).is_err() {
                tracing::warn!("UI loop gone before preview finished");
            }
        });
    }

    /// Drain finished background work without blocking the draw loop
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: BrowserEvent) {
        match event {
            BrowserEvent::Navigation { ticket, result } => {
                match self.navigator.apply(&ticket, result) {
                    ApplyOutcome::Applied => {
                        self.reset_selection();
                        let listing = self.navigator.listing();
                        let message = if listing.exists {
                            format!("{} items in {}", listing.entries.len(), listing.path)
                        } else {
                            format!("{} does not exist", listing.path)
                        };
                        self.set_status(message);
                    }
                    ApplyOutcome::Failed(err) => {
                        self.reset_selection();
                        self.on_remote_error(&err);
                    }
                    ApplyOutcome::Stale => {}
                }
            }
            BrowserEvent::Preview { target, result } => {
                let Some(details) = &self.details else {
                    return;
                };
                if details.target != target {
                    tracing::debug!("Dropping preview of {}, popup moved on", target);
                    return;
                }
                let name = details.entry.name.clone();
                match result {
                    Ok(bytes) => {
                        self.preview = Some(PreviewState::Ready(Preview::from_bytes(name, &bytes)));
                    }
                    Err(err) => {
                        tracing::error!("Preview of {} failed: {}", target, err);
                        self.preview = Some(PreviewState::Failed {
                            name,
                            message: err.to_string(),
                        });
                        if err.is_auth_expired() {
                            self.on_remote_error(&err);
                        }
                    }
                }
            }
            BrowserEvent::Download(event) => {
                self.downloads_in_flight = self.downloads_in_flight.saturating_sub(1);
                match event {
                    TransferEvent::DownloadComplete { name, saved_to, bytes } => {
                        tracing::info!("Saved {} ({} bytes) to {:?}", name, bytes, saved_to);
                        self.set_status(format!(
                            "Downloaded {} ({} bytes) to {}",
                            name,
                            bytes,
                            saved_to.display()
                        ));
                    }
                    TransferEvent::DownloadError { name, error } => match error {
                        DownloadFailure::Remote(err) => {
                            tracing::error!("Download of {} failed: {}", name, err);
                            self.on_remote_error(&err);
                        }
                        DownloadFailure::Local(msg) => {
                            tracing::error!("Saving {} failed: {}", name, msg);
                            self.set_status(format!("Failed to save {}: {}", name, msg));
                        }
                    },
                }
            }
        }
    }

    fn on_remote_error(&mut self, err: &ExplorerError) {
        if err.is_auth_expired() {
            tracing::warn!("Session authentication expired, quitting");
            self.exit_reason = Some(err.to_string());
            self.should_quit = true;
            return;
        }
        self.set_status(format!("Error [{}]: {} ([R] retry)", err.category(), err));
    }
}

/// Last path component of a remote name, safe to join under the download dir
fn local_file_name(remote_name: &str) -> String {
    let base = remote_name
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("");
    match base {
        "" | "." | ".." => "download.bin".to_string(),
        name => name.to_string(),
    }
}

async fn persist(destination: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(destination, bytes).await
}
