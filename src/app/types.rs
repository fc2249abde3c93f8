use std::path::PathBuf;
use std::time::Instant;

use ratatui::widgets::ListState;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::preview::PreviewState;
use crate::app_event::BrowserEvent;
use crate::explorer::types::WirePath;
use crate::explorer::{CommandDispatcher, FileEntry, NavigationController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditPath,
    Details,
}

/// A file pinned to the directory it was listed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetails {
    pub entry: FileEntry,
    /// Display path of the file on the remote host
    pub location: String,
    pub target: WirePath,
}

pub struct App {
    pub should_quit: bool,
    /// Printed after the terminal is restored
    pub exit_reason: Option<String>,
    pub input_mode: InputMode,

    pub navigator: NavigationController,
    pub dispatcher: CommandDispatcher,

    pub selected: usize,
    pub list_state: ListState,

    // Path editor
    pub path_input: String,

    // Details popup
    pub details: Option<FileDetails>,
    pub preview: Option<PreviewState>,

    // Downloads
    pub download_dir: PathBuf,
    pub downloads_in_flight: usize,

    pub status_message: Option<(String, Instant)>,

    pub(super) event_tx: UnboundedSender<BrowserEvent>,
    pub(super) event_rx: UnboundedReceiver<BrowserEvent>,
}
