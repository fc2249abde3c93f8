use std::path::PathBuf;

use crate::explorer::types::WirePath;
use crate::explorer::{DirectoryListing, ExplorerError, NavTicket};

/// Results delivered from background tasks to the UI loop
#[derive(Debug)]
pub enum BrowserEvent {
    Navigation {
        ticket: NavTicket,
        result: Result<DirectoryListing, ExplorerError>,
    },
    Download(TransferEvent),
    Preview {
        target: WirePath,
        result: Result<Vec<u8>, ExplorerError>,
    },
}

#[derive(Debug, Clone)]
pub enum TransferEvent {
    DownloadComplete { name: String, saved_to: PathBuf, bytes: usize },
    DownloadError { name: String, error: DownloadFailure },
}

#[derive(Debug, Clone)]
pub enum DownloadFailure {
    Remote(ExplorerError),
    Local(String),
}
