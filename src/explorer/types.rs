use std::fmt;

use super::error::ExplorerError;

/// A single file or directory reported by the remote agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    pub size_bytes: u64,
    /// Unix timestamp in seconds
    pub modified_at: i64,
    /// Permission/attribute text, display only
    pub mode: String,
}

/// Decoded directory contents at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Remote-reported current directory, never guessed locally
    pub path: String,
    pub exists: bool,
    pub timezone: String,
    pub timezone_offset_seconds: i64,
    /// Protocol order, not re-sorted
    pub entries: Vec<FileEntry>,
}

impl DirectoryListing {
    /// The value returned for empty or malformed payloads
    pub fn missing() -> Self {
        Self::default()
    }

    /// Human readable `UTC+5.5` style suffix for the remote timezone
    pub fn utc_offset_label(&self) -> String {
        let hours = self.timezone_offset_seconds as f64 / 3600.0;
        let sign = if self.timezone_offset_seconds >= 0 { "+" } else { "" };
        format!("UTC{}{}", sign, hours)
    }
}

/// A path already converted to the escaped form the remote command parser expects.
///
/// Only the functions in `explorer::path` build one, so an argument can never be
/// escaped twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirePath(pub(super) String);

impl WirePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Navigation status shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Which transition a dispatched navigation belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavKind {
    Initial,
    Open,
    Back,
    Manual,
    Refresh,
}

/// Handle for one dispatched navigation.
///
/// `target` is `None` for a plain listing, otherwise the `cd` argument issued before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTicket {
    pub seq: u64,
    pub kind: NavKind,
    pub target: Option<WirePath>,
}

/// Result of feeding a navigation outcome back into the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Failed(ExplorerError),
    Stale,
}
