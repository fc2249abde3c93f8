use std::fmt;
use std::sync::Arc;

use super::decoder::decode;
use super::error::ExplorerError;
use super::transport::{Reply, ReplyKind, SessionTransport};
use super::types::{DirectoryListing, WirePath};

/// Commands understood by the remote agent's filesystem handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireCommand {
    List,
    ChangeDirectory,
    Download,
}

impl WireCommand {
    pub fn name(self) -> &'static str {
        match self {
            WireCommand::List => "ls",
            WireCommand::ChangeDirectory => "cd",
            WireCommand::Download => "download",
        }
    }

    /// `"<command>,<argument>"`, or the bare command name
    pub fn encode(self, argument: Option<&WirePath>) -> String {
        match argument {
            Some(arg) => format!("{},{}", self.name(), arg),
            None => self.name().to_string(),
        }
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializes filesystem operations into wire commands and performs the round trip
#[derive(Clone)]
pub struct CommandDispatcher {
    transport: Arc<dyn SessionTransport>,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn SessionTransport>) -> Self {
        Self { transport }
    }

    async fn send(
        &self,
        command: WireCommand,
        argument: Option<&WirePath>,
        kind: ReplyKind,
    ) -> Result<Reply, ExplorerError> {
        let wire = command.encode(argument);
        tracing::debug!("Sending wire command: {}", wire);
        match self.transport.request(&wire, kind).await {
            Ok(reply) => Ok(reply),
            Err(failure) => {
                tracing::error!(
                    "Command {} failed (status {:?}): {}",
                    command,
                    failure.status,
                    failure.detail
                );
                Err(failure.into())
            }
        }
    }

    async fn send_text(
        &self,
        command: WireCommand,
        argument: Option<&WirePath>,
    ) -> Result<String, ExplorerError> {
        match self.send(command, argument, ReplyKind::Text).await? {
            Reply::Text(text) => Ok(text),
            Reply::Binary(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    /// List the agent's current directory
    pub async fn list(&self) -> Result<DirectoryListing, ExplorerError> {
        let raw = self.send_text(WireCommand::List, None).await?;
        let listing = decode(&raw);
        tracing::debug!(
            "ls -> path={:?} exists={} entries={}",
            listing.path,
            listing.exists,
            listing.entries.len()
        );
        Ok(listing)
    }

    /// Change the agent's working directory. Returns the path the agent reports.
    ///
    /// A reply without a usable path is a failure even when the transport succeeded.
    pub async fn change_directory(&self, path: &WirePath) -> Result<String, ExplorerError> {
        let raw = self.send_text(WireCommand::ChangeDirectory, Some(path)).await?;
        let reported = decode(&raw).path;
        if reported.trim().is_empty() {
            tracing::warn!("cd {} returned no path", path);
            return Err(ExplorerError::Protocol(format!(
                "agent did not report a directory after cd {}",
                path
            )));
        }
        Ok(reported)
    }

    /// Fetch a file's raw contents. Persisting them is up to the caller.
    pub async fn download(&self, path: &WirePath) -> Result<Vec<u8>, ExplorerError> {
        match self.send(WireCommand::Download, Some(path), ReplyKind::Binary).await? {
            Reply::Binary(bytes) => Ok(bytes),
            Reply::Text(text) => Ok(text.into_bytes()),
        }
    }
}
