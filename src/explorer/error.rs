//! Error taxonomy for the remote filesystem browser.
//!
//! Backend failures arrive either as an HTTP status or as free-form `detail`
//! text carrying fragments of the RPC layer's own errors. The string matching
//! lives here and nowhere else.

use thiserror::Error;

/// Marker the backend embeds when the agent did not answer in time
const TIMEOUT_MARKER: &str = "implant timeout";
/// Marker for a generic failure of the backend's RPC channel
const UNKNOWN_MARKER: &str = "StatusCode.UNKNOWN";

/// Raw failure signal produced by a transport before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// HTTP status, absent when the request never got a response
    pub status: Option<u16>,
    pub detail: String,
}

impl TransportFailure {
    pub fn new(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

/// Classified failure surfaced to the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    /// Backend rejected the token (HTTP 401).
    #[error("Authentication expired, log in again")]
    AuthenticationExpired,

    /// Remote agent did not respond.
    #[error("Remote agent is unreachable or not responding")]
    RemoteTimeout { detail: String },

    /// Transient failure somewhere between backend and agent.
    #[error("Connection error while talking to the agent, try again")]
    RemoteUnknown { detail: String },

    /// Reply arrived but its content was unusable.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Unclassified(String),
}

impl ExplorerError {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ExplorerError::AuthenticationExpired)
    }

    /// Short category label for the status bar
    pub fn category(&self) -> &'static str {
        match self {
            ExplorerError::AuthenticationExpired => "auth",
            ExplorerError::RemoteTimeout { .. } => "timeout",
            ExplorerError::RemoteUnknown { .. } => "connection",
            ExplorerError::Protocol(_) => "protocol",
            ExplorerError::Unclassified(_) => "error",
        }
    }
}

impl From<TransportFailure> for ExplorerError {
    fn from(failure: TransportFailure) -> Self {
        classify(&failure)
    }
}

/// Map a transport failure to its category
pub fn classify(failure: &TransportFailure) -> ExplorerError {
    if failure.status == Some(401) {
        return ExplorerError::AuthenticationExpired;
    }
    classify_detail(&failure.detail)
}

/// Classify free-form error detail text
pub fn classify_detail(detail: &str) -> ExplorerError {
    if detail.contains(TIMEOUT_MARKER) {
        ExplorerError::RemoteTimeout {
            detail: detail.to_string(),
        }
    } else if detail.contains(UNKNOWN_MARKER) {
        ExplorerError::RemoteUnknown {
            detail: detail.to_string(),
        }
    } else if detail.trim().is_empty() {
        ExplorerError::Unclassified("Request failed without details".to_string())
    } else {
        ExplorerError::Unclassified(detail.to_string())
    }
}
