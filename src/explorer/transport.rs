//! HTTP transport to the session backend, plus the scripted test double

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::error::TransportFailure;

#[cfg(test)]
use std::collections::{HashMap, VecDeque};

/// How the caller wants the reply body interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Text,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Binary(Vec<u8>),
}

/// The capability the command dispatcher uses to reach a remote session.
///
/// One call is one round trip. Implementations never retry.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    async fn request(&self, command: &str, kind: ReplyKind) -> Result<Reply, TransportFailure>;
}

/// Connection details for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub backend_url: String,
    pub interact_endpoint: String,
    pub token: Option<String>,
    pub session_id: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct InteractRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Transport that posts wire commands to the backend's session interaction endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    url: String,
    token: Option<String>,
    session_id: Option<String>,
}

impl HttpTransport {
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let base = options.backend_url.trim_end_matches('/');
        let endpoint = options.interact_endpoint.trim_start_matches('/');
        Ok(Self {
            http,
            url: format!("{}/{}", base, endpoint),
            token: options.token.clone().filter(|t| !t.trim().is_empty()),
            session_id: options.session_id.clone().filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SessionTransport for HttpTransport {
    async fn request(&self, command: &str, kind: ReplyKind) -> Result<Reply, TransportFailure> {
        let body = InteractRequest {
            command,
            session_id: self.session_id.as_deref(),
        };
        let accept = match kind {
            ReplyKind::Text => "application/json",
            ReplyKind::Binary => "application/octet-stream",
        };
        let mut request = self.http.post(&self.url).header(ACCEPT, accept).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(failure_from_reqwest)?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        tracing::debug!("POST {} -> {}", self.url, status);

        match kind {
            ReplyKind::Text => {
                let text = response.text().await.map_err(failure_from_reqwest)?;
                interpret_text_reply(status, &text).map(Reply::Text)
            }
            ReplyKind::Binary => {
                let bytes = response.bytes().await.map_err(failure_from_reqwest)?;
                interpret_binary_reply(status, is_json, bytes.to_vec()).map(Reply::Binary)
            }
        }
    }
}

fn failure_from_reqwest(err: reqwest::Error) -> TransportFailure {
    TransportFailure::new(err.status().map(|s| s.as_u16()), err.to_string())
}

fn detail_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn error_status(status: StatusCode, envelope: &Envelope, raw: &str) -> TransportFailure {
    let detail = envelope
        .detail
        .as_ref()
        .map(detail_text)
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| {
            if raw.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                raw.trim().to_string()
            }
        });
    TransportFailure::new(Some(status.as_u16()), detail)
}

/// Turn a text reply into the agent payload or a failure signal
pub(crate) fn interpret_text_reply(status: StatusCode, body: &str) -> Result<String, TransportFailure> {
    let parsed = serde_json::from_str::<Envelope>(body);
    if !status.is_success() {
        return Err(error_status(status, &parsed.unwrap_or_default(), body));
    }
    let Ok(envelope) = parsed else {
        // Bare text body: the payload itself
        return Ok(body.to_string());
    };
    match (&envelope.result, &envelope.detail) {
        (Some(result), _) => Ok(detail_text(result)),
        (None, Some(detail)) => Err(TransportFailure::new(
            Some(status.as_u16()),
            detail_text(detail),
        )),
        (None, None) => Err(TransportFailure::new(
            Some(status.as_u16()),
            "Backend reply carried neither result nor detail",
        )),
    }
}

/// Binary replies are the raw body unless the backend answered with a JSON error envelope
pub(crate) fn interpret_binary_reply(
    status: StatusCode,
    is_json: bool,
    body: Vec<u8>,
) -> Result<Vec<u8>, TransportFailure> {
    if !status.is_success() {
        let raw = String::from_utf8_lossy(&body);
        let envelope = serde_json::from_str::<Envelope>(&raw).unwrap_or_default();
        return Err(error_status(status, &envelope, &raw));
    }
    if is_json {
        if let Ok(envelope) = serde_json::from_slice::<Envelope>(&body) {
            if let (None, Some(detail)) = (&envelope.result, &envelope.detail) {
                return Err(TransportFailure::new(
                    Some(status.as_u16()),
                    detail_text(detail),
                ));
            }
        }
    }
    Ok(body)
}

/// Scripted transport for tests. Replies are queued per wire command and every
/// command sent is recorded.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: std::sync::Mutex<HashMap<String, VecDeque<Result<Reply, TransportFailure>>>>,
    sent: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockTransport {
    pub(crate) fn push_text(&self, command: &str, body: &str) {
        self.push(command, Ok(Reply::Text(body.to_string())));
    }

    pub(crate) fn push_failure(&self, command: &str, status: Option<u16>, detail: &str) {
        self.push(command, Err(TransportFailure::new(status, detail)));
    }

    pub(crate) fn push(&self, command: &str, reply: Result<Reply, TransportFailure>) {
        self.replies
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl SessionTransport for MockTransport {
    async fn request(&self, command: &str, kind: ReplyKind) -> Result<Reply, TransportFailure> {
        self.sent.lock().unwrap().push(command.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(command)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(TransportFailure::new(None, format!("no reply scripted for {command}"))));
        match (kind, reply) {
            (ReplyKind::Binary, Ok(Reply::Text(text))) => Ok(Reply::Binary(text.into_bytes())),
            (_, other) => other,
        }
    }
}
