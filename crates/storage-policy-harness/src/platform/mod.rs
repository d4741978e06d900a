// crates/storage-policy-harness/src/platform/mod.rs
// ============================================================================
// Module: Platform Client
// Description: HTTP client for the hosted platform's auth, row, and storage APIs.
// Purpose: Issue authenticated requests with transcripts and bounded retries.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`PlatformClient`] wraps one `reqwest` client plus the credentials the
//! harness holds: the anonymous key, the service-role key, and at most one
//! signed-in session. Each request names its [`Authority`]; the client maps
//! that to the `apikey` and bearer headers the platform expects.
//!
//! Every attempt is appended to a transcript (method, path, status, error).
//! Request and response bodies are not recorded.
//!
//! Invariants:
//! - A non-2xx reply is [`PlatformError::Status`]; transport and decode
//!   failures are distinct variants so callers can tell a policy refusal from
//!   an unreachable platform.
//! - Storage writes, row inserts, RPCs, and user creation are never retried.
//!   Other requests retry connect failures, and timeouts only when the
//!   method is idempotent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod rest;
pub mod storage;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::Method;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use url::Url;

pub use auth::AuthUser;
pub use auth::SessionToken;
pub use storage::ObjectEntry;
pub use storage::StoredObject;

use crate::config::HarnessConfig;
use crate::events::HarnessEvent;
use crate::events::HarnessEventKind;
use crate::events::HarnessEventSink;
use crate::events::NoopEventSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum attempts for transient HTTP send failures.
const MAX_HTTP_SEND_ATTEMPTS: u32 = 3;
/// Base backoff delay for transient HTTP send retries.
const BASE_HTTP_SEND_RETRY_DELAY_MS: u64 = 50;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Platform call errors.
///
/// # Invariants
/// - `Status` means the platform answered and refused; the message is
///   untrusted server text.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The request never produced a response.
    #[error("platform transport error: {0}")]
    Transport(String),
    /// The platform answered with a non-success status.
    #[error("platform returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the body.
        message: String,
    },
    /// A success body could not be decoded.
    #[error("platform response decode error: {0}")]
    Decode(String),
    /// The request could not be built.
    #[error("platform request error: {0}")]
    Request(String),
}

impl PlatformError {
    /// HTTP status when the platform answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status {
                status, ..
            } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Credentials a request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// Service-role key as both `apikey` and bearer; bypasses row policies.
    Service,
    /// Anonymous key plus the current session token, or the anonymous key
    /// when no session is installed.
    Session,
    /// Anonymous key only, ignoring any session.
    Anonymous,
}

/// One transcript entry per HTTP attempt.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// 1-based attempt sequence number.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Request path without query.
    pub path: String,
    /// Credential class used.
    pub authority: &'static str,
    /// Response status when one arrived.
    pub status: Option<u16>,
    /// Transport or platform error text.
    pub error: Option<String>,
}

/// Request body variants.
#[derive(Debug, Clone)]
enum RequestBody {
    /// No body.
    Empty,
    /// JSON body.
    Json(Value),
    /// Raw body with explicit content type.
    Raw {
        /// MIME type.
        content_type: String,
        /// Body bytes.
        bytes: Bytes,
    },
}

/// Everything needed to issue one logical request.
#[derive(Debug, Clone)]
struct RequestSpec {
    /// HTTP method.
    method: Method,
    /// Absolute URL.
    url: Url,
    /// Credentials.
    authority: Authority,
    /// Extra headers.
    headers: Vec<(&'static str, String)>,
    /// Body.
    body: RequestBody,
    /// Whether transient transport failures may be retried.
    retry: bool,
}

/// Raw reply from the platform.
#[derive(Debug)]
struct HttpReply {
    /// Status code.
    status: StatusCode,
    /// Body bytes.
    body: Bytes,
}

/// Platform client with session state and transcript capture.
///
/// # Invariants
/// - Clones share the session and transcript.
#[derive(Clone)]
pub struct PlatformClient {
    /// Base URL without trailing slash.
    base_url: String,
    /// Anonymous key.
    anon_key: String,
    /// Service-role key.
    service_key: String,
    /// HTTP client.
    http: Client,
    /// Current signed-in session.
    session: Arc<Mutex<Option<SessionToken>>>,
    /// Attempt transcript.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
    /// Event sink shared with harness components.
    events: Arc<dyn HarnessEventSink>,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.session_user_id().is_some())
            .finish_non_exhaustive()
    }
}

impl PlatformClient {
    /// Creates a client from harness configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Request`] when the HTTP client cannot be built.
    pub fn new(config: &HarnessConfig) -> Result<Self, PlatformError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PlatformError::Request(format!("failed to build http client: {err}")))?;
        Ok(Self {
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            service_key: config.service_key.clone(),
            http,
            session: Arc::new(Mutex::new(None)),
            transcript: Arc::new(Mutex::new(Vec::new())),
            events: Arc::new(NoopEventSink),
        })
    }

    /// Attaches an event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn HarnessEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the platform base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Records an event on the attached sink.
    pub fn emit(&self, kind: HarnessEventKind) {
        self.events.record(&HarnessEvent::now(kind));
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Installs or clears the signed-in session.
    pub fn set_session(&self, session: Option<SessionToken>) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = session;
        }
    }

    /// User id of the signed-in session, if any.
    #[must_use]
    pub fn session_user_id(&self) -> Option<String> {
        self.session.lock().ok().and_then(|guard| guard.as_ref().map(|s| s.user_id.clone()))
    }

    // ------------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------------

    /// Builds an absolute URL from a path beginning with `/`.
    fn endpoint(&self, path: &str) -> Result<Url, PlatformError> {
        Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|err| PlatformError::Request(format!("invalid url for {path}: {err}")))
    }

    /// Returns the `apikey` and bearer values for an authority.
    fn credentials(&self, authority: Authority) -> (String, String) {
        match authority {
            Authority::Service => (self.service_key.clone(), self.service_key.clone()),
            Authority::Anonymous => (self.anon_key.clone(), self.anon_key.clone()),
            Authority::Session => {
                let token = self
                    .session
                    .lock()
                    .ok()
                    .and_then(|guard| guard.as_ref().map(|s| s.access_token.clone()))
                    .unwrap_or_else(|| self.anon_key.clone());
                (self.anon_key.clone(), token)
            }
        }
    }

    /// Sends a request, retrying transient transport failures when allowed.
    async fn execute(&self, spec: RequestSpec) -> Result<HttpReply, PlatformError> {
        let (api_key, bearer) = self.credentials(spec.authority);
        let max_attempts = if spec.retry { MAX_HTTP_SEND_ATTEMPTS } else { 1 };
        for attempt in 1 ..= max_attempts {
            let mut request = self
                .http
                .request(spec.method.clone(), spec.url.clone())
                .header("apikey", &api_key)
                .bearer_auth(&bearer);
            for (name, value) in &spec.headers {
                request = request.header(*name, value);
            }
            request = match &spec.body {
                RequestBody::Empty => request,
                RequestBody::Json(value) => request.json(value),
                RequestBody::Raw {
                    content_type,
                    bytes,
                } => request.header("content-type", content_type).body(bytes.clone()),
            };

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    self.record_transcript(&spec, None, Some(err.to_string()));
                    if attempt < max_attempts && should_retry_http_send(&spec.method, &err) {
                        sleep(retry_delay_for_attempt(attempt)).await;
                        continue;
                    }
                    return Err(PlatformError::Transport(format!(
                        "{} {} failed after {attempt} attempt(s): {err}",
                        spec.method,
                        spec.url.path()
                    )));
                }
            };
            let status = response.status();
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(err) => {
                    self.record_transcript(&spec, Some(status.as_u16()), Some(err.to_string()));
                    return Err(PlatformError::Transport(format!(
                        "reading body of {}: {err}",
                        spec.url.path()
                    )));
                }
            };
            let error = (!status.is_success()).then(|| error_message(&body));
            self.record_transcript(&spec, Some(status.as_u16()), error);
            return Ok(HttpReply {
                status,
                body,
            });
        }
        Err(PlatformError::Transport("http request failed: exhausted retry attempts".to_string()))
    }

    /// Sends a request and turns non-2xx replies into [`PlatformError::Status`].
    async fn execute_ok(&self, spec: RequestSpec) -> Result<Bytes, PlatformError> {
        let reply = self.execute(spec).await?;
        if reply.status.is_success() {
            Ok(reply.body)
        } else {
            Err(PlatformError::Status {
                status: reply.status.as_u16(),
                message: error_message(&reply.body),
            })
        }
    }

    /// Sends a request and decodes a JSON success body.
    async fn execute_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, PlatformError> {
        let path = spec.url.path().to_string();
        let body = self.execute_ok(spec).await?;
        decode_json(&path, &body)
    }

    /// Appends one attempt to the transcript.
    fn record_transcript(&self, spec: &RequestSpec, status: Option<u16>, error: Option<String>) {
        let Ok(mut guard) = self.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method: spec.method.to_string(),
            path: spec.url.path().to_string(),
            authority: match spec.authority {
                Authority::Service => "service",
                Authority::Session => "session",
                Authority::Anonymous => "anonymous",
            },
            status,
            error,
        });
    }
}

impl RequestSpec {
    /// Starts a retryable request with no body.
    const fn new(method: Method, url: Url, authority: Authority) -> Self {
        Self {
            method,
            url,
            authority,
            headers: Vec::new(),
            body: RequestBody::Empty,
            retry: true,
        }
    }

    /// Attaches a JSON body.
    fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Attaches a raw body.
    fn raw(mut self, content_type: &str, bytes: Bytes) -> Self {
        self.body = RequestBody::Raw {
            content_type: content_type.to_string(),
            bytes,
        };
        self
    }

    /// Adds a header.
    fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Disables transport retries.
    const fn no_retry(mut self) -> Self {
        self.retry = false;
        self
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a JSON body, treating an empty body as `null`.
fn decode_json<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, PlatformError> {
    let bytes: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"null" } else { body };
    serde_json::from_slice(bytes)
        .map_err(|err| PlatformError::Decode(format!("invalid json from {path}: {err}")))
}

/// Extracts a human-readable message from a platform error body.
fn error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return String::from_utf8_lossy(body).chars().take(200).collect();
    };
    ["message", "error_description", "msg", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map_or_else(|| value.to_string(), str::to_string)
}

/// Returns true when an HTTP send failure should be retried.
///
/// Timeouts are retried only for idempotent methods.
fn should_retry_http_send(method: &Method, err: &reqwest::Error) -> bool {
    if err.is_connect() {
        return true;
    }
    if err.is_timeout() {
        return is_idempotent(method);
    }
    if !err.is_request() {
        return false;
    }
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("connection reset")
        || msg.contains("connection refused")
        || msg.contains("connection closed")
        || msg.contains("broken pipe")
        || msg.contains("eof")
}

/// Methods safe to resend after an unknown outcome.
fn is_idempotent(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::PUT, Method::DELETE, Method::OPTIONS].contains(method)
}

/// Returns bounded linear backoff for HTTP send retries.
fn retry_delay_for_attempt(attempt: u32) -> Duration {
    Duration::from_millis(u64::from(attempt) * BASE_HTTP_SEND_RETRY_DELAY_MS)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
