// crates/storage-policy-harness/src/events.rs
// ============================================================================
// Module: Harness Events
// Description: Structured events for fixture, session, and upload activity.
// Purpose: Emit JSON-lines logs without hard dependencies on a logging stack.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every observable harness step is reported as a [`HarnessEvent`] to a
//! [`HarnessEventSink`]. The stderr sink writes one JSON object per line; the
//! memory sink keeps events for assertions and artifacts.
//! Security posture: events carry emails, keys of stored objects, and status
//! codes. They never carry passwords, tokens, or platform keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label for a fixture or teardown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step completed.
    Ok,
    /// Step failed.
    Error,
    /// Step had nothing to do.
    Skipped,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HarnessEventKind {
    /// A fixture provisioning step finished.
    FixtureStep {
        /// Step label.
        step: &'static str,
        /// Step outcome.
        outcome: StepOutcome,
        /// Failure detail when `outcome` is `error`.
        error: Option<String>,
    },
    /// A teardown step finished. Failures here are logged only.
    TeardownStep {
        /// Step label.
        step: &'static str,
        /// Step outcome.
        outcome: StepOutcome,
        /// Failure detail when `outcome` is `error`.
        error: Option<String>,
    },
    /// The client switched to another identity's session.
    SessionSwitch {
        /// Identity email.
        email: String,
        /// Identity role label.
        role: &'static str,
        /// Switch outcome.
        outcome: StepOutcome,
        /// Failure detail when `outcome` is `error`.
        error: Option<String>,
    },
    /// A storage write was classified.
    UploadOutcome {
        /// Bucket written to.
        bucket: String,
        /// Object key.
        key: String,
        /// Declared content type.
        content_type: String,
        /// Body length in bytes.
        size_bytes: usize,
        /// True when the platform accepted the write.
        accepted: bool,
        /// HTTP status for rejections.
        status: Option<u16>,
    },
    /// A scenario was judged.
    ScenarioVerdict {
        /// Scenario name.
        scenario: String,
        /// Whether the observed outcome matched the expectation.
        passed: bool,
        /// Human-readable comparison.
        detail: String,
    },
}

/// Harness event with a consistent timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    pub kind: HarnessEventKind,
}

impl HarnessEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn now(kind: HarnessEventKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            kind,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for harness events.
pub trait HarnessEventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: &HarnessEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl HarnessEventSink for StderrEventSink {
    fn record(&self, event: &HarnessEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that discards events.
pub struct NoopEventSink;

impl HarnessEventSink for NoopEventSink {
    fn record(&self, _event: &HarnessEvent) {}
}

/// Sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<HarnessEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HarnessEvent> {
        self.events.lock().map_or_else(|_| Vec::new(), |events| events.clone())
    }
}

impl HarnessEventSink for MemoryEventSink {
    fn record(&self, event: &HarnessEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
