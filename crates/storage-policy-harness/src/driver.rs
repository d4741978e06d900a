// crates/storage-policy-harness/src/driver.rs
// ============================================================================
// Module: Operation Driver
// Description: Issues storage writes and classifies their outcomes.
// Purpose: Turn platform replies into accept/reject observations.
// Dependencies: tokio, thiserror
// ============================================================================

//! ## Overview
//! [`OperationDriver::upload`] issues one write under the current session.
//! Any answered refusal is a [`UploadOutcome::Rejected`] value; a write that
//! got no answer is a [`DriverError`], because "the platform said no" and
//! "the platform never said anything" must not be confused.
//!
//! Accepted keys land in an [`UploadLedger`] so teardown can remove them.
//! Bursts issue every write concurrently on a [`JoinSet`] and collect the
//! outcomes in submission order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::events::HarnessEventKind;
use crate::platform::PlatformClient;
use crate::platform::PlatformError;
use crate::platform::StoredObject;
use crate::policy::UploadPayload;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Driver errors. None of these are policy outcomes.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The write produced no platform answer.
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// A concurrent write task panicked or was cancelled.
    #[error("upload task failed: {0}")]
    Join(String),
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Why the platform refused a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// HTTP status.
    pub status: u16,
    /// Platform message.
    pub message: String,
}

/// Outcome of one storage write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The platform stored the object.
    Accepted(StoredObject),
    /// The platform refused the write.
    Rejected(Rejection),
}

impl UploadOutcome {
    /// Returns true for accepted writes.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Returns true for refused writes.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// HTTP status of a refusal.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejection) => Some(rejection.status),
        }
    }
}

/// Outcomes of a burst, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Per-write outcomes.
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchOutcome {
    /// Number of accepted writes.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_accepted()).count()
    }

    /// Number of refused writes.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_rejected()).count()
    }

    /// Total writes issued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true when no writes were issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Keys of accepted writes, shared across clones.
#[derive(Debug, Clone, Default)]
pub struct UploadLedger {
    /// Accepted object keys (relative to the bucket).
    keys: Arc<Mutex<BTreeSet<String>>>,
}

impl UploadLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted key.
    pub fn record(&self, key: &str) {
        if let Ok(mut guard) = self.keys.lock() {
            guard.insert(key.to_string());
        }
    }

    /// Returns the recorded keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().map_or_else(|_| Vec::new(), |guard| guard.iter().cloned().collect())
    }

    /// Removes and returns all recorded keys.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        self.keys
            .lock()
            .map_or_else(|_| Vec::new(), |mut guard| std::mem::take(&mut *guard).into_iter().collect())
    }
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Issues storage writes against one bucket.
#[derive(Debug, Clone)]
pub struct OperationDriver {
    /// Shared platform client.
    client: PlatformClient,
    /// Target bucket.
    bucket: String,
    /// Ledger of accepted keys.
    ledger: UploadLedger,
}

impl OperationDriver {
    /// Creates a driver writing to `bucket` and recording into `ledger`.
    #[must_use]
    pub fn new(client: PlatformClient, bucket: impl Into<String>, ledger: UploadLedger) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            ledger,
        }
    }

    /// Target bucket.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Ledger of accepted keys.
    #[must_use]
    pub const fn ledger(&self) -> &UploadLedger {
        &self.ledger
    }

    /// Uploads one object under the current session.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Platform`] when the platform gave no answer or
    /// an accepted reply could not be decoded.
    pub async fn upload(
        &self,
        key: &str,
        payload: &UploadPayload,
    ) -> Result<UploadOutcome, DriverError> {
        let outcome = match self.client.upload_object(&self.bucket, key, payload).await {
            Ok(stored) => {
                self.ledger.record(key);
                UploadOutcome::Accepted(stored)
            }
            Err(PlatformError::Status {
                status,
                message,
            }) => UploadOutcome::Rejected(Rejection {
                status,
                message,
            }),
            Err(err) => return Err(err.into()),
        };
        self.client.emit(HarnessEventKind::UploadOutcome {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            content_type: payload.content_type.clone(),
            size_bytes: payload.len(),
            accepted: outcome.is_accepted(),
            status: outcome.status(),
        });
        Ok(outcome)
    }

    /// Uploads every key concurrently with the same payload.
    ///
    /// # Errors
    ///
    /// Returns the first [`DriverError`] in submission order; outcomes of
    /// the other writes are discarded in that case.
    pub async fn upload_burst(
        &self,
        keys: &[String],
        payload: &UploadPayload,
    ) -> Result<BatchOutcome, DriverError> {
        let mut tasks = JoinSet::new();
        for (index, key) in keys.iter().enumerate() {
            let driver = self.clone();
            let key = key.clone();
            let payload = payload.clone();
            tasks.spawn(async move { (index, driver.upload(&key, &payload).await) });
        }

        let mut slots: Vec<Option<Result<UploadOutcome, DriverError>>> =
            (0 .. keys.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|err| DriverError::Join(err.to_string()))?;
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }

        let mut outcomes = Vec::with_capacity(keys.len());
        for slot in slots {
            match slot {
                Some(result) => outcomes.push(result?),
                None => return Err(DriverError::Join("upload task produced no result".to_string())),
            }
        }
        Ok(BatchOutcome {
            outcomes,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
