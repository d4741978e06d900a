// crates/storage-policy-harness/src/oracle.rs
// ============================================================================
// Module: Outcome Oracle
// Description: Compares observed write outcomes with expectations.
// Purpose: Produce pass/fail verdicts with a readable explanation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The oracle only looks at accept versus reject. A refusal with any status
//! satisfies a rejection expectation; status codes appear in the verdict
//! detail for diagnosis but never change the verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::driver::BatchOutcome;
use crate::driver::UploadOutcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Expected outcome of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The single write is accepted.
    Accepted,
    /// The single write is refused.
    Rejected,
    /// At least one write in the batch is refused.
    AnyRejected,
    /// Every write in the batch is accepted.
    AllAccepted,
}

impl Expectation {
    /// Returns a stable label for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::AnyRejected => "any_rejected",
            Self::AllAccepted => "all_accepted",
        }
    }
}

/// What the driver observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// One write.
    Single(UploadOutcome),
    /// A concurrent batch.
    Batch(BatchOutcome),
}

/// Result of comparing an observation with an expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// True when the observation satisfied the expectation.
    pub passed: bool,
    /// Expected versus observed, in words.
    pub detail: String,
}

// ============================================================================
// SECTION: Judgement
// ============================================================================

/// Judges an observation against an expectation.
///
/// A single-write expectation applied to a batch judges every write; a batch
/// expectation applied to a single write treats it as a batch of one.
#[must_use]
pub fn judge(expectation: Expectation, observation: &Observation) -> Verdict {
    let outcomes: &[UploadOutcome] = match observation {
        Observation::Single(outcome) => std::slice::from_ref(outcome),
        Observation::Batch(batch) => &batch.outcomes,
    };
    let accepted = outcomes.iter().filter(|outcome| outcome.is_accepted()).count();
    let rejected = outcomes.len() - accepted;
    let passed = match expectation {
        Expectation::Accepted | Expectation::AllAccepted => {
            !outcomes.is_empty() && rejected == 0
        }
        Expectation::Rejected => !outcomes.is_empty() && accepted == 0,
        Expectation::AnyRejected => rejected > 0,
    };
    Verdict {
        passed,
        detail: format!("expected {}, observed {}", expectation.as_str(), describe(outcomes)),
    }
}

/// Summarizes outcomes for a verdict detail.
fn describe(outcomes: &[UploadOutcome]) -> String {
    match outcomes {
        [] => "no writes".to_string(),
        [UploadOutcome::Accepted(_)] => "accepted".to_string(),
        [UploadOutcome::Rejected(rejection)] => {
            format!("rejected ({}: {})", rejection.status, rejection.message)
        }
        _ => {
            let accepted = outcomes.iter().filter(|outcome| outcome.is_accepted()).count();
            let mut statuses: Vec<u16> =
                outcomes.iter().filter_map(UploadOutcome::status).collect();
            statuses.sort_unstable();
            statuses.dedup();
            let statuses =
                statuses.iter().map(u16::to_string).collect::<Vec<_>>().join(",");
            format!(
                "{accepted} accepted, {} rejected{}",
                outcomes.len() - accepted,
                if statuses.is_empty() { String::new() } else { format!(" (status {statuses})") }
            )
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
