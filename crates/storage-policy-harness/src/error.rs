// crates/storage-policy-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Top-level error for a conformance run.
// Purpose: Separate harness failures from policy verdicts.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`HarnessError`] means the run could not reach a verdict: configuration
//! was missing, fixtures could not be provisioned, a sign-in failed, or the
//! platform was unreachable. A policy that misbehaves is a failed verdict in
//! the suite report, never a [`HarnessError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::config::ConfigError;
use crate::driver::DriverError;
use crate::fixtures::FixtureError;
use crate::platform::PlatformError;
use crate::roles::RoleError;
use crate::session::SessionError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Conformance run errors.
///
/// # Invariants
/// - Variants wrap the component error unchanged; display text is the
///   component's own message.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A platform call failed outside any fixture or driver step.
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// A scenario actor could not be signed in.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Fixture provisioning failed; partial fixtures were torn down.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    /// A role change failed.
    #[error(transparent)]
    Role(#[from] RoleError),
    /// An upload produced no policy outcome.
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// The target bucket does not exist on the platform.
    #[error("storage bucket {0} does not exist")]
    BucketMissing(String),
}
