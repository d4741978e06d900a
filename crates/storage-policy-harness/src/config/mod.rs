// crates/storage-policy-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for the storage policy harness.
// Purpose: Provide typed access to platform credentials and policy profiles.
// Dependencies: toml, url, thiserror
// ============================================================================

//! ## Overview
//! Platform credentials are read from environment variables and mapped into
//! a typed [`HarnessConfig`]. Non-secret policy tuning lives in an optional
//! TOML [`PolicyProfile`].
//! Security posture: environment inputs are untrusted and keys are redacted
//! from debug output.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod profile;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConfigError;
pub use env::DEFAULT_REQUEST_TIMEOUT;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::read_env_strict;
pub use profile::PolicyProfile;
