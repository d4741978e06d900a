// crates/storage-policy-harness/src/lib.rs
// ============================================================================
// Module: Storage Policy Harness Library
// Description: Black-box conformance harness for hosted storage policies.
// Purpose: Provision fixtures, switch sessions, drive uploads, judge outcomes.
// Dependencies: reqwest, serde, tokio, thiserror, toml, url
// ============================================================================

//! ## Overview
//! The harness drives a hosted backend platform (auth, row API, object
//! storage) through a fixed set of storage writes and checks that each write
//! is accepted or rejected the way the platform's policies promise.
//! Nothing here enforces policy. Every rule under test lives on the platform;
//! the harness only provisions fixtures, authenticates, uploads, and compares
//! accept/reject against an [`Expectation`].
//!
//! Invariants:
//! - Policy rejections are values ([`UploadOutcome::Rejected`]), never errors.
//! - Fixture setup fails fast; fixture teardown logs and never escalates.
//! - Secrets (keys, passwords, tokens) never appear in events or transcripts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod fixtures;
pub mod oracle;
pub mod platform;
pub mod policy;
pub mod roles;
pub mod session;
pub mod suite;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::HarnessConfig;
pub use config::HarnessEnv;
pub use config::PolicyProfile;
pub use driver::BatchOutcome;
pub use driver::DriverError;
pub use driver::OperationDriver;
pub use driver::Rejection;
pub use driver::UploadLedger;
pub use driver::UploadOutcome;
pub use error::HarnessError;
pub use events::HarnessEvent;
pub use events::HarnessEventKind;
pub use events::HarnessEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use events::StepOutcome;
pub use fixtures::FixtureContext;
pub use fixtures::FixtureError;
pub use fixtures::FixtureProvisioner;
pub use fixtures::FixtureStep;
pub use fixtures::ResourceRecord;
pub use fixtures::TeardownEntry;
pub use fixtures::TeardownReport;
pub use fixtures::TeardownStep;
pub use oracle::Expectation;
pub use oracle::Observation;
pub use oracle::Verdict;
pub use platform::Authority;
pub use platform::PlatformClient;
pub use platform::PlatformError;
pub use platform::TranscriptEntry;
pub use policy::RateLimitPolicy;
pub use policy::UploadPayload;
pub use roles::RoleElevation;
pub use roles::RoleError;
pub use session::Identity;
pub use session::IdentityRole;
pub use session::SessionError;
pub use session::SessionSwitcher;
pub use suite::Actor;
pub use suite::ConformanceSuite;
pub use suite::ScenarioReport;
pub use suite::SuiteReport;
