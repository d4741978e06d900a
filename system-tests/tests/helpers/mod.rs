// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for storage policy system-tests.
// Purpose: Provide the platform stub, harness wiring, and artifact utilities.
// Dependencies: system-tests, storage-policy-harness, axum
// ============================================================================

//! ## Overview
//! Shared helpers for storage policy system-tests.
//! Invariants:
//! - Stub-backed suites never touch a hosted platform.
//! - Every suite writes a summary even when it panics.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod harness;
