// system-tests/src/lib.rs
// ============================================================================
// Module: Storage Policy System Tests Library
// Description: Shared configuration for storage policy system-test binaries.
// Purpose: Keep env parsing for test runs in one typed place.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts configuration shared by the system-test binaries in
//! `system-tests/tests`. The suites themselves run the storage policy
//! harness against an in-process platform stub or, behind the
//! `live-platform` feature, against a configured hosted platform.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
