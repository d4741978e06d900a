// system-tests/src/config.rs
// ============================================================================
// Module: System Test Configuration
// Description: Run-root, timeout, and stub-timing settings for system tests.
// Purpose: Parse test-run knobs once, failing closed on malformed values.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every knob is optional. A knob that is set must be valid UTF-8 and
//! non-blank; numeric knobs must be positive integers. Parsing goes through a
//! lookup function so the rules can be checked without touching the process
//! environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Knobs
// ============================================================================

/// Environment knobs read by the system tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Artifact root; each test writes under `<root>/<test name>`.
    RunRoot,
    /// Timeout floor in seconds applied to every suite deadline.
    TimeoutSeconds,
    /// Rate window the platform stub enforces, in milliseconds.
    StubWindowMillis,
}

impl SystemTestEnv {
    /// Every knob, in load order.
    pub const ALL: [Self; 3] = [Self::RunRoot, Self::TimeoutSeconds, Self::StubWindowMillis];

    /// Variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "STORAGE_POLICY_RUN_ROOT",
            Self::TimeoutSeconds => "STORAGE_POLICY_SYSTEM_TEST_TIMEOUT_SEC",
            Self::StubWindowMillis => "STORAGE_POLICY_STUB_WINDOW_MS",
        }
    }
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Parsed system-test knobs. `None` means "use the suite default".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Artifact root override.
    pub run_root: Option<PathBuf>,
    /// Timeout floor.
    pub timeout: Option<Duration>,
    /// Stub rate window.
    pub stub_window: Option<Duration>,
}

impl SystemTestConfig {
    /// Reads the knobs from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first malformed knob, naming its variable.
    pub fn load() -> Result<Self, String> {
        Self::from_lookup(read_env_strict)
    }

    /// Reads the knobs through `lookup`, which maps a variable name to its
    /// raw value.
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure or malformed knob.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<Option<String>, String>,
    ) -> Result<Self, String> {
        let knob = |env: SystemTestEnv| -> Result<Option<String>, String> {
            let name = env.as_str();
            match lookup(name)? {
                Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
                other => Ok(other),
            }
        };
        let positive = |env: SystemTestEnv| -> Result<Option<u64>, String> {
            knob(env)?.map(|raw| parse_positive(env.as_str(), &raw)).transpose()
        };
        Ok(Self {
            run_root: knob(SystemTestEnv::RunRoot)?.map(PathBuf::from),
            timeout: positive(SystemTestEnv::TimeoutSeconds)?.map(Duration::from_secs),
            stub_window: positive(SystemTestEnv::StubWindowMillis)?.map(Duration::from_millis),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a variable, rejecting values that are not UTF-8.
///
/// # Errors
///
/// Returns an error naming the variable when its value is not UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Parses a positive integer knob.
fn parse_positive(name: &str, raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(format!("{name} must be greater than zero")),
        Ok(value) => Ok(value),
        Err(_) => Err(format!("{name} must be a positive integer, got {raw:?}")),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
