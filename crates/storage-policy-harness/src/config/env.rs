// crates/storage-policy-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for platform access.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std, url, thiserror
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. All required variables are
//! checked before any error is returned so a single run reports every gap.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use super::profile::PolicyProfile;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Request timeout used when no override is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Platform base URL (required).
    Url,
    /// Anonymous/public key (required unless [`HarnessEnv::LegacyKey`] is set).
    AnonKey,
    /// Legacy name for the anonymous key.
    ///
    /// Read only when [`HarnessEnv::AnonKey`] is unset or empty; when both are
    /// set, `SUPABASE_ANON_KEY` wins. Older setups that preferred
    /// `SUPABASE_KEY` must unset the newer name.
    LegacyKey,
    /// Service-role key (required).
    ServiceRoleKey,
    /// Optional request timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional path to a TOML policy profile.
    ProfilePath,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Url => "SUPABASE_URL",
            Self::AnonKey => "SUPABASE_ANON_KEY",
            Self::LegacyKey => "SUPABASE_KEY",
            Self::ServiceRoleKey => "SUPABASE_SERVICE_ROLE_KEY",
            Self::TimeoutSeconds => "STORAGE_POLICY_TIMEOUT_SEC",
            Self::ProfilePath => "STORAGE_POLICY_PROFILE",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Messages name variables, never their values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required variables are absent.
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    /// A variable is present but unusable.
    #[error("{name} {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The policy profile could not be read or parsed.
    #[error("policy profile {path}: {reason}")]
    Profile {
        /// Profile path as given.
        path: String,
        /// Read, parse, or validation failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration.
///
/// # Invariants
/// - `base_url` uses `http` or `https`.
/// - Keys are non-empty and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Platform base URL.
    pub base_url: Url,
    /// Anonymous/public key.
    pub anon_key: String,
    /// Service-role key.
    pub service_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional policy profile path.
    pub profile_path: Option<PathBuf>,
}

impl std::fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("base_url", &self.base_url.as_str())
            .field("anon_key", &"<redacted>")
            .field("service_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("profile_path", &self.profile_path)
            .finish()
    }
}

impl HarnessConfig {
    /// Builds a configuration for an explicit endpoint.
    #[must_use]
    pub fn new(base_url: Url, anon_key: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url,
            anon_key: anon_key.into(),
            service_key: service_key.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            profile_path: None,
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] listing every absent required variable,
    /// or [`ConfigError::Invalid`] when a value is empty, not UTF-8, or fails
    /// validation.
    pub fn load() -> Result<Self, ConfigError> {
        let url = read_env_nonempty(HarnessEnv::Url.as_str())?;
        let anon_key = match read_env_nonempty(HarnessEnv::AnonKey.as_str())? {
            Some(value) => Some(value),
            None => read_env_nonempty(HarnessEnv::LegacyKey.as_str())?,
        };
        let service_key = read_env_nonempty(HarnessEnv::ServiceRoleKey.as_str())?;

        let mut missing = Vec::new();
        if url.is_none() {
            missing.push(HarnessEnv::Url.as_str());
        }
        if anon_key.is_none() {
            missing.push(HarnessEnv::AnonKey.as_str());
        }
        if service_key.is_none() {
            missing.push(HarnessEnv::ServiceRoleKey.as_str());
        }
        let (Some(url), Some(anon_key), Some(service_key)) = (url, anon_key, service_key) else {
            return Err(ConfigError::Missing(missing));
        };

        let base_url = parse_base_url(HarnessEnv::Url.as_str(), &url)?;
        let timeout = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let profile_path =
            read_env_nonempty(HarnessEnv::ProfilePath.as_str())?.map(PathBuf::from);

        Ok(Self {
            base_url,
            anon_key,
            service_key,
            timeout,
            profile_path,
        })
    }

    /// Loads the policy profile named by the configuration, or the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Profile`] when the file cannot be read or fails
    /// validation.
    pub fn load_profile(&self) -> Result<PolicyProfile, ConfigError> {
        self.profile_path.as_deref().map_or_else(|| Ok(PolicyProfile::default()), PolicyProfile::load)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &'static str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::Invalid {
            name,
            reason: "must be valid UTF-8".to_string(),
        })
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &'static str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Invalid {
            name,
            reason: "must not be empty".to_string(),
        }),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses the platform base URL.
///
/// # Errors
///
/// Returns an error when the value is not an absolute `http`/`https` URL.
fn parse_base_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::Invalid {
        name,
        reason: format!("must be an absolute URL: {err}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            name,
            reason: "must use http or https".to_string(),
        });
    }
    Ok(url)
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: "must be a positive integer number of seconds".to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
