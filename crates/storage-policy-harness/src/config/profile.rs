// crates/storage-policy-harness/src/config/profile.rs
// ============================================================================
// Module: Policy Profile
// Description: Non-secret description of the storage policy under test.
// Purpose: Let one harness target buckets and limits beyond the defaults.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! A [`PolicyProfile`] names the bucket, the namespace shape, the resources
//! used for ownership checks, and the limits the platform is expected to
//! enforce. Defaults mirror the production policy; a TOML file can override
//! any field. Unknown keys are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::env::ConfigError;
use crate::policy::DEFAULT_ALLOWED_CONTENT_TYPES;
use crate::policy::DEFAULT_BUCKET;
use crate::policy::DEFAULT_DISALLOWED_CONTENT_TYPE;
use crate::policy::DEFAULT_IDENTITY_EMAIL_DOMAIN;
use crate::policy::DEFAULT_MAX_OBJECT_BYTES;
use crate::policy::DEFAULT_NAMESPACE_PREFIX;
use crate::policy::DEFAULT_OWNED_RESOURCE;
use crate::policy::DEFAULT_UNOWNED_RESOURCE;
use crate::policy::RateLimitPolicy;

// ============================================================================
// SECTION: Profile
// ============================================================================

/// Storage policy surface the harness exercises.
///
/// # Invariants
/// - `owned_resource` and `unowned_resource` are distinct ASCII digit strings.
/// - `namespace_prefix` is non-empty and contains no `/`.
/// - `allowed_content_types` is non-empty and excludes `disallowed_content_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyProfile {
    /// Storage bucket under test.
    pub bucket: String,
    /// Namespace prefix, joined to a resource number with `_`.
    pub namespace_prefix: String,
    /// Resource number assigned to the regular identity.
    pub owned_resource: String,
    /// Resource number the regular identity is never assigned.
    pub unowned_resource: String,
    /// Size cap in bytes.
    pub max_object_bytes: usize,
    /// Content types the platform accepts. The first is used for positive cases.
    pub allowed_content_types: Vec<String>,
    /// Content type the platform must refuse.
    pub disallowed_content_type: String,
    /// Per-identity upload cap and window.
    pub rate_limit: RateLimitPolicy,
    /// Domain for generated identity emails.
    pub identity_email_domain: String,
}

impl Default for PolicyProfile {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            owned_resource: DEFAULT_OWNED_RESOURCE.to_string(),
            unowned_resource: DEFAULT_UNOWNED_RESOURCE.to_string(),
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|value| (*value).to_string())
                .collect(),
            disallowed_content_type: DEFAULT_DISALLOWED_CONTENT_TYPE.to_string(),
            rate_limit: RateLimitPolicy::default(),
            identity_email_domain: DEFAULT_IDENTITY_EMAIL_DOMAIN.to_string(),
        }
    }
}

impl PolicyProfile {
    /// Replaces the rate-limit policy.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: RateLimitPolicy) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Loads and validates a profile from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Profile`] when the file cannot be read, parsed,
    /// or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Profile {
            path: display.clone(),
            reason: err.to_string(),
        })?;
        Self::from_toml_str(&raw).map_err(|reason| ConfigError::Profile {
            path: display,
            reason,
        })
    }

    /// Parses and validates a profile from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a description of the first parse or validation failure.
    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        let file: ProfileFile = toml::from_str(raw).map_err(|err| err.to_string())?;
        let mut profile = Self::default();
        if let Some(bucket) = file.bucket {
            profile.bucket = bucket;
        }
        if let Some(prefix) = file.namespace_prefix {
            profile.namespace_prefix = prefix;
        }
        if let Some(owned) = file.owned_resource {
            profile.owned_resource = owned;
        }
        if let Some(unowned) = file.unowned_resource {
            profile.unowned_resource = unowned;
        }
        if let Some(max) = file.max_object_bytes {
            profile.max_object_bytes = max;
        }
        if let Some(types) = file.allowed_content_types {
            profile.allowed_content_types = types;
        }
        if let Some(disallowed) = file.disallowed_content_type {
            profile.disallowed_content_type = disallowed;
        }
        if let Some(domain) = file.identity_email_domain {
            profile.identity_email_domain = domain;
        }
        if let Some(rate) = file.rate_limit {
            if let Some(cap) = rate.upload_cap {
                profile.rate_limit.upload_cap = cap;
            }
            if let Some(secs) = rate.window_seconds {
                profile.rate_limit.window = Duration::from_secs(secs);
            }
        }
        profile.validate()?;
        Ok(profile)
    }

    /// Checks the profile invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("bucket must not be empty".to_string());
        }
        if self.namespace_prefix.is_empty() || self.namespace_prefix.contains('/') {
            return Err("namespace_prefix must be non-empty and contain no '/'".to_string());
        }
        if !is_resource_number(&self.owned_resource) {
            return Err("owned_resource must be a non-empty digit string".to_string());
        }
        if !is_resource_number(&self.unowned_resource) {
            return Err("unowned_resource must be a non-empty digit string".to_string());
        }
        if self.owned_resource == self.unowned_resource {
            return Err("owned_resource and unowned_resource must differ".to_string());
        }
        if self.max_object_bytes == 0 {
            return Err("max_object_bytes must be greater than zero".to_string());
        }
        if self.allowed_content_types.is_empty() {
            return Err("allowed_content_types must not be empty".to_string());
        }
        if self.allowed_content_types.contains(&self.disallowed_content_type) {
            return Err("disallowed_content_type must not be in allowed_content_types".to_string());
        }
        if self.rate_limit.upload_cap == 0 {
            return Err("rate_limit.upload_cap must be greater than zero".to_string());
        }
        if self.rate_limit.window.is_zero() {
            return Err("rate_limit.window_seconds must be greater than zero".to_string());
        }
        if self.identity_email_domain.trim().is_empty() || self.identity_email_domain.contains('@') {
            return Err("identity_email_domain must be a bare domain".to_string());
        }
        Ok(())
    }

    /// Content type used for uploads that should pass type validation.
    #[must_use]
    pub fn allowed_content_type(&self) -> &str {
        self.allowed_content_types.first().map_or("image/jpeg", String::as_str)
    }

    /// Namespace segment for a resource number, e.g. `van_999`.
    #[must_use]
    pub fn namespace(&self, resource: &str) -> String {
        format!("{}_{resource}", self.namespace_prefix)
    }

    /// Object key for a file directly under a resource namespace.
    #[must_use]
    pub fn object_key(&self, resource: &str, filename: &str) -> String {
        format!("{}/{filename}", self.namespace(resource))
    }
}

// ============================================================================
// SECTION: File Schema
// ============================================================================

/// TOML representation; every field is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    /// Bucket override.
    bucket: Option<String>,
    /// Namespace prefix override.
    namespace_prefix: Option<String>,
    /// Owned resource override.
    owned_resource: Option<String>,
    /// Unowned resource override.
    unowned_resource: Option<String>,
    /// Size cap override.
    max_object_bytes: Option<usize>,
    /// Allowlist override.
    allowed_content_types: Option<Vec<String>>,
    /// Disallowed type override.
    disallowed_content_type: Option<String>,
    /// Identity email domain override.
    identity_email_domain: Option<String>,
    /// Rate-limit table.
    rate_limit: Option<RateLimitFile>,
}

/// `[rate_limit]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RateLimitFile {
    /// Cap override.
    upload_cap: Option<u32>,
    /// Window override in whole seconds.
    window_seconds: Option<u64>,
}

/// Returns true for a non-empty string of ASCII digits.
fn is_resource_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}
