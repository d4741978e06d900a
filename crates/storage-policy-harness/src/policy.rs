// crates/storage-policy-harness/src/policy.rs
// ============================================================================
// Module: Policy Constants
// Description: Named limits and payload shapes for the storage policy surface.
// Purpose: Pin the timing and size assumptions the suite depends on.
// Dependencies: bytes
// ============================================================================

//! ## Overview
//! The platform enforces a per-identity upload cap over a fixed window, a
//! size cap, an image-only content-type allowlist, and a flat
//! `<prefix>_<number>/<filename>` key shape. The harness never enforces any
//! of these; it only needs to know them to build inputs that land on either
//! side of each rule and to wait out the rate window.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use bytes::Bytes;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Storage bucket holding resource images.
pub const DEFAULT_BUCKET: &str = "van_images";

/// Namespace prefix joined to the resource number with `_`.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "van";

/// Resource number assigned to the regular identity.
pub const DEFAULT_OWNED_RESOURCE: &str = "999";

/// Resource number the regular identity is never assigned.
pub const DEFAULT_UNOWNED_RESOURCE: &str = "888";

/// Largest object the platform accepts, in bytes.
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 10 * 1024 * 1024;

/// Amount by which the oversized payload exceeds the size cap.
pub const OVERSIZE_MARGIN_BYTES: usize = 1024 * 1024;

/// Uploads allowed per identity within one window.
pub const DEFAULT_UPLOAD_CAP: u32 = 10;

/// Length of the platform's upload-count window.
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Extra wait past the window before expecting the count to reset.
pub const RESET_MARGIN: Duration = Duration::from_secs(1);

/// Content types the platform accepts in the default profile.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/heic"];

/// Content type the platform must refuse.
pub const DEFAULT_DISALLOWED_CONTENT_TYPE: &str = "application/pdf";

/// Domain used for generated fixture identities.
pub const DEFAULT_IDENTITY_EMAIL_DOMAIN: &str = "example.com";

/// Body used for small payloads.
const SMALL_PAYLOAD: &[u8] = b"test";

// ============================================================================
// SECTION: Rate Limit Policy
// ============================================================================

/// Upload cap and window the platform applies per identity.
///
/// # Invariants
/// - `upload_cap` and `window` are non-zero once validated by the profile loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Uploads allowed within one window.
    pub upload_cap: u32,
    /// Length of the window.
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Creates a policy with the given cap and window.
    #[must_use]
    pub const fn new(upload_cap: u32, window: Duration) -> Self {
        Self {
            upload_cap,
            window,
        }
    }

    /// Number of concurrent writes that must trip the cap.
    #[must_use]
    pub const fn burst_size(&self) -> u32 {
        self.upload_cap.saturating_add(1)
    }

    /// Time to wait before the window is guaranteed to have elapsed.
    #[must_use]
    pub fn reset_wait(&self) -> Duration {
        self.window.saturating_add(RESET_MARGIN)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_CAP, DEFAULT_RATE_WINDOW)
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Content type and body of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    /// MIME type sent as `Content-Type`.
    pub content_type: String,
    /// Object body.
    pub body: Bytes,
}

impl UploadPayload {
    /// Creates a payload from raw parts.
    #[must_use]
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// A four-byte payload of the given type.
    #[must_use]
    pub fn small(content_type: &str) -> Self {
        Self::new(content_type, Bytes::from_static(SMALL_PAYLOAD))
    }

    /// A zero-filled payload one margin larger than `max_object_bytes`.
    #[must_use]
    pub fn oversized(content_type: &str, max_object_bytes: usize) -> Self {
        let len = max_object_bytes.saturating_add(OVERSIZE_MARGIN_BYTES);
        Self::new(content_type, vec![0_u8; len])
    }

    /// Body length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
