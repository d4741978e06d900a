// crates/storage-policy-harness/src/platform/storage.rs
// ============================================================================
// Module: Platform Storage API
// Description: Object upload, removal, listing, and bucket lookup.
// Purpose: Provide the storage surface the policy suite writes against.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! Uploads go out under the current session and are never retried, since a
//! retried write would count twice against the platform's rate window.
//! Removal, listing, and bucket lookup are housekeeping calls.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use url::Url;

use super::Authority;
use super::PlatformClient;
use super::PlatformError;
use super::RequestSpec;
use crate::policy::UploadPayload;

/// Listing page size.
const LIST_PAGE_LIMIT: u32 = 1000;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Metadata returned for an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredObject {
    /// `<bucket>/<key>` as reported by the platform.
    #[serde(rename = "Key")]
    pub key: String,
    /// Object id when the platform reports one.
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}

/// Entry returned by a listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectEntry {
    /// Name relative to the listed prefix.
    pub name: String,
    /// Object id; absent for folder placeholders.
    #[serde(default)]
    pub id: Option<String>,
    /// Object metadata; absent for folder placeholders.
    #[serde(default)]
    pub metadata: Option<Value>,
}

// ============================================================================
// SECTION: Client Methods
// ============================================================================

impl PlatformClient {
    /// Uploads an object under the current session.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Status`] when the platform refuses the write
    /// and other variants when no usable answer arrived.
    pub async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        payload: &UploadPayload,
    ) -> Result<StoredObject, PlatformError> {
        let url = self.object_url(bucket, key)?;
        let spec = RequestSpec::new(Method::POST, url, Authority::Session)
            .header("x-upsert", "false")
            .raw(&payload.content_type, payload.body.clone())
            .no_retry();
        self.execute_json(spec).await
    }

    /// Removes objects by key.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses or is unreachable.
    pub async fn remove_objects(
        &self,
        authority: Authority,
        bucket: &str,
        keys: &[String],
    ) -> Result<(), PlatformError> {
        if keys.is_empty() {
            return Ok(());
        }
        let url = self.endpoint(&format!("/storage/v1/object/{bucket}"))?;
        let spec =
            RequestSpec::new(Method::DELETE, url, authority).json(json!({ "prefixes": keys }));
        self.execute_ok(spec).await.map(|_| ())
    }

    /// Lists objects directly under a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses or is unreachable.
    pub async fn list_objects(
        &self,
        authority: Authority,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectEntry>, PlatformError> {
        let url = self.endpoint(&format!("/storage/v1/object/list/{bucket}"))?;
        let spec = RequestSpec::new(Method::POST, url, authority).json(json!({
            "prefix": prefix,
            "limit": LIST_PAGE_LIMIT,
            "offset": 0,
        }));
        self.execute_json(spec).await
    }

    /// Returns true when the bucket exists, using service-role credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] for transport failures and for refusals other
    /// than not-found.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, PlatformError> {
        let url = self.endpoint(&format!("/storage/v1/bucket/{bucket}"))?;
        let spec = RequestSpec::new(Method::GET, url, Authority::Service);
        match self.execute_ok(spec).await {
            Ok(_) => Ok(true),
            Err(PlatformError::Status {
                status: 400 | 404,
                ..
            }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Builds the upload URL, encoding each key segment.
    fn object_url(&self, bucket: &str, key: &str) -> Result<Url, PlatformError> {
        let mut url = self.endpoint(&format!("/storage/v1/object/{bucket}"))?;
        url.path_segments_mut()
            .map_err(|()| PlatformError::Request("base url cannot carry a path".to_string()))?
            .extend(key.split('/'));
        Ok(url)
    }
}
