// crates/storage-policy-harness/src/platform/auth.rs
// ============================================================================
// Module: Platform Auth API
// Description: Administrative identity management and password sign-in.
// Purpose: Create, delete, and authenticate fixture identities.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Administrative calls use service-role credentials and bypass email
//! confirmation. Password sign-in uses the anonymous key and returns a
//! [`SessionToken`] without installing it; installing is the session
//! switcher's job.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::Authority;
use super::PlatformClient;
use super::PlatformError;
use super::RequestSpec;

// ============================================================================
// SECTION: Types
// ============================================================================

/// User record returned by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    /// User id (UUID).
    pub id: String,
    /// User email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Access token for a signed-in identity.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Bearer token.
    pub access_token: String,
    /// Id of the signed-in user.
    pub user_id: String,
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Password grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Bearer token.
    access_token: String,
    /// Signed-in user.
    user: AuthUser,
}

// ============================================================================
// SECTION: Client Methods
// ============================================================================

impl PlatformClient {
    /// Creates a confirmed user with service-role credentials.
    ///
    /// Sent without retries; a create whose reply timed out may still exist.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses or is unreachable.
    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, PlatformError> {
        let url = self.endpoint("/auth/v1/admin/users")?;
        let spec = RequestSpec::new(Method::POST, url, Authority::Service)
            .json(json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .no_retry();
        self.execute_json(spec).await
    }

    /// Deletes a user with service-role credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses or is unreachable.
    pub async fn admin_delete_user(&self, user_id: &str) -> Result<(), PlatformError> {
        let url = self.endpoint(&format!("/auth/v1/admin/users/{user_id}"))?;
        let spec = RequestSpec::new(Method::DELETE, url, Authority::Service);
        self.execute_ok(spec).await.map(|_| ())
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Status`] for rejected credentials and other
    /// variants for transport or decode failures.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, PlatformError> {
        let url = self.endpoint("/auth/v1/token?grant_type=password")?;
        let spec = RequestSpec::new(Method::POST, url, Authority::Anonymous).json(json!({
            "email": email,
            "password": password,
        }));
        let response: TokenResponse = self.execute_json(spec).await?;
        Ok(SessionToken {
            access_token: response.access_token,
            user_id: response.user.id,
        })
    }
}
