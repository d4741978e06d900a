// crates/storage-policy-harness/src/roles.rs
// ============================================================================
// Module: Role Elevation
// Description: Grants and revokes the elevated role.
// Purpose: Exercise the platform's own promotion procedures.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Elevation is recorded as a row in the membership table. The first
//! elevated identity cannot be promoted through the procedure (nobody is
//! elevated yet), so it is bootstrapped by a direct service-role insert.
//! Every later grant goes through `promote_to_admin` under an elevated
//! session, which is the path the platform's policies govern.
//!
//! Invariants:
//! - [`RoleElevation::promote`] and [`RoleElevation::demote`] require a
//!   signed-in session and never fall back to service credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::platform::Authority;
use crate::platform::PlatformClient;
use crate::platform::PlatformError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Procedure granting the elevated role.
pub const PROMOTE_FUNCTION: &str = "promote_to_admin";
/// Procedure revoking the elevated role.
pub const DEMOTE_FUNCTION: &str = "demote_from_admin";
/// Table recording elevated identities.
pub const MEMBERSHIP_TABLE: &str = "admin_users";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Role change errors.
#[derive(Debug, Error)]
pub enum RoleError {
    /// A procedure call was attempted without a signed-in session.
    #[error("{function} requires a signed-in session")]
    NoSession {
        /// Procedure name.
        function: &'static str,
    },
    /// The procedure call failed or was refused.
    #[error("{function} for {user_id} failed: {source}")]
    Rpc {
        /// Procedure name.
        function: &'static str,
        /// Target user id.
        user_id: String,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
    },
    /// A direct membership row change failed.
    #[error("membership change for {user_id} failed: {source}")]
    Membership {
        /// Target user id.
        user_id: String,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Membership row written during bootstrap.
#[derive(Debug, Serialize)]
struct MembershipRow<'a> {
    /// Elevated user id.
    id: &'a str,
    /// Granting user id.
    created_by: &'a str,
}

/// Membership row as returned by the row API.
#[derive(Debug, Deserialize)]
struct StoredMembership {
    /// Elevated user id.
    id: String,
}

/// Role elevation operations on a shared client.
#[derive(Debug, Clone)]
pub struct RoleElevation {
    /// Shared platform client.
    client: PlatformClient,
}

impl RoleElevation {
    /// Creates role operations for the client.
    #[must_use]
    pub const fn new(client: PlatformClient) -> Self {
        Self {
            client,
        }
    }

    /// Records `user_id` as elevated with service credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::Membership`] when the insert fails.
    pub async fn bootstrap(&self, user_id: &str) -> Result<(), RoleError> {
        let row = MembershipRow {
            id: user_id,
            created_by: user_id,
        };
        self.client
            .insert_row::<_, StoredMembership>(Authority::Service, MEMBERSHIP_TABLE, &row)
            .await
            .map(|_| ())
            .map_err(|source| RoleError::Membership {
                user_id: user_id.to_string(),
                source,
            })
    }

    /// Removes the bootstrap membership row with service credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::Membership`] when the delete fails.
    pub async fn revoke_bootstrap(&self, user_id: &str) -> Result<(), RoleError> {
        self.client.delete_eq(Authority::Service, MEMBERSHIP_TABLE, "id", user_id).await.map_err(
            |source| RoleError::Membership {
                user_id: user_id.to_string(),
                source,
            },
        )
    }

    /// Returns true when `user_id` holds a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::Membership`] when the lookup fails.
    pub async fn is_elevated(&self, user_id: &str) -> Result<bool, RoleError> {
        self.client
            .select_eq::<StoredMembership>(Authority::Service, MEMBERSHIP_TABLE, "id", user_id)
            .await
            .map(|rows| rows.iter().any(|row| row.id == user_id))
            .map_err(|source| RoleError::Membership {
                user_id: user_id.to_string(),
                source,
            })
    }

    /// Grants the elevated role to `user_id` under the current session.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::NoSession`] when signed out and
    /// [`RoleError::Rpc`] when the platform refuses.
    pub async fn promote(&self, user_id: &str) -> Result<(), RoleError> {
        self.call_under_session(PROMOTE_FUNCTION, user_id).await
    }

    /// Revokes the elevated role from `user_id` under the current session.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::NoSession`] when signed out and
    /// [`RoleError::Rpc`] when the platform refuses.
    pub async fn demote(&self, user_id: &str) -> Result<(), RoleError> {
        self.call_under_session(DEMOTE_FUNCTION, user_id).await
    }

    /// Revokes the elevated role with service credentials, for teardown.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError::Rpc`] when the platform refuses.
    pub async fn demote_with_service(&self, user_id: &str) -> Result<(), RoleError> {
        self.call(Authority::Service, DEMOTE_FUNCTION, user_id).await
    }

    /// Calls a role procedure, requiring a session.
    async fn call_under_session(
        &self,
        function: &'static str,
        user_id: &str,
    ) -> Result<(), RoleError> {
        if self.client.session_user_id().is_none() {
            return Err(RoleError::NoSession {
                function,
            });
        }
        self.call(Authority::Session, function, user_id).await
    }

    /// Calls a role procedure with the given authority.
    async fn call(
        &self,
        authority: Authority,
        function: &'static str,
        user_id: &str,
    ) -> Result<(), RoleError> {
        self.client
            .rpc(authority, function, json!({ "user_id": user_id }))
            .await
            .map(|_: Value| ())
            .map_err(|source| RoleError::Rpc {
                function,
                user_id: user_id.to_string(),
                source,
            })
    }
}
