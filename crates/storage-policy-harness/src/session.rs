// crates/storage-policy-harness/src/session.rs
// ============================================================================
// Module: Session Switcher
// Description: Authenticates the shared client as a fixture identity.
// Purpose: Keep sign-in failures distinct from upload rejections.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every storage write is issued under whichever session the client holds.
//! [`SessionSwitcher::sign_in`] replaces that session; a failure leaves the
//! client signed out and surfaces as [`SessionError`], which callers treat as
//! a harness failure rather than a policy outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::events::HarnessEventKind;
use crate::events::StepOutcome;
use crate::platform::PlatformClient;
use crate::platform::PlatformError;
use crate::platform::SessionToken;

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Role a fixture identity was provisioned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRole {
    /// First elevated identity, provisioned directly with service credentials.
    Bootstrap,
    /// Identity elevated through the promotion procedure.
    Elevated,
    /// Identity with a driver profile and one ownership assignment.
    Regular,
}

impl IdentityRole {
    /// Returns a stable label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Elevated => "elevated",
            Self::Regular => "regular",
        }
    }
}

/// Credentials and id of a provisioned identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Platform user id.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
    /// Provisioned role.
    pub role: IdentityRole,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session switching errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The platform refused the credentials or could not be reached.
    #[error("sign-in as {email} failed: {source}")]
    SignIn {
        /// Identity email.
        email: String,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
    },
    /// The platform signed in a different user than requested.
    #[error("sign-in as {email} returned user {actual}, expected {expected}")]
    IdentityMismatch {
        /// Identity email.
        email: String,
        /// Expected user id.
        expected: String,
        /// User id in the session.
        actual: String,
    },
}

// ============================================================================
// SECTION: Switcher
// ============================================================================

/// Installs identity sessions on a shared client.
#[derive(Debug, Clone)]
pub struct SessionSwitcher {
    /// Shared platform client.
    client: PlatformClient,
}

impl SessionSwitcher {
    /// Creates a switcher for the client.
    #[must_use]
    pub const fn new(client: PlatformClient) -> Self {
        Self {
            client,
        }
    }

    /// Signs in as `identity` and installs the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when sign-in fails or yields another user. The
    /// client is left signed out in both cases.
    pub async fn sign_in(&self, identity: &Identity) -> Result<(), SessionError> {
        self.client.set_session(None);
        let result = self
            .client
            .sign_in_with_password(&identity.email, &identity.password)
            .await
            .map_err(|source| SessionError::SignIn {
                email: identity.email.clone(),
                source,
            })
            .and_then(|token| check_identity(identity, token));
        match result {
            Ok(token) => {
                self.client.set_session(Some(token));
                self.emit(identity, StepOutcome::Ok, None);
                Ok(())
            }
            Err(err) => {
                self.emit(identity, StepOutcome::Error, Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Drops the current session; later calls use the anonymous key.
    pub fn sign_out(&self) {
        self.client.set_session(None);
    }

    /// Id of the signed-in user, if any.
    #[must_use]
    pub fn current_user_id(&self) -> Option<String> {
        self.client.session_user_id()
    }

    /// Reports a session switch.
    fn emit(&self, identity: &Identity, outcome: StepOutcome, error: Option<String>) {
        self.client.emit(HarnessEventKind::SessionSwitch {
            email: identity.email.clone(),
            role: identity.role.as_str(),
            outcome,
            error,
        });
    }
}

/// Confirms the token belongs to the requested identity.
fn check_identity(identity: &Identity, token: SessionToken) -> Result<SessionToken, SessionError> {
    if token.user_id == identity.id {
        Ok(token)
    } else {
        Err(SessionError::IdentityMismatch {
            email: identity.email.clone(),
            expected: identity.id.clone(),
            actual: token.user_id,
        })
    }
}
