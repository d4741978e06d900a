// crates/storage-policy-harness/src/fixtures.rs
// ============================================================================
// Module: Fixture Provisioner
// Description: Creates and destroys the identities and records a run needs.
// Purpose: Give every scenario a known ownership graph and clean it up after.
// Dependencies: rand, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Provisioning builds, with service-role credentials, a bootstrap elevated
//! identity, a regular identity with a driver profile, a second elevated
//! identity promoted through the platform's own procedure, one resource
//! record, and an ownership assignment tying the regular identity to it.
//!
//! Invariants:
//! - Every created entity is recorded in the [`FixtureContext`] before the
//!   next step starts, so teardown sees exactly what exists.
//! - A failed step tears down everything created so far, then returns a
//!   [`FixtureError`] naming the step. When that rollback itself fails, the
//!   error carries the failed teardown entries.
//! - Teardown runs in reverse dependency order, skips absent entities, and
//!   reports failures without returning an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::PolicyProfile;
use crate::driver::UploadLedger;
use crate::events::HarnessEventKind;
use crate::events::StepOutcome;
use crate::platform::Authority;
use crate::platform::PlatformClient;
use crate::platform::PlatformError;
use crate::roles::RoleElevation;
use crate::roles::RoleError;
use crate::session::Identity;
use crate::session::IdentityRole;
use crate::session::SessionError;
use crate::session::SessionSwitcher;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Driver profile table.
pub const PROFILE_TABLE: &str = "driver_profiles";
/// Resource record table.
pub const RESOURCE_TABLE: &str = "vans";
/// Ownership assignment table.
pub const ASSIGNMENT_TABLE: &str = "driver_van_assignments";
/// Run tag length.
const RUN_TAG_LEN: usize = 10;
/// Random password length, before the fixed prefix and suffix.
const PASSWORD_LEN: usize = 24;
/// Days until the fixture license expires.
const LICENSE_VALIDITY_DAYS: i64 = 365;

// ============================================================================
// SECTION: Steps
// ============================================================================

/// Provisioning steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureStep {
    /// Create the bootstrap identity.
    CreateBootstrapIdentity,
    /// Record the bootstrap identity as elevated.
    GrantBootstrapMembership,
    /// Create the regular identity.
    CreateRegularIdentity,
    /// Create the regular identity's driver profile.
    CreateDriverProfile,
    /// Create the identity to be promoted.
    CreateElevatedIdentity,
    /// Sign in as the bootstrap identity.
    SignInBootstrap,
    /// Promote through the platform procedure.
    PromoteElevatedIdentity,
    /// Create the owned resource record.
    CreateResourceRecord,
    /// Assign the resource to the regular identity.
    CreateOwnershipAssignment,
}

impl FixtureStep {
    /// Returns a stable label for events and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateBootstrapIdentity => "create_bootstrap_identity",
            Self::GrantBootstrapMembership => "grant_bootstrap_membership",
            Self::CreateRegularIdentity => "create_regular_identity",
            Self::CreateDriverProfile => "create_driver_profile",
            Self::CreateElevatedIdentity => "create_elevated_identity",
            Self::SignInBootstrap => "sign_in_bootstrap",
            Self::PromoteElevatedIdentity => "promote_elevated_identity",
            Self::CreateResourceRecord => "create_resource_record",
            Self::CreateOwnershipAssignment => "create_ownership_assignment",
        }
    }
}

impl fmt::Display for FixtureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Teardown steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownStep {
    /// Remove objects accepted during the run.
    RemoveUploadedObjects,
    /// Delete the ownership assignment.
    DeleteOwnershipAssignment,
    /// Delete the driver profile.
    DeleteDriverProfile,
    /// Delete the regular identity.
    DeleteRegularIdentity,
    /// Delete the resource record.
    DeleteResourceRecord,
    /// Demote the promoted identity.
    DemoteElevatedIdentity,
    /// Delete the promoted identity.
    DeleteElevatedIdentity,
    /// Remove the bootstrap membership row.
    RevokeBootstrapMembership,
    /// Delete the bootstrap identity.
    DeleteBootstrapIdentity,
}

impl TeardownStep {
    /// Returns a stable label for events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemoveUploadedObjects => "remove_uploaded_objects",
            Self::DeleteOwnershipAssignment => "delete_ownership_assignment",
            Self::DeleteDriverProfile => "delete_driver_profile",
            Self::DeleteRegularIdentity => "delete_regular_identity",
            Self::DeleteResourceRecord => "delete_resource_record",
            Self::DemoteElevatedIdentity => "demote_elevated_identity",
            Self::DeleteElevatedIdentity => "delete_elevated_identity",
            Self::RevokeBootstrapMembership => "revoke_bootstrap_membership",
            Self::DeleteBootstrapIdentity => "delete_bootstrap_identity",
        }
    }
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixture provisioning errors.
///
/// # Invariants
/// - Every variant produced by provisioning names the failed step.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A platform call failed.
    #[error("fixture step {step} failed: {source}")]
    Platform {
        /// Failed step.
        step: FixtureStep,
        /// Underlying platform failure.
        #[source]
        source: PlatformError,
    },
    /// Signing in failed.
    #[error("fixture step {step} failed: {source}")]
    Session {
        /// Failed step.
        step: FixtureStep,
        /// Underlying session failure.
        #[source]
        source: SessionError,
    },
    /// A role change failed.
    #[error("fixture step {step} failed: {source}")]
    Role {
        /// Failed step.
        step: FixtureStep,
        /// Underlying role failure.
        #[source]
        source: RoleError,
    },
    /// Provisioning failed and rolling back left fixtures behind.
    #[error("{source}; rollback failed at {}", rollback_steps(.rollback))]
    RollbackIncomplete {
        /// Provisioning failure that triggered the rollback.
        #[source]
        source: Box<FixtureError>,
        /// Teardown entries that failed.
        rollback: Vec<TeardownEntry>,
    },
    /// A fixture the caller asked for was never provisioned.
    #[error("fixture {0} is not provisioned")]
    Missing(&'static str),
}

impl FixtureError {
    /// Step that failed, when the error came from provisioning.
    #[must_use]
    pub fn step(&self) -> Option<FixtureStep> {
        match self {
            Self::Platform {
                step, ..
            }
            | Self::Session {
                step, ..
            }
            | Self::Role {
                step, ..
            } => Some(*step),
            Self::RollbackIncomplete {
                source, ..
            } => source.step(),
            Self::Missing(_) => None,
        }
    }

    /// Teardown entries that failed while rolling back a failed provision.
    #[must_use]
    pub fn rollback_failures(&self) -> &[TeardownEntry] {
        match self {
            Self::RollbackIncomplete {
                rollback, ..
            } => rollback,
            _ => &[],
        }
    }
}

/// Comma-separated teardown step names.
fn rollback_steps(entries: &[TeardownEntry]) -> String {
    entries.iter().map(|entry| entry.step.as_str()).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Resource record owning a storage namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Row id.
    pub id: String,
    /// Resource number used in the namespace.
    pub number: String,
}

/// Driver profile row for the regular identity.
#[derive(Debug, Clone, Serialize)]
pub struct DriverProfile {
    /// Same as the identity id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// License number.
    pub license_number: String,
    /// License expiry (`YYYY-MM-DD`).
    pub license_expiry: String,
    /// Phone number.
    pub phone_number: String,
    /// Contact email.
    pub email: String,
    /// Profile status.
    pub status: String,
    /// Certifications.
    pub certifications: Vec<String>,
    /// Free-form details.
    pub additional_info: Value,
}

/// Ownership assignment row linking a driver to a resource.
#[derive(Debug, Clone, Serialize)]
pub struct OwnershipAssignment {
    /// Driver profile id.
    pub driver_id: String,
    /// Resource record id.
    pub van_id: String,
    /// Assignment date (`YYYY-MM-DD`).
    pub assignment_date: String,
    /// Assignment start (RFC 3339).
    pub start_time: String,
    /// Assignment status.
    pub status: String,
}

/// Row shape for inserts where only the id matters.
#[derive(Debug, Deserialize)]
struct InsertedRow {
    /// Row id; UUID or integer depending on the table.
    id: Value,
}

impl InsertedRow {
    /// Returns the id as text.
    fn id_text(&self) -> String {
        match &self.id {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Everything provisioned for one run.
///
/// # Invariants
/// - A field is `Some` (or `true`) only once the platform confirmed it.
#[derive(Debug, Clone)]
pub struct FixtureContext {
    /// Tag embedded in every identity email of this run.
    pub run_tag: String,
    /// Bootstrap elevated identity.
    pub bootstrap: Option<Identity>,
    /// Whether the bootstrap membership row exists.
    pub bootstrap_membership: bool,
    /// Regular identity.
    pub regular: Option<Identity>,
    /// Driver profile id of the regular identity.
    pub profile_id: Option<String>,
    /// Identity promoted through the procedure.
    pub elevated: Option<Identity>,
    /// Whether the promotion succeeded.
    pub elevated_promoted: bool,
    /// Owned resource record.
    pub resource: Option<ResourceRecord>,
    /// Ownership assignment id.
    pub assignment_id: Option<String>,
    /// Keys accepted during the run.
    pub ledger: UploadLedger,
}

impl FixtureContext {
    /// Creates an empty context for a run.
    #[must_use]
    pub fn new(run_tag: impl Into<String>) -> Self {
        Self {
            run_tag: run_tag.into(),
            bootstrap: None,
            bootstrap_membership: false,
            regular: None,
            profile_id: None,
            elevated: None,
            elevated_promoted: false,
            resource: None,
            assignment_id: None,
            ledger: UploadLedger::new(),
        }
    }

    /// Regular identity.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Missing`] when it was not provisioned.
    pub fn require_regular(&self) -> Result<&Identity, FixtureError> {
        self.regular.as_ref().ok_or(FixtureError::Missing("regular identity"))
    }

    /// Promoted elevated identity.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Missing`] when it was not provisioned or not
    /// promoted.
    pub fn require_elevated(&self) -> Result<&Identity, FixtureError> {
        self.elevated
            .as_ref()
            .filter(|_| self.elevated_promoted)
            .ok_or(FixtureError::Missing("elevated identity"))
    }

    /// Owned resource record.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Missing`] when it was not provisioned.
    pub fn require_resource(&self) -> Result<&ResourceRecord, FixtureError> {
        self.resource.as_ref().ok_or(FixtureError::Missing("resource record"))
    }

    /// Returns true when nothing remains to tear down.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bootstrap.is_none()
            && !self.bootstrap_membership
            && self.regular.is_none()
            && self.profile_id.is_none()
            && self.elevated.is_none()
            && !self.elevated_promoted
            && self.resource.is_none()
            && self.assignment_id.is_none()
            && self.ledger.keys().is_empty()
    }
}

// ============================================================================
// SECTION: Teardown Report
// ============================================================================

/// Outcome of one teardown step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeardownEntry {
    /// Step.
    pub step: TeardownStep,
    /// Outcome.
    pub outcome: StepOutcome,
    /// Failure detail.
    pub error: Option<String>,
}

/// Outcomes of every teardown step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    /// Entries in execution order.
    pub entries: Vec<TeardownEntry>,
}

impl TeardownReport {
    /// Returns true when no step failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|entry| entry.outcome != StepOutcome::Error)
    }

    /// Entries for failed steps.
    #[must_use]
    pub fn failures(&self) -> Vec<&TeardownEntry> {
        self.entries.iter().filter(|entry| entry.outcome == StepOutcome::Error).collect()
    }
}

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Provisions and tears down run fixtures.
#[derive(Debug, Clone)]
pub struct FixtureProvisioner {
    /// Shared platform client.
    client: PlatformClient,
    /// Policy profile naming the bucket and resources.
    profile: PolicyProfile,
    /// Tag embedded in identity emails.
    run_tag: String,
}

impl FixtureProvisioner {
    /// Creates a provisioner with a random run tag.
    #[must_use]
    pub fn new(client: PlatformClient, profile: PolicyProfile) -> Self {
        Self {
            client,
            profile,
            run_tag: random_token(RUN_TAG_LEN).to_ascii_lowercase(),
        }
    }

    /// Replaces the run tag.
    #[must_use]
    pub fn with_run_tag(mut self, run_tag: impl Into<String>) -> Self {
        self.run_tag = run_tag.into();
        self
    }

    /// Run tag embedded in identity emails.
    #[must_use]
    pub fn run_tag(&self) -> &str {
        &self.run_tag
    }

    /// Policy profile in use.
    #[must_use]
    pub const fn profile(&self) -> &PolicyProfile {
        &self.profile
    }

    /// Provisions every fixture, tearing down partial state on failure.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] naming the first failed step, wrapped in
    /// [`FixtureError::RollbackIncomplete`] when the rollback left fixtures
    /// behind.
    pub async fn provision(&self) -> Result<FixtureContext, FixtureError> {
        let mut ctx = FixtureContext::new(self.run_tag.clone());
        match self.provision_into(&mut ctx).await {
            Ok(()) => Ok(ctx),
            Err(err) => {
                let report = self.teardown(&mut ctx).await;
                if report.is_clean() {
                    return Err(err);
                }
                Err(FixtureError::RollbackIncomplete {
                    source: Box::new(err),
                    rollback: report.failures().into_iter().cloned().collect(),
                })
            }
        }
    }

    /// Runs provisioning steps, recording each entity as it is created.
    async fn provision_into(&self, ctx: &mut FixtureContext) -> Result<(), FixtureError> {
        let roles = RoleElevation::new(self.client.clone());

        let bootstrap = self
            .create_identity(FixtureStep::CreateBootstrapIdentity, IdentityRole::Bootstrap)
            .await?;
        ctx.bootstrap = Some(bootstrap.clone());

        let step = FixtureStep::GrantBootstrapMembership;
        let granted = roles.bootstrap(&bootstrap.id).await.map_err(|source| FixtureError::Role {
            step,
            source,
        });
        self.finish(step, granted)?;
        ctx.bootstrap_membership = true;

        let regular =
            self.create_identity(FixtureStep::CreateRegularIdentity, IdentityRole::Regular).await?;
        ctx.regular = Some(regular.clone());

        let step = FixtureStep::CreateDriverProfile;
        let profile_row = driver_profile(&regular, OffsetDateTime::now_utc());
        let profile_id = self.insert(step, PROFILE_TABLE, &profile_row).await?;
        ctx.profile_id = Some(profile_id.clone());

        let elevated = self
            .create_identity(FixtureStep::CreateElevatedIdentity, IdentityRole::Elevated)
            .await?;
        ctx.elevated = Some(elevated.clone());

        let switcher = SessionSwitcher::new(self.client.clone());
        let step = FixtureStep::SignInBootstrap;
        let signed_in = switcher.sign_in(&bootstrap).await.map_err(|source| FixtureError::Session {
            step,
            source,
        });
        self.finish(step, signed_in)?;

        let step = FixtureStep::PromoteElevatedIdentity;
        let promoted = roles.promote(&elevated.id).await.map_err(|source| FixtureError::Role {
            step,
            source,
        });
        switcher.sign_out();
        self.finish(step, promoted)?;
        ctx.elevated_promoted = true;

        let step = FixtureStep::CreateResourceRecord;
        let number = self.profile.owned_resource.clone();
        let resource_row = json!({ "van_number": number, "type": "test", "status": "active" });
        let resource_id = self.insert(step, RESOURCE_TABLE, &resource_row).await?;
        ctx.resource = Some(ResourceRecord {
            id: resource_id.clone(),
            number,
        });

        let step = FixtureStep::CreateOwnershipAssignment;
        let assignment = ownership_assignment(&profile_id, &resource_id, OffsetDateTime::now_utc());
        let assignment_id = self.insert(step, ASSIGNMENT_TABLE, &assignment).await?;
        ctx.assignment_id = Some(assignment_id);
        Ok(())
    }

    /// Creates a confirmed identity for `role`.
    async fn create_identity(
        &self,
        step: FixtureStep,
        role: IdentityRole,
    ) -> Result<Identity, FixtureError> {
        let email = format!(
            "policy-{}-{}@{}",
            role.as_str(),
            self.run_tag,
            self.profile.identity_email_domain
        );
        let password = format!("Pw-{}!", random_token(PASSWORD_LEN));
        let created = self
            .client
            .admin_create_user(&email, &password)
            .await
            .map(|user| Identity {
                id: user.id,
                email,
                password,
                role,
            })
            .map_err(|source| FixtureError::Platform {
                step,
                source,
            });
        self.finish(step, created)
    }

    /// Inserts one row with service credentials and returns its id.
    async fn insert<T: Serialize + Sync>(
        &self,
        step: FixtureStep,
        table: &str,
        row: &T,
    ) -> Result<String, FixtureError> {
        let inserted = self
            .client
            .insert_row::<T, InsertedRow>(Authority::Service, table, row)
            .await
            .map(|row| row.id_text())
            .map_err(|source| FixtureError::Platform {
                step,
                source,
            });
        self.finish(step, inserted)
    }

    /// Emits a fixture step event and passes the result through.
    fn finish<T>(
        &self,
        step: FixtureStep,
        result: Result<T, FixtureError>,
    ) -> Result<T, FixtureError> {
        let (outcome, error) = match &result {
            Ok(_) => (StepOutcome::Ok, None),
            Err(err) => (StepOutcome::Error, Some(err.to_string())),
        };
        self.client.emit(HarnessEventKind::FixtureStep {
            step: step.as_str(),
            outcome,
            error,
        });
        result
    }

    /// Tears down everything recorded in `ctx`, clearing it as it goes.
    ///
    /// Signs the client out first. Failures are reported, never returned.
    pub async fn teardown(&self, ctx: &mut FixtureContext) -> TeardownReport {
        SessionSwitcher::new(self.client.clone()).sign_out();
        let roles = RoleElevation::new(self.client.clone());
        let mut report = TeardownReport::default();

        let keys = ctx.ledger.drain();
        let removed = if keys.is_empty() {
            None
        } else {
            Some(
                self.client
                    .remove_objects(Authority::Service, &self.profile.bucket, &keys)
                    .await
                    .map_err(|err| err.to_string()),
            )
        };
        self.settle(&mut report, TeardownStep::RemoveUploadedObjects, removed);

        let profile_id = ctx.profile_id.clone();
        let deleted = match (ctx.assignment_id.take(), profile_id.as_deref()) {
            (Some(_), Some(driver_id)) => {
                Some(self.delete_rows(ASSIGNMENT_TABLE, "driver_id", driver_id).await)
            }
            (Some(assignment_id), None) => {
                Some(self.delete_rows(ASSIGNMENT_TABLE, "id", &assignment_id).await)
            }
            (None, _) => None,
        };
        self.settle(&mut report, TeardownStep::DeleteOwnershipAssignment, deleted);

        let deleted = match ctx.profile_id.take() {
            Some(id) => Some(self.delete_rows(PROFILE_TABLE, "id", &id).await),
            None => None,
        };
        self.settle(&mut report, TeardownStep::DeleteDriverProfile, deleted);

        let deleted = match ctx.regular.take() {
            Some(identity) => Some(self.delete_identity(&identity).await),
            None => None,
        };
        self.settle(&mut report, TeardownStep::DeleteRegularIdentity, deleted);

        let deleted = match ctx.resource.take() {
            Some(resource) => Some(self.delete_rows(RESOURCE_TABLE, "id", &resource.id).await),
            None => None,
        };
        self.settle(&mut report, TeardownStep::DeleteResourceRecord, deleted);

        let demoted = match (ctx.elevated_promoted, ctx.elevated.as_ref()) {
            (true, Some(identity)) => Some(
                roles.demote_with_service(&identity.id).await.map_err(|err| err.to_string()),
            ),
            _ => None,
        };
        ctx.elevated_promoted = false;
        self.settle(&mut report, TeardownStep::DemoteElevatedIdentity, demoted);

        let deleted = match ctx.elevated.take() {
            Some(identity) => Some(self.delete_identity(&identity).await),
            None => None,
        };
        self.settle(&mut report, TeardownStep::DeleteElevatedIdentity, deleted);

        let revoked = match (ctx.bootstrap_membership, ctx.bootstrap.as_ref()) {
            (true, Some(identity)) => {
                Some(roles.revoke_bootstrap(&identity.id).await.map_err(|err| err.to_string()))
            }
            _ => None,
        };
        ctx.bootstrap_membership = false;
        self.settle(&mut report, TeardownStep::RevokeBootstrapMembership, revoked);

        let deleted = match ctx.bootstrap.take() {
            Some(identity) => Some(self.delete_identity(&identity).await),
            None => None,
        };
        self.settle(&mut report, TeardownStep::DeleteBootstrapIdentity, deleted);

        report
    }

    /// Deletes rows matching `column = value` with service credentials.
    async fn delete_rows(&self, table: &str, column: &str, value: &str) -> Result<(), String> {
        self.client
            .delete_eq(Authority::Service, table, column, value)
            .await
            .map_err(|err| err.to_string())
    }

    /// Deletes an identity with service credentials.
    async fn delete_identity(&self, identity: &Identity) -> Result<(), String> {
        self.client.admin_delete_user(&identity.id).await.map_err(|err| err.to_string())
    }

    /// Records a teardown step; `None` means there was nothing to remove.
    fn settle(
        &self,
        report: &mut TeardownReport,
        step: TeardownStep,
        result: Option<Result<(), String>>,
    ) {
        let (outcome, error) = match result {
            None => (StepOutcome::Skipped, None),
            Some(Ok(())) => (StepOutcome::Ok, None),
            Some(Err(err)) => (StepOutcome::Error, Some(err)),
        };
        self.client.emit(HarnessEventKind::TeardownStep {
            step: step.as_str(),
            outcome,
            error: error.clone(),
        });
        report.entries.push(TeardownEntry {
            step,
            outcome,
            error,
        });
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a random alphanumeric token.
fn random_token(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// Builds the driver profile row for the regular identity.
fn driver_profile(identity: &Identity, now: OffsetDateTime) -> DriverProfile {
    let today = now.date();
    let expiry = today.checked_add(Duration::days(LICENSE_VALIDITY_DAYS)).unwrap_or(today);
    DriverProfile {
        id: identity.id.clone(),
        name: "Policy Test Driver".to_string(),
        license_number: "TEST123".to_string(),
        license_expiry: expiry.to_string(),
        phone_number: "555-0123".to_string(),
        email: identity.email.clone(),
        status: "active".to_string(),
        certifications: Vec::new(),
        additional_info: json!({ "test": true }),
    }
}

/// Builds an active assignment starting now.
fn ownership_assignment(driver_id: &str, van_id: &str, now: OffsetDateTime) -> OwnershipAssignment {
    let start_time = now.format(&Rfc3339).unwrap_or_else(|_| now.unix_timestamp().to_string());
    OwnershipAssignment {
        driver_id: driver_id.to_string(),
        van_id: van_id.to_string(),
        assignment_date: now.date().to_string(),
        start_time,
        status: "active".to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
