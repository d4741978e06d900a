// crates/storage-policy-harness/src/suite.rs
// ============================================================================
// Module: Conformance Suite
// Description: Fixed scenario table and the runner that executes it.
// Purpose: Provision, drive every scenario, tear down, and report verdicts.
// Dependencies: serde, tokio
// ============================================================================

//! ## Overview
//! Scenarios run in a fixed order: content checks, rate limiting, namespace
//! ownership, then key shape. Rate-limit state carries across scenarios, so
//! they never run concurrently and the window wait is never skipped.
//!
//! Invariants:
//! - Teardown runs whether or not the scenarios completed.
//! - A failed verdict is reported, not raised; only harness failures return
//!   [`HarnessError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use tokio::time::sleep;

use crate::config::PolicyProfile;
use crate::driver::OperationDriver;
use crate::error::HarnessError;
use crate::events::HarnessEventKind;
use crate::fixtures::FixtureContext;
use crate::fixtures::FixtureProvisioner;
use crate::fixtures::TeardownReport;
use crate::oracle::Expectation;
use crate::oracle::Observation;
use crate::oracle::Verdict;
use crate::oracle::judge;
use crate::platform::Authority;
use crate::platform::PlatformClient;
use crate::policy::UploadPayload;
use crate::session::SessionSwitcher;

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// Identity a scenario runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// Regular identity owning one resource.
    Regular,
    /// Promoted elevated identity.
    Elevated,
}

/// What a scenario does.
#[derive(Debug, Clone)]
pub enum ScenarioAction {
    /// One write.
    Upload {
        /// Object key.
        key: String,
        /// Payload.
        payload: UploadPayload,
    },
    /// Concurrent writes with the same payload.
    Burst {
        /// Object keys.
        keys: Vec<String>,
        /// Payload.
        payload: UploadPayload,
    },
    /// One write after waiting out the rate window.
    UploadAfterWindow {
        /// Object key.
        key: String,
        /// Payload.
        payload: UploadPayload,
    },
}

impl ScenarioAction {
    /// Object keys the action writes.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Upload {
                key, ..
            }
            | Self::UploadAfterWindow {
                key, ..
            } => vec![key.clone()],
            Self::Burst {
                keys, ..
            } => keys.clone(),
        }
    }
}

/// One row of the scenario table.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Stable scenario name.
    pub name: &'static str,
    /// Identity the scenario runs as.
    pub actor: Actor,
    /// Writes to issue.
    pub action: ScenarioAction,
    /// Expected outcome.
    pub expectation: Expectation,
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Verdict for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: &'static str,
    /// Identity used.
    pub actor: Actor,
    /// Expected outcome.
    pub expectation: Expectation,
    /// Writes accepted.
    pub accepted: usize,
    /// Writes refused.
    pub rejected: usize,
    /// Verdict.
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Run tag of the fixtures used.
    pub run_tag: String,
    /// Scenario verdicts in execution order.
    pub scenarios: Vec<ScenarioReport>,
    /// Object names found under the owned namespace before teardown.
    pub owned_listing: Vec<String>,
    /// Teardown outcomes.
    pub teardown: TeardownReport,
}

impl SuiteReport {
    /// Returns true when every scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.scenarios.is_empty() && self.scenarios.iter().all(|scenario| scenario.verdict.passed)
    }

    /// Reports for failed scenarios.
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.scenarios.iter().filter(|scenario| !scenario.verdict.passed).collect()
    }

    /// Report for a named scenario.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|scenario| scenario.name == name)
    }
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Runs the scenario table for one policy profile.
#[derive(Debug, Clone)]
pub struct ConformanceSuite {
    /// Policy profile shaping keys, payloads, and timing.
    profile: PolicyProfile,
}

impl ConformanceSuite {
    /// Creates a suite for `profile`.
    #[must_use]
    pub const fn new(profile: PolicyProfile) -> Self {
        Self {
            profile,
        }
    }

    /// Policy profile in use.
    #[must_use]
    pub const fn profile(&self) -> &PolicyProfile {
        &self.profile
    }

    /// Builds the scenario table in execution order.
    #[must_use]
    pub fn scenarios(&self) -> Vec<Scenario> {
        let profile = &self.profile;
        let owned = profile.owned_resource.as_str();
        let unowned = profile.unowned_resource.as_str();
        let image = profile.allowed_content_type();
        let small = UploadPayload::small(image);
        let burst = profile.rate_limit.burst_size();

        vec![
            Scenario {
                name: "allowed_content_type",
                actor: Actor::Regular,
                action: ScenarioAction::Upload {
                    key: profile.object_key(owned, "test.jpg"),
                    payload: small.clone(),
                },
                expectation: Expectation::Accepted,
            },
            Scenario {
                name: "disallowed_content_type",
                actor: Actor::Regular,
                action: ScenarioAction::Upload {
                    key: profile.object_key(owned, "test.pdf"),
                    payload: UploadPayload::small(&profile.disallowed_content_type),
                },
                expectation: Expectation::Rejected,
            },
            Scenario {
                name: "oversized_payload",
                actor: Actor::Regular,
                action: ScenarioAction::Upload {
                    key: profile.object_key(owned, "large.jpg"),
                    payload: UploadPayload::oversized(image, profile.max_object_bytes),
                },
                expectation: Expectation::Rejected,
            },
            Scenario {
                name: "burst_over_cap",
                actor: Actor::Regular,
                action: ScenarioAction::Burst {
                    keys: (0 .. burst)
                        .map(|index| profile.object_key(owned, &format!("test{index}.jpg")))
                        .collect(),
                    payload: small.clone(),
                },
                expectation: Expectation::AnyRejected,
            },
            Scenario {
                name: "upload_after_window",
                actor: Actor::Regular,
                action: ScenarioAction::UploadAfterWindow {
                    key: profile.object_key(owned, "test_after_wait.jpg"),
                    payload: small.clone(),
                },
                expectation: Expectation::Accepted,
            },
            Scenario {
                name: "owned_namespace",
                actor: Actor::Regular,
                action: ScenarioAction::Upload {
                    key: profile.object_key(owned, "test_assigned.jpg"),
                    payload: small.clone(),
                },
                expectation: Expectation::Accepted,
            },
            Scenario {
                name: "unowned_namespace",
                actor: Actor::Regular,
                action: ScenarioAction::Upload {
                    key: profile.object_key(unowned, "test_unassigned.jpg"),
                    payload: small.clone(),
                },
                expectation: Expectation::Rejected,
            },
            Scenario {
                name: "elevated_any_namespace",
                actor: Actor::Elevated,
                action: ScenarioAction::Upload {
                    key: profile.object_key(unowned, "test_admin.jpg"),
                    payload: small.clone(),
                },
                expectation: Expectation::Accepted,
            },
            Scenario {
                name: "malformed_namespace",
                actor: Actor::Elevated,
                action: ScenarioAction::Upload {
                    key: format!("invalid_{}/test.jpg", profile.namespace_prefix),
                    payload: small.clone(),
                },
                expectation: Expectation::Rejected,
            },
            Scenario {
                name: "nested_path",
                actor: Actor::Elevated,
                action: ScenarioAction::Upload {
                    key: format!("{}/nested/test.jpg", profile.namespace(owned)),
                    payload: small,
                },
                expectation: Expectation::Rejected,
            },
        ]
    }

    /// Runs the full suite.
    ///
    /// Checks the bucket, clears keys left by earlier runs, provisions,
    /// executes every scenario, lists the owned namespace, and tears down.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when no verdict could be reached. Fixtures
    /// are torn down before the error is returned.
    pub async fn run(
        &self,
        client: &PlatformClient,
        provisioner: &FixtureProvisioner,
    ) -> Result<SuiteReport, HarnessError> {
        let bucket = self.profile.bucket.as_str();
        if !client.bucket_exists(bucket).await? {
            return Err(HarnessError::BucketMissing(bucket.to_string()));
        }
        let scenarios = self.scenarios();
        let stale: Vec<String> =
            scenarios.iter().flat_map(|scenario| scenario.action.keys()).collect();
        client.remove_objects(Authority::Service, bucket, &stale).await?;

        let mut ctx = provisioner.provision().await?;
        let outcome = self.execute(client, &ctx, &scenarios).await;
        let teardown = provisioner.teardown(&mut ctx).await;
        let (reports, owned_listing) = outcome?;
        Ok(SuiteReport {
            run_tag: ctx.run_tag,
            scenarios: reports,
            owned_listing,
            teardown,
        })
    }

    /// Runs every scenario, then lists the owned namespace.
    async fn execute(
        &self,
        client: &PlatformClient,
        ctx: &FixtureContext,
        scenarios: &[Scenario],
    ) -> Result<(Vec<ScenarioReport>, Vec<String>), HarnessError> {
        let switcher = SessionSwitcher::new(client.clone());
        let driver = OperationDriver::new(client.clone(), &self.profile.bucket, ctx.ledger.clone());
        let mut current: Option<Actor> = None;
        let mut reports = Vec::with_capacity(scenarios.len());

        for scenario in scenarios {
            if current != Some(scenario.actor) {
                let identity = match scenario.actor {
                    Actor::Regular => ctx.require_regular()?,
                    Actor::Elevated => ctx.require_elevated()?,
                };
                switcher.sign_in(identity).await?;
                current = Some(scenario.actor);
            }
            let report = self.run_scenario(&driver, scenario).await?;
            client.emit(HarnessEventKind::ScenarioVerdict {
                scenario: scenario.name.to_string(),
                passed: report.verdict.passed,
                detail: report.verdict.detail.clone(),
            });
            reports.push(report);
        }
        switcher.sign_out();

        let prefix = self.profile.namespace(&self.profile.owned_resource);
        let listing = client
            .list_objects(Authority::Service, &self.profile.bucket, &prefix)
            .await?
            .into_iter()
            .filter(|entry| entry.id.is_some())
            .map(|entry| entry.name)
            .collect();
        Ok((reports, listing))
    }

    /// Executes one scenario and judges it.
    async fn run_scenario(
        &self,
        driver: &OperationDriver,
        scenario: &Scenario,
    ) -> Result<ScenarioReport, HarnessError> {
        let observation = match &scenario.action {
            ScenarioAction::Upload {
                key,
                payload,
            } => Observation::Single(driver.upload(key, payload).await?),
            ScenarioAction::Burst {
                keys,
                payload,
            } => Observation::Batch(driver.upload_burst(keys, payload).await?),
            ScenarioAction::UploadAfterWindow {
                key,
                payload,
            } => {
                sleep(self.profile.rate_limit.reset_wait()).await;
                Observation::Single(driver.upload(key, payload).await?)
            }
        };
        let (accepted, rejected) = match &observation {
            Observation::Single(outcome) => {
                (usize::from(outcome.is_accepted()), usize::from(outcome.is_rejected()))
            }
            Observation::Batch(batch) => (batch.accepted(), batch.rejected()),
        };
        Ok(ScenarioReport {
            name: scenario.name,
            actor: scenario.actor,
            expectation: scenario.expectation,
            accepted,
            rejected,
            verdict: judge(scenario.expectation, &observation),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
