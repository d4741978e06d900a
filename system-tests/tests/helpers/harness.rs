// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Stub Harness Wiring
// Description: Connects the policy harness to a freshly spawned platform stub.
// Purpose: Give every suite the same client, profile, and event capture.
// Dependencies: storage-policy-harness, system-tests
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use storage_policy_harness::ConformanceSuite;
use storage_policy_harness::FixtureProvisioner;
use storage_policy_harness::HarnessError;
use storage_policy_harness::HarnessEvent;
use storage_policy_harness::HarnessEventSink;
use storage_policy_harness::MemoryEventSink;
use storage_policy_harness::PlatformClient;
use storage_policy_harness::PolicyProfile;
use storage_policy_harness::RateLimitPolicy;
use storage_policy_harness::SuiteReport;
use storage_policy_harness::policy::DEFAULT_UPLOAD_CAP;
use system_tests::config::SystemTestConfig;

use super::platform_stub::PlatformStubHandle;
use super::platform_stub::StubOptions;
use super::platform_stub::spawn_platform_stub;
use super::timeouts::resolve_timeout;

/// Stub rate window unless `STORAGE_POLICY_STUB_WINDOW_MS` overrides it.
pub const STUB_WINDOW: Duration = Duration::from_millis(1500);
/// Upper bound for one full suite run against the stub.
pub const SUITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default profile with the rate window shortened for the stub.
pub fn stub_profile() -> Result<PolicyProfile, String> {
    let window = SystemTestConfig::load()?.stub_window.unwrap_or(STUB_WINDOW);
    Ok(PolicyProfile::default().with_rate_limit(RateLimitPolicy::new(DEFAULT_UPLOAD_CAP, window)))
}

/// A running stub plus a harness client wired to it.
pub struct StubRun {
    pub stub: PlatformStubHandle,
    pub client: PlatformClient,
    pub events: Arc<MemoryEventSink>,
    pub profile: PolicyProfile,
}

impl StubRun {
    /// Starts a stub matching the stub profile.
    pub fn start() -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_with(|_| {})
    }

    /// Starts a stub after `configure` adjusts its options.
    pub fn start_with(
        configure: impl FnOnce(&mut StubOptions),
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let profile = stub_profile()?;
        let mut options = StubOptions::for_profile(&profile);
        configure(&mut options);
        let stub = spawn_platform_stub(options)?;
        let events = Arc::new(MemoryEventSink::new());
        let sink: Arc<dyn HarnessEventSink> = events.clone();
        let client = PlatformClient::new(&stub.harness_config()?)?.with_event_sink(sink);
        Ok(Self {
            stub,
            client,
            events,
            profile,
        })
    }

    /// Provisioner with a fresh run tag.
    pub fn provisioner(&self) -> FixtureProvisioner {
        FixtureProvisioner::new(self.client.clone(), self.profile.clone())
    }

    /// Runs the full suite under the suite timeout.
    pub async fn run_suite(&self) -> Result<SuiteReport, Box<dyn std::error::Error>> {
        let suite = ConformanceSuite::new(self.profile.clone());
        let provisioner = self.provisioner();
        let deadline = resolve_timeout(SUITE_TIMEOUT)?;
        let outcome: Result<SuiteReport, HarnessError> =
            tokio::time::timeout(deadline, suite.run(&self.client, &provisioner))
                .await
                .map_err(|_| format!("suite run exceeded {deadline:?}"))?;
        Ok(outcome?)
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<HarnessEvent> {
        self.events.events()
    }
}
