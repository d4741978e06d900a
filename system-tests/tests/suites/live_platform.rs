// system-tests/tests/suites/live_platform.rs
// ============================================================================
// Module: Live Platform Tests
// Description: Conformance run against the platform named by the environment.
// Purpose: Verify deployed storage policies end to end.
// Dependencies: system-tests helpers, storage-policy-harness
// ============================================================================

use std::sync::Arc;

use helpers::artifacts::TestReporter;
use helpers::artifacts::verdict_notes;
use storage_policy_harness::ConformanceSuite;
use storage_policy_harness::FixtureProvisioner;
use storage_policy_harness::HarnessConfig;
use storage_policy_harness::HarnessEvent;
use storage_policy_harness::HarnessEventSink;
use storage_policy_harness::MemoryEventSink;
use storage_policy_harness::PlatformClient;
use storage_policy_harness::StderrEventSink;

use crate::helpers;

/// Streams events to stderr while keeping a copy for artifacts.
struct ProgressSink {
    memory: Arc<MemoryEventSink>,
}

impl HarnessEventSink for ProgressSink {
    fn record(&self, event: &HarnessEvent) {
        StderrEventSink.record(event);
        self.memory.record(event);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn live_platform_enforces_storage_policies() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("live_platform_enforces_storage_policies")?;
    let config = HarnessConfig::load()?;
    let profile = config.load_profile()?;
    let events = Arc::new(MemoryEventSink::new());
    let sink: Arc<dyn HarnessEventSink> = Arc::new(ProgressSink {
        memory: Arc::clone(&events),
    });
    let client = PlatformClient::new(&config)?.with_event_sink(sink);

    let suite = ConformanceSuite::new(profile.clone());
    let provisioner = FixtureProvisioner::new(client.clone(), profile);
    let report = suite.run(&client, &provisioner).await?;
    let artifacts = reporter.record_run(&report, &client.transcript(), &events.events())?;

    if !report.teardown.is_clean() {
        return Err(format!("teardown left fixtures behind: {:?}", report.teardown.failures()).into());
    }
    if !report.passed() {
        reporter.finish("fail", verdict_notes(&report), artifacts)?;
        let failed: Vec<&str> = report.failures().iter().map(|scenario| scenario.name).collect();
        return Err(format!("platform policies diverge: {failed:?}").into());
    }

    reporter.finish("pass", verdict_notes(&report), artifacts)?;
    Ok(())
}
