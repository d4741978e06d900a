// system-tests/tests/suites/policy_drift.rs
// ============================================================================
// Module: Policy Drift Tests
// Description: Relaxed stub policies must produce failed verdicts.
// Purpose: Prove the oracle catches each missing platform rule by name.
// Dependencies: system-tests helpers, storage-policy-harness
// ============================================================================

use helpers::artifacts::TestReporter;
use helpers::artifacts::verdict_notes;
use helpers::harness::StubRun;
use helpers::platform_stub::StubPolicy;

use crate::helpers;

/// Runs the suite with one relaxed rule and checks exactly `expected` fail.
async fn assert_drift_detected(
    test_name: &str,
    relax: impl FnOnce(&mut StubPolicy),
    expected: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new(test_name)?;
    let run = StubRun::start_with(|options| relax(&mut options.policy))?;

    let report = run.run_suite().await?;
    let artifacts = reporter.record_run(&report, &run.client.transcript(), &run.events())?;

    let failed: Vec<&str> = report.failures().iter().map(|scenario| scenario.name).collect();
    if failed != expected {
        return Err(format!("expected failures {expected:?}, got {failed:?}").into());
    }
    if report.passed() {
        return Err("a drifted policy must not pass".into());
    }
    if !report.teardown.is_clean() || !run.stub.snapshot().is_clean() {
        return Err("drifted run must still tear down cleanly".into());
    }

    reporter.finish("pass", verdict_notes(&report), artifacts)?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_content_type_rule_fails_its_scenario() -> Result<(), Box<dyn std::error::Error>> {
    assert_drift_detected(
        "missing_content_type_rule_fails_its_scenario",
        |policy| policy.enforce_content_type = false,
        &["disallowed_content_type"],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_size_rule_fails_its_scenario() -> Result<(), Box<dyn std::error::Error>> {
    assert_drift_detected(
        "missing_size_rule_fails_its_scenario",
        |policy| policy.enforce_size = false,
        &["oversized_payload"],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_rate_limit_fails_the_burst() -> Result<(), Box<dyn std::error::Error>> {
    assert_drift_detected(
        "missing_rate_limit_fails_the_burst",
        |policy| policy.enforce_rate_limit = false,
        &["burst_over_cap"],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_ownership_rule_fails_its_scenario() -> Result<(), Box<dyn std::error::Error>> {
    assert_drift_detected(
        "missing_ownership_rule_fails_its_scenario",
        |policy| policy.enforce_ownership = false,
        &["unowned_namespace"],
    )
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_key_shape_rule_fails_both_shape_scenarios() -> Result<(), Box<dyn std::error::Error>> {
    assert_drift_detected(
        "missing_key_shape_rule_fails_both_shape_scenarios",
        |policy| policy.enforce_key_shape = false,
        &["malformed_namespace", "nested_path"],
    )
    .await
}
