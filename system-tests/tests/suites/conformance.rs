// system-tests/tests/suites/conformance.rs
// ============================================================================
// Module: Conformance Tests
// Description: Full scenario table against a policy-enforcing stub.
// Purpose: Prove the harness reaches a passing verdict and cleans up after.
// Dependencies: system-tests helpers, storage-policy-harness, tempfile
// ============================================================================

use std::fs;

use helpers::artifacts::TestReporter;
use helpers::artifacts::verdict_notes;
use helpers::harness::StubRun;
use helpers::platform_stub::STUB_ANON_KEY;
use helpers::platform_stub::STUB_SERVICE_KEY;
use helpers::platform_stub::StubPolicy;
use storage_policy_harness::ConformanceSuite;
use storage_policy_harness::FixtureProvisioner;
use storage_policy_harness::HarnessError;
use storage_policy_harness::HarnessEventKind;
use storage_policy_harness::PolicyProfile;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn full_suite_passes_against_enforcing_stub() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("full_suite_passes_against_enforcing_stub")?;
    let run = StubRun::start()?;

    let report = run.run_suite().await?;
    let artifacts = reporter.record_run(&report, &run.client.transcript(), &run.events())?;

    if !report.passed() {
        let failed: Vec<&str> = report.failures().iter().map(|scenario| scenario.name).collect();
        return Err(format!("scenarios failed: {failed:?}").into());
    }
    if report.scenarios.len() != 10 {
        return Err(format!("expected 10 scenarios, got {}", report.scenarios.len()).into());
    }
    let burst = report.scenario("burst_over_cap").ok_or("burst scenario missing")?;
    if burst.accepted + burst.rejected != 11 || burst.rejected == 0 {
        return Err(format!("unexpected burst split: {burst:?}").into());
    }
    for name in ["test.jpg", "test_after_wait.jpg", "test_assigned.jpg"] {
        if !report.owned_listing.iter().any(|listed| listed == name) {
            return Err(format!("{name} missing from owned namespace listing").into());
        }
    }
    if report.owned_listing.iter().any(|listed| listed == "test.pdf" || listed == "large.jpg") {
        return Err("rejected uploads must not appear in the listing".into());
    }

    if !report.teardown.is_clean() {
        return Err(format!("teardown failures: {:?}", report.teardown.failures()).into());
    }
    let snapshot = run.stub.snapshot();
    if !snapshot.is_clean() {
        return Err(format!("stub not clean after teardown: {snapshot:?}").into());
    }

    reporter.finish("pass", verdict_notes(&report), artifacts)?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn events_and_transcript_carry_no_secrets() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("events_and_transcript_carry_no_secrets")?;
    let run = StubRun::start()?;
    let report = run.run_suite().await?;
    let events = run.events();
    let artifacts = reporter.record_run(&report, &run.client.transcript(), &events)?;

    let verdicts = events
        .iter()
        .filter(|event| matches!(event.kind, HarnessEventKind::ScenarioVerdict { .. }))
        .count();
    if verdicts != report.scenarios.len() {
        return Err(format!("expected one verdict event per scenario, got {verdicts}").into());
    }
    let uploads = events
        .iter()
        .filter(|event| matches!(event.kind, HarnessEventKind::UploadOutcome { .. }))
        .count();
    if uploads != 20 {
        return Err(format!("expected 20 upload events, got {uploads}").into());
    }

    let events_text = fs::read_to_string(reporter.artifacts().root().join("events.jsonl"))?;
    let transcript_text = fs::read_to_string(reporter.artifacts().root().join("transcript.json"))?;
    for text in [&events_text, &transcript_text] {
        for secret in [STUB_SERVICE_KEY, STUB_ANON_KEY, "Pw-", "stub-session-"] {
            if text.contains(secret) {
                return Err(format!("artifact leaked {secret}").into());
            }
        }
    }

    reporter.finish("pass", vec![format!("{} events recorded", events.len())], artifacts)?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_objects_from_earlier_runs_are_purged() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("stale_objects_from_earlier_runs_are_purged")?;
    let run = StubRun::start()?;
    run.stub.seed_object(&run.profile.bucket, "van_999/test.jpg");
    run.stub.seed_object(&run.profile.bucket, "van_999/test_assigned.jpg");

    let report = run.run_suite().await?;
    let artifacts = reporter.record_run(&report, &run.client.transcript(), &run.events())?;
    if !report.passed() {
        return Err(format!("stale keys caused failures: {:?}", report.failures()).into());
    }
    if !run.stub.snapshot().objects.is_empty() {
        return Err("objects remain after teardown".into());
    }

    reporter.finish("pass", verdict_notes(&report), artifacts)?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_bucket_fails_before_provisioning() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("missing_bucket_fails_before_provisioning")?;
    let run = StubRun::start_with(|options| options.buckets.clear())?;
    let suite = ConformanceSuite::new(run.profile.clone());

    match suite.run(&run.client, &run.provisioner()).await {
        Err(HarnessError::BucketMissing(bucket)) if bucket == run.profile.bucket => {}
        other => return Err(format!("expected missing bucket error, got {other:?}").into()),
    }
    if !run.stub.snapshot().user_emails.is_empty() {
        return Err("no identities may be created when the bucket is missing".into());
    }

    reporter.finish("pass", vec!["bucket preflight failed fast".to_string()], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn profile_file_reshapes_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("profile_file_reshapes_the_run")?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("profile.toml");
    fs::write(
        &path,
        "owned_resource = \"321\"\nunowned_resource = \"654\"\n\n[rate_limit]\nupload_cap = 4\nwindow_seconds = 1\n",
    )?;
    let profile = PolicyProfile::load(&path)?;
    if profile.rate_limit.burst_size() != 5 {
        return Err("profile upload cap not applied".into());
    }

    let run = StubRun::start_with(|options| {
        options.policy = StubPolicy::from_profile(&profile);
    })?;
    let suite = ConformanceSuite::new(profile.clone());
    let provisioner = FixtureProvisioner::new(run.client.clone(), profile);
    let report = suite.run(&run.client, &provisioner).await?;
    let artifacts = reporter.record_run(&report, &run.client.transcript(), &run.events())?;

    if !report.passed() {
        return Err(format!("profile run failed: {:?}", report.failures()).into());
    }
    let burst = report.scenario("burst_over_cap").ok_or("burst scenario missing")?;
    if burst.accepted + burst.rejected != 5 {
        return Err(format!("burst should issue 5 writes, issued {}", burst.accepted + burst.rejected).into());
    }
    if !report.owned_listing.iter().any(|name| name == "test_assigned.jpg") {
        return Err("listing should cover van_321".into());
    }

    reporter.finish("pass", verdict_notes(&report), artifacts)?;
    Ok(())
}
