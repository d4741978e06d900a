// system-tests/tests/suites/fixtures.rs
// ============================================================================
// Module: Fixture Lifecycle Tests
// Description: Provisioning and teardown against the platform stub.
// Purpose: Validate fail-fast setup and best-effort, report-only teardown.
// Dependencies: system-tests helpers, storage-policy-harness
// ============================================================================

use helpers::artifacts::TestReporter;
use helpers::harness::StubRun;
use helpers::platform_stub::StubFault;
use storage_policy_harness::FixtureError;
use storage_policy_harness::FixtureStep;
use storage_policy_harness::RoleElevation;
use storage_policy_harness::StepOutcome;
use storage_policy_harness::TeardownStep;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn provision_then_teardown_leaves_nothing_behind() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("provision_then_teardown_leaves_nothing_behind")?;
    let run = StubRun::start()?;
    let provisioner = run.provisioner().with_run_tag("fixturetag");

    let mut ctx = provisioner.provision().await?;
    let regular = ctx.require_regular()?.clone();
    let elevated = ctx.require_elevated()?.clone();
    let resource = ctx.require_resource()?.clone();
    for email in [&regular.email, &elevated.email] {
        if !email.contains("fixturetag") {
            return Err(format!("email {email} does not carry the run tag").into());
        }
    }
    if resource.number != run.profile.owned_resource {
        return Err(format!("resource number {} is not the owned resource", resource.number).into());
    }
    let roles = RoleElevation::new(run.client.clone());
    if !roles.is_elevated(&elevated.id).await? {
        return Err("promoted identity has no membership row".into());
    }
    if roles.is_elevated(&regular.id).await? {
        return Err("regular identity must not be elevated".into());
    }
    let provisioned = run.stub.snapshot();
    if provisioned.user_emails.len() != 3 || provisioned.row_count("driver_van_assignments") != 1 {
        return Err(format!("unexpected provisioned state: {provisioned:?}").into());
    }

    let report = provisioner.teardown(&mut ctx).await;
    if !report.is_clean() {
        return Err(format!("teardown failures: {:?}", report.failures()).into());
    }
    if report.entries.len() != 9 {
        return Err(format!("expected 9 teardown entries, got {}", report.entries.len()).into());
    }
    let skipped: Vec<TeardownStep> = report
        .entries
        .iter()
        .filter(|entry| entry.outcome == StepOutcome::Skipped)
        .map(|entry| entry.step)
        .collect();
    if skipped != vec![TeardownStep::RemoveUploadedObjects] {
        return Err(format!("only the empty object removal should skip: {skipped:?}").into());
    }
    if !ctx.is_empty() {
        return Err("context should be empty after teardown".into());
    }
    let snapshot = run.stub.snapshot();
    if !snapshot.is_clean() {
        return Err(format!("stub not clean: {snapshot:?}").into());
    }

    let again = provisioner.teardown(&mut ctx).await;
    if again.entries.iter().any(|entry| entry.outcome != StepOutcome::Skipped) {
        return Err("second teardown should skip every step".into());
    }

    reporter.finish("pass", vec!["fixture lifecycle clean".to_string()], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_step_is_named_and_partial_state_removed() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("failed_step_is_named_and_partial_state_removed")?;
    let run = StubRun::start_with(|options| options.faults.push(StubFault::FailInsert("vans")))?;

    let Err(err) = run.provisioner().provision().await else {
        return Err("provisioning should fail when the resource insert fails".into());
    };
    if err.step() != Some(FixtureStep::CreateResourceRecord) {
        return Err(format!("wrong failed step: {err}").into());
    }
    if !err.to_string().contains("create_resource_record") {
        return Err(format!("error should name the step: {err}").into());
    }
    let snapshot = run.stub.snapshot();
    if !snapshot.is_clean() {
        return Err(format!("partial fixtures left behind: {snapshot:?}").into());
    }

    reporter.finish("pass", vec![err.to_string()], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_rollback_is_carried_by_the_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("failed_rollback_is_carried_by_the_error")?;
    let run = StubRun::start_with(|options| {
        options.faults.push(StubFault::FailInsert("vans"));
        options.faults.push(StubFault::FailDelete("driver_profiles"));
    })?;

    let Err(err) = run.provisioner().provision().await else {
        return Err("provisioning should fail when the resource insert fails".into());
    };
    if !matches!(err, FixtureError::RollbackIncomplete { .. }) {
        return Err(format!("rollback failure should wrap the error: {err:?}").into());
    }
    if err.step() != Some(FixtureStep::CreateResourceRecord) {
        return Err(format!("wrong failed step: {err}").into());
    }
    let failed: Vec<TeardownStep> = err.rollback_failures().iter().map(|entry| entry.step).collect();
    if failed != vec![TeardownStep::DeleteDriverProfile] {
        return Err(format!("unexpected rollback failures: {failed:?}").into());
    }
    let message = err.to_string();
    if !message.contains("create_resource_record") || !message.contains("delete_driver_profile") {
        return Err(format!("error should name both steps: {message}").into());
    }
    if run.stub.snapshot().row_count("driver_profiles") != 1 {
        return Err("the undeletable profile row should remain".into());
    }

    reporter.finish("pass", vec![message], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn teardown_failure_is_reported_and_later_steps_run() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("teardown_failure_is_reported_and_later_steps_run")?;
    let run =
        StubRun::start_with(|options| options.faults.push(StubFault::FailDelete("driver_profiles")))?;
    let provisioner = run.provisioner();

    let mut ctx = provisioner.provision().await?;
    let report = provisioner.teardown(&mut ctx).await;
    let failed: Vec<TeardownStep> = report.failures().iter().map(|entry| entry.step).collect();
    if failed != vec![TeardownStep::DeleteDriverProfile] {
        return Err(format!("unexpected teardown failures: {failed:?}").into());
    }
    let snapshot = run.stub.snapshot();
    if !snapshot.user_emails.is_empty() {
        return Err(format!("identities survived teardown: {:?}", snapshot.user_emails).into());
    }
    if snapshot.row_count("driver_profiles") != 1 || snapshot.row_count("vans") != 0 {
        return Err(format!("unexpected rows after teardown: {:?}", snapshot.rows).into());
    }

    let logged = run.events().iter().any(|event| {
        matches!(
            &event.kind,
            storage_policy_harness::HarnessEventKind::TeardownStep {
                step: "delete_driver_profile",
                outcome: StepOutcome::Error,
                error: Some(_),
            }
        )
    });
    if !logged {
        return Err("teardown failure was not logged".into());
    }

    reporter.finish("pass", vec!["teardown failure reported".to_string()], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_fixtures_surface_as_errors() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("missing_fixtures_surface_as_errors")?;
    let ctx = storage_policy_harness::FixtureContext::new("empty");
    if ctx.require_regular().is_ok() || ctx.require_elevated().is_ok() || ctx.require_resource().is_ok()
    {
        return Err("empty context must not yield fixtures".into());
    }
    if !ctx.is_empty() {
        return Err("new context should be empty".into());
    }
    reporter.finish("pass", Vec::new(), Vec::new())?;
    Ok(())
}
