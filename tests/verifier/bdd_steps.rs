//! BDD step definitions for verifier behaviour.

use std::time::Duration;

use flexcheck::test_support::worker_instance;
use flexcheck::{ComputeError, JobId, JobInstanceVerifier, PollSchedule, VerifyError};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{LookupOutcome, VerifyContext};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a dataflow job \"{job_id}\"")]
fn dataflow_job(verify_context: &VerifyContext, job_id: String) {
    *verify_context.job_id.borrow_mut() = Some(job_id.trim().to_owned());
}

#[given("the compute listing returns no instances {count:u32} times")]
fn listing_returns_nothing(verify_context: &VerifyContext, count: u32) {
    for _ in 0..count {
        verify_context.lister.push_empty();
    }
}

#[given("the compute listing then returns worker \"{name}\" with service account \"{email}\"")]
fn listing_returns_worker(verify_context: &VerifyContext, name: String, email: String) {
    let job_id = verify_context.job_id();
    verify_context.lister.push_instances(vec![worker_instance(
        name.trim(),
        &job_id,
        &[email.trim()],
    )]);
}

#[given("the compute listing returns {count:u32} workers for the job")]
fn listing_returns_workers(verify_context: &VerifyContext, count: u32) {
    let job_id = verify_context.job_id();
    let workers = (0..count)
        .map(|index| worker_instance(&format!("worker-{index}"), &job_id, &[]))
        .collect();
    verify_context.lister.push_instances(workers);
}

#[given("the compute listing fails with status {status:u32}")]
fn listing_fails(verify_context: &VerifyContext, status: u32) {
    verify_context.lister.push_error(ComputeError::Status {
        status: u16::try_from(status).unwrap_or(u16::MAX),
        body: String::from("simulated failure"),
    });
}

fn run_lookup(
    verify_context: &VerifyContext,
    zone: &str,
    timeout: Duration,
    expected_account: Option<&str>,
) -> Result<(), StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let job_id = JobId::new(verify_context.job_id())
        .map_err(|err| StepError::Assertion(err.to_string()))?;
    let verifier = JobInstanceVerifier::new(
        verify_context.lister.clone(),
        "project",
        PollSchedule::new(POLL_INTERVAL, timeout),
    );

    let result: Result<_, VerifyError> = runtime.block_on(async {
        match expected_account {
            Some(expected) => {
                verifier
                    .check_job_service_account(&job_id, zone, expected)
                    .await
            }
            None => verifier.find_instance_for_job(&job_id, zone).await,
        }
    });

    verify_context.record(match result {
        Ok(instance) => LookupOutcome::Found(instance.name),
        Err(err) => LookupOutcome::Failed(err.to_string()),
    });
    Ok(())
}

#[when("I look up the worker in zone \"{zone}\" within {millis:u32} milliseconds")]
fn look_up_worker(
    verify_context: &VerifyContext,
    zone: String,
    millis: u32,
) -> Result<(), StepError> {
    run_lookup(
        verify_context,
        zone.trim(),
        Duration::from_millis(u64::from(millis)),
        None,
    )
}

#[when("I check the worker in zone \"{zone}\" runs as \"{expected}\"")]
fn check_worker_account(
    verify_context: &VerifyContext,
    zone: String,
    expected: String,
) -> Result<(), StepError> {
    run_lookup(
        verify_context,
        zone.trim(),
        Duration::from_secs(2),
        Some(expected.trim()),
    )
}

#[then("the lookup finds worker \"{name}\"")]
fn lookup_finds_worker(verify_context: &VerifyContext, name: String) -> Result<(), StepError> {
    match verify_context.outcome() {
        Some(LookupOutcome::Found(found)) if found == name.trim() => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected worker {name}, got {other:?}"
        ))),
    }
}

#[then("the lookup fails with \"{fragment}\"")]
fn lookup_fails_with(verify_context: &VerifyContext, fragment: String) -> Result<(), StepError> {
    match verify_context.outcome() {
        Some(LookupOutcome::Failed(message)) if message.contains(fragment.trim()) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure containing {fragment:?}, got {other:?}"
        ))),
    }
}

#[then("the compute API was called {count:u32} times")]
fn compute_called(verify_context: &VerifyContext, count: u32) -> Result<(), StepError> {
    let calls = verify_context.lister.call_count();
    if calls == count as usize {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} listing calls, got {calls}"
        )))
    }
}
