//! BDD scenarios for worker lookup and service account checks.

use rstest_bdd_macros::scenario;

use super::test_helpers::{VerifyContext, verify_context};

#[scenario(
    path = "tests/features/verifier.feature",
    name = "Find the worker once the listing catches up"
)]
fn scenario_find_worker_after_retries(verify_context: VerifyContext) {
    let _ = verify_context;
}

#[scenario(
    path = "tests/features/verifier.feature",
    name = "Reject an ambiguous label match without retrying"
)]
fn scenario_reject_ambiguous_match(verify_context: VerifyContext) {
    let _ = verify_context;
}

#[scenario(
    path = "tests/features/verifier.feature",
    name = "Propagate listing failures without retrying"
)]
fn scenario_propagate_listing_failures(verify_context: VerifyContext) {
    let _ = verify_context;
}

#[scenario(
    path = "tests/features/verifier.feature",
    name = "Give up when no worker appears in time"
)]
fn scenario_give_up_after_timeout(verify_context: VerifyContext) {
    let _ = verify_context;
}

#[scenario(
    path = "tests/features/verifier.feature",
    name = "Report a service account mismatch with both values"
)]
fn scenario_report_account_mismatch(verify_context: VerifyContext) {
    let _ = verify_context;
}
