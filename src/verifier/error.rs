//! Error types for the job instance verifier.

use std::time::Duration;

use thiserror::Error;

use crate::compute::ComputeError;

/// Errors raised while locating or checking a job's worker instance.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VerifyError {
    /// Raised when an input is blank.
    #[error("invalid verifier input: {0} must not be empty")]
    InvalidInput(String),
    /// Raised when the listing call itself failed. Not retried.
    #[error("listing instances failed: {0}")]
    Transport(#[from] ComputeError),
    /// Raised when several instances carry the job label.
    #[error("wrong number of matching instances for dataflow job {job_id}: {count}")]
    AmbiguousMatch {
        /// Job identifier used as the label value.
        job_id: String,
        /// Number of instances returned by the capped listing.
        count: usize,
    },
    /// Raised when no instance appears before the deadline.
    #[error(
        "no instance found for dataflow job {job_id} in zone {zone} after {attempts} attempts ({timeout:?})"
    )]
    TimedOut {
        /// Job identifier used as the label value.
        job_id: String,
        /// Zone that was polled.
        zone: String,
        /// Number of listing attempts made.
        attempts: u32,
        /// Overall wait budget.
        timeout: Duration,
    },
    /// Raised when the instance does not carry exactly one service account.
    #[error("found {count} service accounts on instance {instance}, expected 1")]
    StructuralError {
        /// Instance name.
        instance: String,
        /// Number of service accounts attached.
        count: usize,
    },
    /// Raised when the sole service account is not the expected one.
    #[error("service account mismatch, expected account ID = {expected:?}, actual email = {actual:?}")]
    Mismatch {
        /// Expected account id.
        expected: String,
        /// Email of the attached account.
        actual: String,
    },
}
