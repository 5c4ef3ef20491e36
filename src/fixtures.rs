//! Randomised resource names for flex template acceptance runs.
//!
//! Each run gets a fresh suffix so parallel runs never collide on bucket,
//! job, or service account names.

use uuid::Uuid;

/// Length of the random suffix appended to every name.
pub const SUFFIX_LEN: usize = 10;

/// Zone the worker is pinned to when a scenario checks its service account.
pub const DEFAULT_ZONE: &str = "us-central1-b";

const BUCKET_PREFIX: &str = "tf-test-dataflow-gcs-";
const JOB_PREFIX: &str = "tf-test-dataflow-job-";
const ACCOUNT_PREFIX: &str = "tf-test-dataflow-sa";

/// Names for the resources of one acceptance run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestRunNames {
    /// Staging bucket holding the template spec.
    pub bucket: String,
    /// Flex template job name.
    pub job: String,
    /// Service account id (the part of the email before `@`).
    pub account_id: String,
    /// Zone for the job's workers.
    pub zone: String,
}

impl TestRunNames {
    /// Generates names with a random lowercase alphanumeric suffix.
    #[must_use]
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        let suffix: String = simple.chars().take(SUFFIX_LEN).collect();
        Self::with_suffix(&suffix)
    }

    /// Builds names from an explicit suffix.
    #[must_use]
    pub fn with_suffix(suffix: &str) -> Self {
        Self {
            bucket: format!("{BUCKET_PREFIX}{suffix}"),
            job: format!("{JOB_PREFIX}{suffix}"),
            account_id: format!("{ACCOUNT_PREFIX}{suffix}"),
            zone: DEFAULT_ZONE.to_owned(),
        }
    }

    /// Renders the names as `KEY=value` lines suitable for shell `eval`.
    #[must_use]
    pub fn to_env_lines(&self) -> String {
        [
            ("FLEXCHECK_BUCKET", &self.bucket),
            ("FLEXCHECK_JOB", &self.job),
            ("FLEXCHECK_ACCOUNT_ID", &self.account_id),
            ("FLEXCHECK_ZONE", &self.zone),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
    }
}
