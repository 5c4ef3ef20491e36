//! Worker instance checks for deployed Dataflow jobs.
//!
//! Dataflow labels every worker VM with `goog-dataflow-job-id`. The verifier
//! polls the Compute listing for that label until exactly one instance shows
//! up, then inspects the instance's attached service account.

mod error;
mod types;

use tracing::{debug, info};

use crate::compute::{ComputeClient, ComputeInstance, InstanceLister, ListInstancesRequest};
use crate::config::{ConfigError, GoogleConfig};
use crate::poll::{PollError, PollOutcome, PollSchedule, poll_until};

pub use error::VerifyError;
pub use types::JobId;

/// Label Dataflow attaches to worker instances.
pub const JOB_ID_LABEL: &str = "goog-dataflow-job-id";

/// Listing cap; two results are enough to tell one match from many.
pub const MAX_MATCHES: u32 = 2;

/// Renders the Compute filter selecting instances of `job_id`.
#[must_use]
pub fn job_label_filter(job_id: &JobId) -> String {
    format!("labels.{JOB_ID_LABEL} = {job_id}")
}

/// Locates and checks the worker instance of a Dataflow job.
#[derive(Clone, Debug)]
pub struct JobInstanceVerifier<L: InstanceLister> {
    lister: L,
    project: String,
    schedule: PollSchedule,
}

impl JobInstanceVerifier<ComputeClient> {
    /// Creates a verifier wired to the Compute REST client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn from_config(config: &GoogleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            ComputeClient::from_config(config),
            config.project.clone(),
            config.poll_schedule(),
        ))
    }
}

impl<L: InstanceLister> JobInstanceVerifier<L> {
    /// Creates a verifier over an arbitrary lister.
    #[must_use]
    pub fn new(lister: L, project: impl Into<String>, schedule: PollSchedule) -> Self {
        Self {
            lister,
            project: project.into(),
            schedule,
        }
    }

    /// Polls until exactly one instance in `zone` carries the job label.
    ///
    /// An empty listing is retried until the schedule's timeout. Anything
    /// else ends the lookup at once.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Transport`] when a listing call fails,
    /// [`VerifyError::AmbiguousMatch`] when more than one instance matches,
    /// [`VerifyError::TimedOut`] when none appears in time, and
    /// [`VerifyError::InvalidInput`] for a blank zone.
    pub async fn find_instance_for_job(
        &self,
        job_id: &JobId,
        zone: &str,
    ) -> Result<ComputeInstance, VerifyError> {
        let zone = zone.trim();
        if zone.is_empty() {
            return Err(VerifyError::InvalidInput(String::from("zone")));
        }

        let request = ListInstancesRequest {
            project: self.project.clone(),
            zone: zone.to_owned(),
            filter: job_label_filter(job_id),
            max_results: MAX_MATCHES,
        };
        let lister = &self.lister;
        let request_ref = &request;
        let job = job_id.as_str();

        let result = poll_until(self.schedule, move || async move {
            match lister.list_instances(request_ref).await {
                Ok(items) => classify_matches(job, items),
                Err(err) => PollOutcome::Fatal(VerifyError::Transport(err)),
            }
        })
        .await;

        match result {
            Ok(instance) => {
                info!(job_id = job, instance = %instance.name, zone, "found worker instance");
                Ok(instance)
            }
            Err(PollError::Fatal(err)) => Err(err),
            Err(PollError::TimedOut { attempts, .. }) => Err(VerifyError::TimedOut {
                job_id: job.to_owned(),
                zone: zone.to_owned(),
                attempts,
                timeout: self.schedule.timeout,
            }),
        }
    }

    /// Finds the job's instance and checks its service account id.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::find_instance_for_job`] or
    /// [`verify_service_account`].
    pub async fn check_job_service_account(
        &self,
        job_id: &JobId,
        zone: &str,
        expected_id: &str,
    ) -> Result<ComputeInstance, VerifyError> {
        let instance = self.find_instance_for_job(job_id, zone).await?;
        verify_service_account(&instance, expected_id)?;
        info!(job_id = %job_id, account_id = expected_id, "service account verified");
        Ok(instance)
    }
}

fn classify_matches(
    job_id: &str,
    mut items: Vec<ComputeInstance>,
) -> PollOutcome<ComputeInstance, VerifyError> {
    if items.len() > 1 {
        return PollOutcome::Fatal(VerifyError::AmbiguousMatch {
            job_id: job_id.to_owned(),
            count: items.len(),
        });
    }
    items.pop().map_or_else(
        || PollOutcome::Pending(format!("no instance found for dataflow job {job_id}")),
        PollOutcome::Ready,
    )
}

/// Checks that `instance` carries exactly one service account whose id (the
/// email before `@`) equals `expected_id`. The comparison is exact.
///
/// # Errors
///
/// Returns [`VerifyError::StructuralError`] when the instance has zero or
/// several accounts and [`VerifyError::Mismatch`] when the id differs.
pub fn verify_service_account(
    instance: &ComputeInstance,
    expected_id: &str,
) -> Result<(), VerifyError> {
    let [account] = instance.service_accounts.as_slice() else {
        return Err(VerifyError::StructuralError {
            instance: instance.name.clone(),
            count: instance.service_accounts.len(),
        });
    };

    debug!(instance = %instance.name, email = %account.email, "comparing service account");
    if account.account_id() == expected_id {
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            expected: expected_id.to_owned(),
            actual: account.email.clone(),
        })
    }
}
