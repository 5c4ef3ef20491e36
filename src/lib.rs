//! Core library for the flexcheck verification tool.
//!
//! The crate checks the side effects of a deployed Dataflow flex template
//! job: it polls Compute Engine for the worker instance labelled with the
//! job id and verifies the service account attached to it.

pub mod compute;
pub mod config;
pub mod fixtures;
pub mod logging;
pub mod poll;
pub mod state;
pub mod test_support;
pub mod verifier;

pub use compute::{ComputeClient, ComputeError, ComputeInstance, InstanceLister, ServiceAccount};
pub use config::{ConfigError, GoogleConfig};
pub use fixtures::TestRunNames;
pub use poll::{PollError, PollOutcome, PollSchedule, poll_until};
pub use state::{StateError, job_id_from_state_file};
pub use verifier::{JobId, JobInstanceVerifier, VerifyError, verify_service_account};
