//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

use crate::compute::{
    ComputeError, ComputeInstance, InstanceLister, ListFuture, ListInstancesRequest,
    ServiceAccount,
};
use crate::verifier::JOB_ID_LABEL;

type ListResponse = Result<Vec<ComputeInstance>, ComputeError>;

/// Scripted instance lister that returns pre-seeded responses in FIFO order.
///
/// Once the script is exhausted every further call returns an empty listing,
/// which is what a lookup sees while a worker is still being provisioned.
#[derive(Clone, Debug, Default)]
pub struct ScriptedLister {
    responses: Arc<Mutex<VecDeque<ListResponse>>>,
    requests: Arc<Mutex<Vec<ListInstancesRequest>>>,
}

impl ScriptedLister {
    /// Creates a lister with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful listing.
    pub fn push_instances(&self, instances: Vec<ComputeInstance>) {
        self.queue().push_back(Ok(instances));
    }

    /// Queues an empty listing.
    pub fn push_empty(&self) {
        self.push_instances(Vec::new());
    }

    /// Queues a failed listing.
    pub fn push_error(&self, error: ComputeError) {
        self.queue().push_back(Err(error));
    }

    /// Returns every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ListInstancesRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many listing calls were made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<ListResponse>> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl InstanceLister for ScriptedLister {
    fn list_instances<'a>(&'a self, request: &'a ListInstancesRequest) -> ListFuture<'a> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let next = self.queue().pop_front().unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { next })
    }
}

/// Builds a worker instance labelled with `job_id` and carrying `emails`.
#[must_use]
pub fn worker_instance(name: &str, job_id: &str, emails: &[&str]) -> ComputeInstance {
    ComputeInstance {
        id: format!("{name}-id"),
        name: name.to_owned(),
        labels: BTreeMap::from([(JOB_ID_LABEL.to_owned(), job_id.to_owned())]),
        service_accounts: emails.iter().map(|email| ServiceAccount::new(*email)).collect(),
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
