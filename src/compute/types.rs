//! Compute Engine records consumed by the verifier.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Service account identity attached to a compute instance.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ServiceAccount {
    /// Email-like identifier (`<account-id>@<project>.iam.gserviceaccount.com`).
    #[serde(default)]
    pub email: String,
    /// OAuth scopes granted to the account on this instance.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl ServiceAccount {
    /// Creates an account entry with no scopes.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            scopes: Vec::new(),
        }
    }

    /// Returns the account id, i.e. the email portion before the first `@`.
    ///
    /// An email without `@` is returned whole.
    #[must_use]
    pub fn account_id(&self) -> &str {
        self.email
            .split_once('@')
            .map_or(self.email.as_str(), |(id, _)| id)
    }
}

/// Compute instance as returned by `instances.list`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeInstance {
    /// Provider assigned numeric identifier, serialised as a string.
    #[serde(default)]
    pub id: String,
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// User and system labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Attached service accounts.
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccount>,
}

impl ComputeInstance {
    /// Returns the label value for `key`, if present.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Parameters for a filtered instance listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListInstancesRequest {
    /// Project that owns the instances.
    pub project: String,
    /// Zone to list.
    pub zone: String,
    /// Filter expression in Compute list syntax.
    pub filter: String,
    /// Upper bound on returned items.
    pub max_results: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct InstanceList {
    #[serde(default)]
    pub(super) items: Vec<ComputeInstance>,
}
