//! Compute Engine instance listing.
//!
//! The verifier only needs one call from the Compute API: list the instances
//! of a zone with a filter expression and a result cap. [`InstanceLister`] is
//! that seam; [`ComputeClient`] implements it over the REST endpoint.

mod error;
mod types;

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use crate::config::GoogleConfig;

pub use error::ComputeError;
pub use types::{ComputeInstance, ListInstancesRequest, ServiceAccount};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Future returned by [`InstanceLister`] operations.
pub type ListFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<ComputeInstance>, ComputeError>> + Send + 'a>>;

/// Lists compute instances matching a filter.
pub trait InstanceLister {
    /// Returns at most `request.max_results` instances matching
    /// `request.filter` in the given project and zone.
    fn list_instances<'a>(&'a self, request: &'a ListInstancesRequest) -> ListFuture<'a>;
}

/// [`InstanceLister`] backed by the Compute Engine REST API.
#[derive(Clone, Debug)]
pub struct ComputeClient {
    endpoint: String,
    access_token: String,
}

impl ComputeClient {
    /// Creates a client for `endpoint` authenticating with `access_token`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
            access_token: access_token.into(),
        }
    }

    /// Creates a client from loaded configuration.
    #[must_use]
    pub fn from_config(config: &GoogleConfig) -> Self {
        Self::new(&config.compute_endpoint, &config.access_token)
    }

    /// Builds the `instances.list` URL for a project and zone.
    ///
    /// `project` and `zone` are appended as single path segments, so any `/`
    /// or space in them is percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Endpoint`] when the endpoint cannot be parsed
    /// as a base URL.
    pub fn instances_url(&self, project: &str, zone: &str) -> Result<Url, ComputeError> {
        let invalid = |message: String| ComputeError::Endpoint {
            endpoint: self.endpoint.clone(),
            message,
        };
        let mut url = Url::parse(&self.endpoint).map_err(|err| invalid(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid(String::from("endpoint cannot be a base URL")))?
            .pop_if_empty()
            .extend(["projects", project, "zones", zone, "instances"]);
        Ok(url)
    }

    async fn fetch(
        &self,
        request: &ListInstancesRequest,
    ) -> Result<Vec<ComputeInstance>, ComputeError> {
        let url = self.instances_url(&request.project, &request.zone)?;
        debug!(%url, filter = %request.filter, "listing instances");

        let max_results = request.max_results.to_string();
        let response = HTTP_CLIENT
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .query(&[
                ("filter", request.filter.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|err| ComputeError::Http {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| ComputeError::Http {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        if !status.is_success() {
            return Err(ComputeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_instance_list(&body)
    }
}

impl InstanceLister for ComputeClient {
    fn list_instances<'a>(&'a self, request: &'a ListInstancesRequest) -> ListFuture<'a> {
        Box::pin(self.fetch(request))
    }
}

/// Decodes an `instances.list` response body.
///
/// The API omits `items` entirely when nothing matches.
///
/// # Errors
///
/// Returns [`ComputeError::Decode`] when the body is not a valid list
/// document.
pub fn parse_instance_list(body: &str) -> Result<Vec<ComputeInstance>, ComputeError> {
    serde_json::from_str::<types::InstanceList>(body)
        .map(|list| list.items)
        .map_err(|err| ComputeError::Decode {
            message: err.to_string(),
        })
}
