//! Job id lookup from a Terraform state file.
//!
//! After `terraform apply` the flex template job's id lives in the state
//! file. This module resolves a resource address such as
//! `google_dataflow_flex_template_job.big_data` (optionally prefixed with
//! `module.<name>.`) to the primary id of its first instance.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading a job id from state.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum StateError {
    /// Raised when the state file cannot be read.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the state file is not valid state JSON.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
    /// Raised when the address is not a `[module.<m>.]<type>.<name>` address.
    #[error("invalid resource address {address:?}")]
    InvalidAddress {
        /// Address passed by the caller.
        address: String,
    },
    /// Raised when no managed resource has the requested address.
    #[error("resource {address:?} not in state")]
    ResourceNotInState {
        /// Address passed by the caller.
        address: String,
    },
    /// Raised when the resource exists but has no id.
    #[error("resource {address:?} does not have an ID set")]
    MissingId {
        /// Address passed by the caller.
        address: String,
    },
}

#[derive(Debug, Deserialize)]
struct StateDocument {
    #[serde(default)]
    resources: Vec<StateResource>,
}

#[derive(Debug, Deserialize)]
struct StateResource {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    mode: String,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    instances: Vec<StateInstance>,
}

#[derive(Debug, Deserialize)]
struct StateInstance {
    #[serde(default)]
    attributes: Value,
}

/// Parsed resource address.
#[derive(Clone, Debug, Eq, PartialEq)]
struct ResourceAddress<'a> {
    module: Option<&'a str>,
    kind: &'a str,
    name: &'a str,
}

impl<'a> ResourceAddress<'a> {
    fn parse(address: &'a str) -> Option<Self> {
        let (module, local) = match address.strip_prefix("module.") {
            Some(rest) => {
                let (module_name, tail) = rest.split_once('.')?;
                (Some(module_name), tail)
            }
            None => (None, address),
        };
        let (kind, name) = local.split_once('.')?;
        if kind.is_empty() || name.is_empty() || name.contains('.') {
            return None;
        }
        Some(Self { module, kind, name })
    }

    fn matches(&self, resource: &StateResource) -> bool {
        let module_matches = match (self.module, resource.module.as_deref()) {
            (None, None) => true,
            (Some(wanted), Some(actual)) => actual == format!("module.{wanted}"),
            _ => false,
        };
        module_matches
            && resource.mode == "managed"
            && resource.kind == self.kind
            && resource.name == self.name
    }
}

/// Returns the primary id of `address` from state JSON held in memory.
///
/// # Errors
///
/// Returns [`StateError::InvalidAddress`], [`StateError::ResourceNotInState`]
/// or [`StateError::MissingId`]; `path` is only used to label parse errors.
pub fn job_id_from_state_str(
    path: &Utf8Path,
    contents: &str,
    address: &str,
) -> Result<String, StateError> {
    let parsed = ResourceAddress::parse(address).ok_or_else(|| StateError::InvalidAddress {
        address: address.to_owned(),
    })?;
    let document: StateDocument =
        serde_json::from_str(contents).map_err(|err| StateError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let resource = document
        .resources
        .iter()
        .find(|resource| parsed.matches(resource))
        .ok_or_else(|| StateError::ResourceNotInState {
            address: address.to_owned(),
        })?;

    resource
        .instances
        .first()
        .and_then(|instance| instance.attributes.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| StateError::MissingId {
            address: address.to_owned(),
        })
}

/// Reads the state file at `path` and returns the primary id of `address`.
///
/// # Errors
///
/// Returns [`StateError::Io`] when the file cannot be read, plus any error
/// from [`job_id_from_state_str`].
pub fn job_id_from_state_file(path: &Utf8Path, address: &str) -> Result<String, StateError> {
    let contents = read_state(path)?;
    job_id_from_state_str(path, &contents, address)
}

fn read_state(path: &Utf8Path) -> Result<String, StateError> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| StateError::Io {
        path: path.to_path_buf(),
        message: String::from("state file path is missing a filename"),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| StateError::Io {
        path: parent.to_path_buf(),
        message: err.to_string(),
    })?;

    dir.read_to_string(file_name).map_err(|err| StateError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
