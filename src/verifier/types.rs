//! Identifier types for the verifier.

use std::fmt;

use super::VerifyError;

/// Opaque Dataflow job identifier, used as a label value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JobId(String);

impl JobId {
    /// Wraps a job identifier.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::InvalidInput`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, VerifyError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(VerifyError::InvalidInput(String::from("job id")));
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
