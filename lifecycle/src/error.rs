use thiserror::Error;

use crate::resource::FailureCause;
use crate::transport::TransportError;

pub type LifecycleResult<T, E = LifecycleError> = Result<T, E>;

/// Errors raised before or around a remote call, as opposed to remote
/// failures that are classified into an [`crate::OperationOutcome`].
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("invalid resource name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Remote(#[from] FailureCause),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no credential configured; set GITHUB_TOKEN before calling the remote API")]
    MissingCredential,

    #[error("credential rejected by identity endpoint (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("identity endpoint response did not contain a login")]
    MissingIdentity,
}

impl LifecycleError {
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }
}
