use std::path::PathBuf;

use agentkit_lifecycle::FailureCause;
use agentkit_lifecycle::LifecycleError;
use agentkit_lifecycle::TransportError;
use thiserror::Error;

pub type ToolResult<T, E = ToolError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    #[error("tool `{0}` is already registered")]
    DuplicateTool(String),

    #[error("invalid arguments for `{tool}`: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{service} request for `{subject}` failed with status {status}: {body}")]
    Remote {
        service: &'static str,
        subject: String,
        status: u16,
        body: String,
    },

    #[error("unexpected {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("I/O error while writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<FailureCause> for ToolError {
    fn from(cause: FailureCause) -> Self {
        Self::Lifecycle(LifecycleError::Remote(cause))
    }
}
