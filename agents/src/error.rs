use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid agent name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("tool names must not be empty")]
    EmptyTool,

    #[error("duplicate tool `{0}`")]
    DuplicateTool(String),

    #[error("duplicate sub-agent `{0}`")]
    DuplicateSubAgent(String),

    #[error("sequential agent `{0}` needs at least one sub-agent")]
    EmptySequence(String),

    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("max_output_tokens must be greater than zero")]
    InvalidMaxOutputTokens,

    #[error("instructions_file and an instruction body cannot both be set")]
    ConflictingInstructions,
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("agent definition must start with YAML front matter delimited by `---`")]
    MissingFrontmatter,

    #[error("invalid front matter: {0}")]
    InvalidFrontmatter(#[source] serde_yaml::Error),

    #[error(transparent)]
    Validation(#[from] AgentValidationError),

    #[error("failed to read instructions file {path:?}: {source}")]
    InstructionsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("I/O error while scanning {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file parse failure recorded during a registry reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentParseError {
    pub path: PathBuf,
    pub message: String,
}

impl AgentParseError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
