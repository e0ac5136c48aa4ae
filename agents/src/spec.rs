use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Instruction-driven agent bound to a model and a tool list.
    #[default]
    Llm,
    /// Runs its sub-agents one after another; has no instructions of its own.
    Sequential,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Llm => write!(f, "llm"),
            AgentKind::Sequential => write!(f, "sequential"),
        }
    }
}

/// Sampling settings forwarded to the model provider.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// A prompt-defined agent: instructions bound to a model identifier and a
/// list of tools and sub-agents it may delegate to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSpec {
    pub name: String,
    pub description: Option<String>,
    pub model: Option<String>,
    pub kind: AgentKind,
    pub instructions: String,
    pub tools: Vec<String>,
    pub sub_agents: Vec<String>,
    pub output_key: Option<String>,
    pub generation: Option<GenerationConfig>,
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
    /// File the instructions were loaded from, when not inline.
    #[serde(skip)]
    pub instructions_path: Option<PathBuf>,
}

impl AgentSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn sub_agents(&self) -> &[String] {
        &self.sub_agents
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn instructions_path(&self) -> Option<&Path> {
        self.instructions_path.as_deref()
    }
}
