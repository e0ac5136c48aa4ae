use std::collections::BTreeSet;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::AgentValidationError;
use crate::spec::AgentKind;
use crate::spec::AgentSpec;
use crate::spec::GenerationConfig;

#[derive(Debug, Default)]
pub struct AgentBuilder {
    name: Option<String>,
    description: Option<String>,
    model: Option<String>,
    kind: AgentKind,
    instructions: Option<String>,
    tools: Vec<String>,
    sub_agents: Vec<String>,
    output_key: Option<String>,
    generation: Option<GenerationConfig>,
    source_path: Option<PathBuf>,
    instructions_path: Option<PathBuf>,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<Option<String>>) -> Self {
        self.description = description.into();
        self
    }

    pub fn model(mut self, model: impl Into<Option<String>>) -> Self {
        self.model = model.into();
        self
    }

    pub fn kind(mut self, kind: AgentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn sub_agents<I, S>(mut self, sub_agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_agents = sub_agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn output_key(mut self, output_key: impl Into<Option<String>>) -> Self {
        self.output_key = output_key.into();
        self
    }

    pub fn generation(mut self, generation: impl Into<Option<GenerationConfig>>) -> Self {
        self.generation = generation.into();
        self
    }

    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn instructions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.instructions_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<AgentSpec, AgentValidationError> {
        let name = self.name.ok_or(AgentValidationError::MissingField("name"))?;
        validate_agent_name(&name)?;

        let instructions = self
            .instructions
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        let sub_agents = normalize_sub_agents(self.sub_agents)?;
        match self.kind {
            AgentKind::Llm if instructions.is_empty() => {
                return Err(AgentValidationError::MissingField("instructions"));
            }
            AgentKind::Sequential if sub_agents.is_empty() => {
                return Err(AgentValidationError::EmptySequence(name));
            }
            _ => {}
        }

        let tools = normalize_tools(self.tools)?;
        if let Some(generation) = &self.generation {
            validate_generation(generation)?;
        }

        Ok(AgentSpec {
            name,
            description: normalize_optional(self.description),
            model: normalize_optional(self.model),
            kind: self.kind,
            instructions,
            tools,
            sub_agents,
            output_key: normalize_optional(self.output_key),
            generation: self.generation,
            source_path: self.source_path,
            instructions_path: self.instructions_path,
        })
    }
}

pub fn validate_agent_name(name: &str) -> Result<(), AgentValidationError> {
    static NAME_RE: Lazy<Option<Regex>> =
        Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_-]{2,63}$").ok());
    if NAME_RE.as_ref().is_some_and(|re| re.is_match(name)) {
        Ok(())
    } else {
        Err(AgentValidationError::InvalidName {
            name: name.to_string(),
            reason: "name must start with a lowercase letter, include only lowercase letters, digits, hyphen, or underscore, and be 3-64 characters long".to_string(),
        })
    }
}

fn validate_generation(generation: &GenerationConfig) -> Result<(), AgentValidationError> {
    if let Some(temperature) = generation.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(AgentValidationError::InvalidTemperature(temperature));
    }
    if generation.max_output_tokens == Some(0) {
        return Err(AgentValidationError::InvalidMaxOutputTokens);
    }
    Ok(())
}

fn normalize_tools(items: Vec<String>) -> Result<Vec<String>, AgentValidationError> {
    let mut seen = BTreeSet::new();
    let mut output = Vec::new();
    for raw in items {
        let trimmed = raw.trim().to_string();
        if trimmed.is_empty() {
            return Err(AgentValidationError::EmptyTool);
        }
        if !seen.insert(trimmed.clone()) {
            return Err(AgentValidationError::DuplicateTool(trimmed));
        }
        output.push(trimmed);
    }
    Ok(output)
}

fn normalize_sub_agents(items: Vec<String>) -> Result<Vec<String>, AgentValidationError> {
    let mut seen = BTreeSet::new();
    let mut output = Vec::new();
    for raw in items {
        let trimmed = raw.trim().to_string();
        validate_agent_name(&trimmed)?;
        if !seen.insert(trimmed.clone()) {
            return Err(AgentValidationError::DuplicateSubAgent(trimmed));
        }
        output.push(trimmed);
    }
    Ok(output)
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
