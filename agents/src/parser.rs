use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::builder::AgentBuilder;
use crate::error::AgentValidationError;
use crate::error::ParserError;
use crate::spec::AgentKind;
use crate::spec::AgentSpec;
use crate::spec::GenerationConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Frontmatter {
    name: Option<String>,
    description: Option<String>,
    model: Option<String>,
    #[serde(default)]
    kind: AgentKind,
    tools: Option<Vec<String>>,
    sub_agents: Option<Vec<String>>,
    output_key: Option<String>,
    generation: Option<GenerationConfig>,
    instructions_file: Option<String>,
}

const FRONTMATTER_DELIM: &str = "---";

pub fn parse_agent_file(path: &Path) -> Result<AgentSpec, ParserError> {
    let contents = fs::read_to_string(path)?;
    parse_agent_str(&contents, path)
}

/// Parses a Markdown agent definition. `path` locates the definition and
/// anchors a relative `instructions_file`.
pub fn parse_agent_str(contents: &str, path: &Path) -> Result<AgentSpec, ParserError> {
    let normalized = contents.replace("\r\n", "\n");
    let (frontmatter_raw, body) = split_frontmatter(&normalized)?;
    let frontmatter: Frontmatter =
        serde_yaml::from_str(frontmatter_raw).map_err(ParserError::InvalidFrontmatter)?;

    let name = frontmatter
        .name
        .ok_or(AgentValidationError::MissingField("name"))?;

    let body = body.trim();
    let (instructions, instructions_path) = match frontmatter.instructions_file {
        Some(_) if !body.is_empty() => {
            return Err(AgentValidationError::ConflictingInstructions.into());
        }
        Some(file) => {
            let resolved = resolve_instructions_path(path, &file);
            (load_instructions(&resolved)?, Some(resolved))
        }
        None => (body.to_string(), None),
    };

    let mut builder = AgentBuilder::new(name)
        .description(frontmatter.description)
        .model(frontmatter.model)
        .kind(frontmatter.kind)
        .output_key(frontmatter.output_key)
        .generation(frontmatter.generation)
        .source_path(path)
        .instructions(instructions);

    if let Some(instructions_path) = instructions_path {
        builder = builder.instructions_path(instructions_path);
    }
    if let Some(tools) = frontmatter.tools {
        builder = builder.tools(tools);
    }
    if let Some(sub_agents) = frontmatter.sub_agents {
        builder = builder.sub_agents(sub_agents);
    }

    Ok(builder.build()?)
}

/// Resolves an `instructions_file` entry relative to the agent definition.
fn resolve_instructions_path(agent_path: &Path, file: &str) -> PathBuf {
    let relative = Path::new(file.trim());
    match agent_path.parent() {
        Some(dir) if relative.is_relative() => dir.join(relative),
        _ => relative.to_path_buf(),
    }
}

fn load_instructions(path: &Path) -> Result<String, ParserError> {
    fs::read_to_string(path).map_err(|source| ParserError::InstructionsFile {
        path: path.to_path_buf(),
        source,
    })
}

fn split_frontmatter(contents: &str) -> Result<(&str, &str), ParserError> {
    let trimmed = contents.trim_start_matches('\u{feff}');

    let rest = trimmed
        .strip_prefix(FRONTMATTER_DELIM)
        .and_then(|rest| rest.strip_prefix('\n'))
        .ok_or(ParserError::MissingFrontmatter)?;

    if let Some(frontmatter) = rest.strip_prefix("---") {
        // Empty front matter block.
        let body = frontmatter.strip_prefix('\n').unwrap_or(frontmatter);
        return Ok(("", body));
    }

    if let Some(idx) = rest.find("\n---") {
        let frontmatter = &rest[..idx];
        let after = &rest[idx + 4..];
        let body = after.strip_prefix('\n').unwrap_or(after);
        Ok((frontmatter.trim(), body))
    } else {
        Err(ParserError::MissingFrontmatter)
    }
}
