//! Prompt-defined agent catalog: Markdown definitions with YAML front matter,
//! a directory-backed registry, and reference checks against known tools.

mod builder;
mod error;
mod parser;
mod references;
mod registry;
mod spec;

pub use builder::AgentBuilder;
pub use builder::validate_agent_name;
pub use error::AgentParseError;
pub use error::AgentValidationError;
pub use error::ParserError;
pub use error::RegistryError;
pub use parser::parse_agent_file;
pub use parser::parse_agent_str;
pub use references::ReferenceIssue;
pub use references::check_references;
pub use registry::AgentRegistry;
pub use registry::ReloadReport;
pub use spec::AgentKind;
pub use spec::AgentSpec;
pub use spec::GenerationConfig;
