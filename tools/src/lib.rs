//! Adapters that expose typed operations as JSON-in/JSON-out tools for an
//! agent runtime.

mod error;
pub mod reddit;
mod registry;
pub mod repository;
pub mod speech;

use agentkit_lifecycle::ResourceLifecycleManager;

pub use error::ToolError;
pub use error::ToolResult;
pub use reddit::Post;
pub use reddit::RedditClient;
pub use reddit::RedditConfig;
pub use reddit::TopPostsTool;
pub use registry::Tool;
pub use registry::ToolDefinition;
pub use registry::ToolRegistry;
pub use repository::CreateRepositoryTool;
pub use repository::DeleteRepositoryTool;
pub use repository::ListRepositoriesTool;
pub use speech::SpeechClient;
pub use speech::SpeechConfig;
pub use speech::TextToSpeechTool;

/// Registry holding every built-in tool.
pub fn builtin_registry(
    manager: ResourceLifecycleManager,
    reddit: RedditClient,
    speech: SpeechClient,
) -> ToolResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(CreateRepositoryTool::new(manager.clone()))?;
    registry.register(DeleteRepositoryTool::new(manager.clone()))?;
    registry.register(ListRepositoriesTool::new(manager))?;
    registry.register(TopPostsTool::new(reddit))?;
    registry.register(TextToSpeechTool::new(speech))?;
    Ok(registry)
}
