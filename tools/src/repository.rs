//! Repository lifecycle operations exposed as tools.

use agentkit_lifecycle::OperationOutcome;
use agentkit_lifecycle::ResourceLifecycleManager;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_json::json;

use crate::error::ToolResult;
use crate::registry::Tool;
use crate::registry::parse_args;

pub const CREATE_REPOSITORY: &str = "create_repository";
pub const DELETE_REPOSITORY: &str = "delete_repository";
pub const LIST_REPOSITORIES: &str = "list_repositories";

/// Maps a lifecycle outcome to the tool result, turning `Failed` into an
/// error that names the repository and the remote status.
pub fn outcome_to_json(outcome: OperationOutcome) -> ToolResult<JsonValue> {
    let status = outcome.label();
    match outcome.into_result()? {
        OperationOutcome::Created(descriptor) => Ok(json!({
            "status": status,
            "repository": descriptor.full_name(),
            "descriptor": descriptor.as_json(),
        })),
        OperationOutcome::AlreadyExists { resource }
        | OperationOutcome::Deleted { resource }
        | OperationOutcome::NotFound { resource } => Ok(json!({
            "status": status,
            "repository": resource.full_name(),
        })),
        OperationOutcome::Failed(cause) => Err(cause.into()),
    }
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    private: bool,
}

#[derive(Debug, Clone)]
pub struct CreateRepositoryTool {
    manager: ResourceLifecycleManager,
}

impl CreateRepositoryTool {
    pub fn new(manager: ResourceLifecycleManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Tool for CreateRepositoryTool {
    fn name(&self) -> &str {
        CREATE_REPOSITORY
    }

    fn description(&self) -> &str {
        "Create a repository for the authenticated user unless one with the same name already exists"
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Repository name; the configured prefix is added automatically"},
                "description": {"type": "string"},
                "private": {"type": "boolean", "default": false}
            },
            "required": ["name"]
        })
    }

    async fn invoke(&self, args: JsonValue) -> ToolResult<JsonValue> {
        let args: CreateArgs = parse_args(self.name(), args)?;
        let outcome = self
            .manager
            .create_resource(&args.name, &args.description, args.private)
            .await?;
        outcome_to_json(outcome)
    }
}

#[derive(Debug, Deserialize)]
struct DeleteArgs {
    name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteRepositoryTool {
    manager: ResourceLifecycleManager,
}

impl DeleteRepositoryTool {
    pub fn new(manager: ResourceLifecycleManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Tool for DeleteRepositoryTool {
    fn name(&self) -> &str {
        DELETE_REPOSITORY
    }

    fn description(&self) -> &str {
        "Delete a repository owned by the authenticated user; a missing repository is reported as not_found"
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Exact repository name"}
            },
            "required": ["name"]
        })
    }

    async fn invoke(&self, args: JsonValue) -> ToolResult<JsonValue> {
        let args: DeleteArgs = parse_args(self.name(), args)?;
        let outcome = self.manager.delete_resource(&args.name).await?;
        outcome_to_json(outcome)
    }
}

#[derive(Debug, Clone)]
pub struct ListRepositoriesTool {
    manager: ResourceLifecycleManager,
}

impl ListRepositoriesTool {
    pub fn new(manager: ResourceLifecycleManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Tool for ListRepositoriesTool {
    fn name(&self) -> &str {
        LIST_REPOSITORIES
    }

    fn description(&self) -> &str {
        "List repositories of the authenticated user that were created by agents"
    }

    fn input_schema(&self) -> JsonValue {
        json!({"type": "object", "properties": {}})
    }

    async fn invoke(&self, _args: JsonValue) -> ToolResult<JsonValue> {
        let names: Vec<String> = self
            .manager
            .list_resources()
            .await?
            .iter()
            .filter_map(|descriptor| descriptor.name().map(str::to_string))
            .collect();
        Ok(json!(names))
    }
}
