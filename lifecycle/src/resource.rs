use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// The authenticated actor whose namespace resources live under.
///
/// Resolved fresh for every operation; never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub owner: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(owner: &Principal, name: impl Into<String>) -> Self {
        Self {
            owner: owner.identity.clone(),
            name: name.into(),
        }
    }

    /// `owner/name`, as used in remote paths.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Remote state returned by the create endpoint, relayed as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceDescriptor(pub JsonValue);

impl ResourceDescriptor {
    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_json(self) -> JsonValue {
        self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(JsonValue::as_str)
    }

    /// `owner/name` as reported by the remote, falling back to the bare name.
    pub fn full_name(&self) -> Option<&str> {
        self.0
            .get("full_name")
            .and_then(JsonValue::as_str)
            .or_else(|| self.name())
    }
}

/// Remote failure classified by status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error("conflict creating `{resource}`: created by another actor after the existence check (status {status}): {body}")]
    Conflict {
        resource: ResourceRef,
        status: u16,
        body: String,
    },

    #[error("request for `{resource}` failed with status {status}: {body}")]
    Http {
        resource: ResourceRef,
        status: u16,
        body: String,
    },
}

impl FailureCause {
    pub fn status(&self) -> u16 {
        match self {
            FailureCause::Conflict { status, .. } | FailureCause::Http { status, .. } => *status,
        }
    }

    pub fn resource(&self) -> &ResourceRef {
        match self {
            FailureCause::Conflict { resource, .. } | FailureCause::Http { resource, .. } => {
                resource
            }
        }
    }
}

/// Result of one create or delete call. Produced per call, never retained.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Created(ResourceDescriptor),
    AlreadyExists { resource: ResourceRef },
    Deleted { resource: ResourceRef },
    NotFound { resource: ResourceRef },
    Failed(FailureCause),
}

impl OperationOutcome {
    /// Short label used in telemetry and tool output.
    pub fn label(&self) -> &'static str {
        match self {
            OperationOutcome::Created(_) => "created",
            OperationOutcome::AlreadyExists { .. } => "already_exists",
            OperationOutcome::Deleted { .. } => "deleted",
            OperationOutcome::NotFound { .. } => "not_found",
            OperationOutcome::Failed(FailureCause::Conflict { .. }) => "conflict",
            OperationOutcome::Failed(FailureCause::Http { .. }) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, OperationOutcome::Failed(_))
    }

    /// Splits the outcome into the normal terminal states and failures.
    pub fn into_result(self) -> Result<OperationOutcome, FailureCause> {
        match self {
            OperationOutcome::Failed(cause) => Err(cause),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn demo_ref() -> ResourceRef {
        let owner = Principal {
            identity: "octocat".to_string(),
        };
        ResourceRef::new(&owner, "agent-demo")
    }

    #[test]
    fn failure_message_names_resource_and_status() {
        let cause = FailureCause::Http {
            resource: demo_ref(),
            status: 500,
            body: "boom".to_string(),
        };
        let message = cause.to_string();
        assert!(message.contains("octocat/agent-demo"));
        assert!(message.contains("500"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn into_result_separates_failures() {
        let ok = OperationOutcome::NotFound {
            resource: demo_ref(),
        };
        assert_eq!(ok.clone().into_result(), Ok(ok));

        let failed = OperationOutcome::Failed(FailureCause::Conflict {
            resource: demo_ref(),
            status: 422,
            body: String::new(),
        });
        assert_eq!(failed.label(), "conflict");
        assert_eq!(failed.into_result().unwrap_err().status(), 422);
    }

    #[test]
    fn descriptor_full_name_falls_back_to_name() {
        let full = ResourceDescriptor(serde_json::json!({
            "name": "agent-demo",
            "full_name": "octocat/agent-demo"
        }));
        assert_eq!(full.full_name(), Some("octocat/agent-demo"));

        let bare = ResourceDescriptor(serde_json::json!({"name": "agent-demo"}));
        assert_eq!(bare.full_name(), Some("agent-demo"));
    }
}
