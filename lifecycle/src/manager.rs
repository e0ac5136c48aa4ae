use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_json::json;
use tracing::debug;

use crate::config::LifecycleConfig;
use crate::config::NamingPolicy;
use crate::config::validate_name;
use crate::error::AuthError;
use crate::error::LifecycleError;
use crate::error::LifecycleResult;
use crate::resource::FailureCause;
use crate::resource::OperationOutcome;
use crate::resource::Principal;
use crate::resource::ResourceDescriptor;
use crate::resource::ResourceRef;
use crate::telemetry::record_result;
use crate::transport::HttpRequest;
use crate::transport::HttpResponse;
use crate::transport::Method;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const LIST_PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct IdentityBody {
    login: Option<String>,
    identity: Option<String>,
}

/// Create-if-absent / delete-if-present over an owner-scoped repository
/// namespace.
///
/// No retries: every non-2xx response is classified and returned. The
/// window between the existence check and the create call is detected
/// (as [`FailureCause::Conflict`]) but not prevented.
#[derive(Clone)]
pub struct ResourceLifecycleManager {
    config: Arc<LifecycleConfig>,
    transport: Arc<dyn Transport>,
}

impl ResourceLifecycleManager {
    pub fn new(config: LifecycleConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Manager backed by a reqwest client using the configured timeout.
    pub fn with_reqwest(config: LifecycleConfig) -> LifecycleResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn naming(&self) -> &NamingPolicy {
        &self.config.naming
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Looks up the login of the configured credential.
    pub async fn resolve_owner(&self) -> LifecycleResult<Principal> {
        let url = self.url("/user");
        let request = self.authorized(Method::Get, &url)?;
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status,
                body: response.text(),
            }
            .into());
        }

        let body: IdentityBody = response
            .json()
            .map_err(|err| LifecycleError::decode(&url, err))?;
        let identity = body
            .login
            .or(body.identity)
            .filter(|login| !login.trim().is_empty())
            .ok_or(AuthError::MissingIdentity)?;
        debug!(identity = %identity, "resolved owner");
        Ok(Principal { identity })
    }

    /// Creates `{prefix}{name}` under the authenticated owner unless it
    /// already exists.
    ///
    /// Returns `AlreadyExists` without issuing the create call when the
    /// existence check finds the resource.
    ///
    /// Emits one telemetry event once the owner is resolved, whether the
    /// call then succeeds or errors. Name and credential failures emit none.
    pub async fn create_resource(
        &self,
        name: &str,
        description: &str,
        private: bool,
    ) -> LifecycleResult<OperationOutcome> {
        let started = Instant::now();
        let name = self.config.naming.apply(name)?;
        let owner = self.resolve_owner().await?;
        let resource = ResourceRef::new(&owner, name);

        let full_name = resource.full_name();
        let result = self.create_for(resource, description, private).await;
        record_result("create", &full_name, started.elapsed(), &result);
        result
    }

    async fn create_for(
        &self,
        resource: ResourceRef,
        description: &str,
        private: bool,
    ) -> LifecycleResult<OperationOutcome> {
        let check = self
            .send(Method::Get, &self.repo_path(&resource), None)
            .await?;
        if check.is_success() {
            return Ok(OperationOutcome::AlreadyExists { resource });
        }
        if check.status != 404 {
            return Ok(OperationOutcome::Failed(FailureCause::Http {
                resource,
                status: check.status,
                body: check.text(),
            }));
        }

        let mut payload = json!({
            "name": resource.name,
            "private": private,
        });
        let description = description.trim();
        if !description.is_empty() {
            payload["description"] = JsonValue::String(description.to_string());
        }

        let url = self.url("/user/repos");
        let created = self.send(Method::Post, "/user/repos", Some(payload)).await?;
        if created.is_success() {
            let descriptor: JsonValue = created
                .json()
                .map_err(|err| LifecycleError::decode(&url, err))?;
            return Ok(OperationOutcome::Created(ResourceDescriptor(descriptor)));
        }

        let body = created.text();
        if is_conflict(created.status, &body) {
            Ok(OperationOutcome::Failed(FailureCause::Conflict {
                resource,
                status: created.status,
                body,
            }))
        } else {
            Ok(OperationOutcome::Failed(FailureCause::Http {
                resource,
                status: created.status,
                body,
            }))
        }
    }

    /// Deletes `name` (used verbatim) under the authenticated owner.
    ///
    /// A 404 is reported as `NotFound`, which is a normal terminal state.
    pub async fn delete_resource(&self, name: &str) -> LifecycleResult<OperationOutcome> {
        let started = Instant::now();
        let name = validate_name(name)?.to_string();
        let owner = self.resolve_owner().await?;
        let resource = ResourceRef::new(&owner, name);

        let full_name = resource.full_name();
        let result = self.delete_for(resource).await;
        record_result("delete", &full_name, started.elapsed(), &result);
        result
    }

    async fn delete_for(&self, resource: ResourceRef) -> LifecycleResult<OperationOutcome> {
        let response = self
            .send(Method::Delete, &self.repo_path(&resource), None)
            .await?;
        let outcome = match response.status {
            404 => OperationOutcome::NotFound { resource },
            status if response.is_success() => {
                if status != 204 {
                    debug!(status, resource = %resource, "delete returned unexpected success status");
                }
                OperationOutcome::Deleted { resource }
            }
            status => OperationOutcome::Failed(FailureCause::Http {
                resource,
                status,
                body: response.text(),
            }),
        };
        Ok(outcome)
    }

    /// Lists resources owned by the principal whose names carry the naming
    /// prefix. Only the first page (up to 100 entries) is fetched.
    ///
    /// Costs two requests: the owner is resolved first, so a rejected
    /// credential surfaces as [`AuthError::Rejected`] like every other
    /// operation and a listing failure names `owner/*`.
    pub async fn list_resources(&self) -> LifecycleResult<Vec<ResourceDescriptor>> {
        let owner = self.resolve_owner().await?;
        let url = self.url("/user/repos");
        let request = self
            .authorized(Method::Get, &url)?
            .query("affiliation", "owner")
            .query("per_page", LIST_PAGE_SIZE);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let resource = ResourceRef::new(&owner, "*");
            return Err(LifecycleError::Remote(FailureCause::Http {
                resource,
                status: response.status,
                body: response.text(),
            }));
        }

        let entries: Vec<JsonValue> = response
            .json()
            .map_err(|err| LifecycleError::decode(&url, err))?;
        let naming = &self.config.naming;
        Ok(entries
            .into_iter()
            .map(ResourceDescriptor)
            .filter(|descriptor| descriptor.name().is_some_and(|name| naming.matches(name)))
            .collect())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> LifecycleResult<HttpResponse> {
        let mut request = self.authorized(method, &self.url(path))?;
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(self.transport.send(request).await?)
    }

    fn authorized(&self, method: Method, url: &str) -> LifecycleResult<HttpRequest> {
        let credential = self
            .config
            .credential
            .as_ref()
            .ok_or(AuthError::MissingCredential)?;
        Ok(HttpRequest::new(method, url)
            .header(
                "Authorization",
                format!("Bearer {}", credential.expose_secret()),
            )
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", self.config.user_agent.as_str()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    fn repo_path(&self, resource: &ResourceRef) -> String {
        format!("/repos/{}/{}", resource.owner, resource.name)
    }
}

impl std::fmt::Debug for ResourceLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLifecycleManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A create response that means "somebody else got there first".
fn is_conflict(status: u16, body: &str) -> bool {
    match status {
        409 => true,
        422 => body.to_ascii_lowercase().contains("already exists"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_classification() {
        assert!(is_conflict(409, ""));
        assert!(is_conflict(
            422,
            r#"{"message":"Repository creation failed.","errors":[{"message":"name already exists on this account"}]}"#
        ));
        assert!(!is_conflict(422, r#"{"message":"Validation Failed"}"#));
        assert!(!is_conflict(500, "already exists"));
    }
}
