use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use agentkit_lifecycle::AuthError;
use agentkit_lifecycle::FailureCause;
use agentkit_lifecycle::HttpRequest;
use agentkit_lifecycle::HttpResponse;
use agentkit_lifecycle::LifecycleConfig;
use agentkit_lifecycle::LifecycleError;
use agentkit_lifecycle::Method;
use agentkit_lifecycle::NamingPolicy;
use agentkit_lifecycle::OperationOutcome;
use agentkit_lifecycle::ResourceLifecycleManager;
use agentkit_lifecycle::Transport;
use agentkit_lifecycle::TransportError;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

const BASE: &str = "http://fake.test";
const TOKEN: &str = "test-token";
const OWNER: &str = "octocat";

/// In-memory stand-in for the remote API that remembers which repositories
/// exist and counts every call.
#[derive(Default)]
struct FakeRemote {
    repos: Mutex<BTreeSet<String>>,
    requests: Mutex<Vec<HttpRequest>>,
    check_status: Mutex<Option<u16>>,
    create_response: Mutex<Option<HttpResponse>>,
}

impl FakeRemote {
    fn with_repo(self, name: &str) -> Self {
        self.repos.lock().unwrap().insert(name.to_string());
        self
    }

    fn force_check_status(&self, status: u16) {
        *self.check_status.lock().unwrap() = Some(status);
    }

    fn force_create_response(&self, response: HttpResponse) {
        *self.create_response.lock().unwrap() = Some(response);
    }

    fn count(&self, method: Method, path_prefix: &str) -> usize {
        let prefix = format!("{BASE}{path_prefix}");
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.method == method && req.url.starts_with(&prefix))
            .count()
    }

    fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeRemote {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let authorized = request.header_value("Authorization") == Some("Bearer test-token");
        let path = request.url.strip_prefix(BASE).unwrap_or_default().to_string();
        let repo_path = format!("/repos/{OWNER}/");

        let response = match (request.method, path.as_str()) {
            (_, _) if !authorized => HttpResponse::new(401, r#"{"message":"Bad credentials"}"#),
            (Method::Get, "/user") => HttpResponse::new(200, json!({"login": OWNER}).to_string()),
            (Method::Get, "/user/repos") => {
                let repos = self.repos.lock().unwrap();
                let body: Vec<_> = repos.iter().map(|name| json!({"name": name})).collect();
                HttpResponse::new(200, serde_json::to_vec(&body).unwrap())
            }
            (Method::Get, p) if p.starts_with(&repo_path) => {
                if let Some(status) = *self.check_status.lock().unwrap() {
                    HttpResponse::new(status, "forced")
                } else if self.repos.lock().unwrap().contains(&p[repo_path.len()..]) {
                    HttpResponse::new(200, json!({"name": &p[repo_path.len()..]}).to_string())
                } else {
                    HttpResponse::new(404, r#"{"message":"Not Found"}"#)
                }
            }
            (Method::Post, "/user/repos") => {
                if let Some(forced) = self.create_response.lock().unwrap().clone() {
                    forced
                } else {
                    let body = request.body.clone().unwrap_or_default();
                    let name = body["name"].as_str().unwrap_or_default().to_string();
                    let mut repos = self.repos.lock().unwrap();
                    if repos.insert(name.clone()) {
                        HttpResponse::new(
                            201,
                            json!({"name": name, "private": body["private"]}).to_string(),
                        )
                    } else {
                        HttpResponse::new(
                            422,
                            r#"{"errors":[{"message":"name already exists on this account"}]}"#,
                        )
                    }
                }
            }
            (Method::Delete, p) if p.starts_with(&repo_path) => {
                if self.repos.lock().unwrap().remove(&p[repo_path.len()..]) {
                    HttpResponse::new(204, "")
                } else {
                    HttpResponse::new(404, r#"{"message":"Not Found"}"#)
                }
            }
            _ => HttpResponse::new(500, "unexpected route"),
        };
        Ok(response)
    }
}

fn manager_with(remote: &Arc<FakeRemote>, token: Option<&str>) -> ResourceLifecycleManager {
    let config = LifecycleConfig::new(token.map(str::to_string)).with_api_base(BASE);
    ResourceLifecycleManager::new(config, remote.clone())
}

fn manager(remote: &Arc<FakeRemote>) -> ResourceLifecycleManager {
    manager_with(remote, Some(TOKEN))
}

#[tokio::test]
async fn create_returns_remote_descriptor() {
    let remote = Arc::new(FakeRemote::default());
    let config = LifecycleConfig::new(Some(TOKEN.to_string()))
        .with_api_base(BASE)
        .with_naming(NamingPolicy::new("prefix-"));
    let manager = ResourceLifecycleManager::new(config, remote.clone());

    let outcome = manager.create_resource("demo", "desc", false).await.unwrap();

    match outcome {
        OperationOutcome::Created(descriptor) => assert_eq!(
            descriptor.into_json(),
            json!({"name": "prefix-demo", "private": false})
        ),
        other => panic!("expected Created, got {other:?}"),
    }
    assert_eq!(remote.count(Method::Post, "/user/repos"), 1);
}

#[tokio::test]
async fn second_create_reports_already_exists_without_mutation() {
    let remote = Arc::new(FakeRemote::default());
    let manager = manager(&remote);

    let first = manager.create_resource("demo", "", true).await.unwrap();
    let second = manager.create_resource("demo", "", true).await.unwrap();

    assert!(matches!(first, OperationOutcome::Created(_)));
    match second {
        OperationOutcome::AlreadyExists { resource } => {
            assert_eq!(resource.full_name(), "octocat/agent-demo");
        }
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
    assert_eq!(remote.count(Method::Post, "/user/repos"), 1);
}

#[tokio::test]
async fn existing_resource_is_never_recreated() {
    let remote = Arc::new(FakeRemote::default().with_repo("agent-demo"));
    let manager = manager(&remote);

    let outcome = manager.create_resource("demo", "desc", false).await.unwrap();

    assert!(matches!(outcome, OperationOutcome::AlreadyExists { .. }));
    assert_eq!(remote.count(Method::Post, "/user/repos"), 0);
    assert_eq!(remote.count(Method::Get, "/repos/octocat/agent-demo"), 1);
}

#[tokio::test]
async fn conflict_after_missed_check_is_a_failure() {
    let remote = Arc::new(FakeRemote::default());
    remote.force_create_response(HttpResponse::new(
        422,
        r#"{"message":"Repository creation failed.","errors":[{"message":"name already exists on this account"}]}"#,
    ));
    let manager = manager(&remote);

    let outcome = manager.create_resource("demo", "", false).await.unwrap();

    match outcome {
        OperationOutcome::Failed(FailureCause::Conflict {
            resource, status, ..
        }) => {
            assert_eq!(status, 422);
            assert_eq!(resource.full_name(), "octocat/agent-demo");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_conflict_status_is_classified() {
    let remote = Arc::new(FakeRemote::default());
    remote.force_create_response(HttpResponse::new(409, "conflict"));
    let manager = manager(&remote);

    let outcome = manager.create_resource("demo", "", false).await.unwrap();
    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureCause::Conflict { status: 409, .. })
    ));
}

#[tokio::test]
async fn create_error_carries_status_and_body() {
    let remote = Arc::new(FakeRemote::default());
    remote.force_create_response(HttpResponse::new(500, "server exploded"));
    let manager = manager(&remote);

    let outcome = manager.create_resource("demo", "", false).await.unwrap();
    match outcome {
        OperationOutcome::Failed(FailureCause::Http { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "server exploded");
        }
        other => panic!("expected http failure, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_existence_check_skips_create() {
    let remote = Arc::new(FakeRemote::default());
    remote.force_check_status(503);
    let manager = manager(&remote);

    let outcome = manager.create_resource("demo", "", false).await.unwrap();

    assert!(matches!(
        outcome,
        OperationOutcome::Failed(FailureCause::Http { status: 503, .. })
    ));
    assert_eq!(remote.count(Method::Post, "/user/repos"), 0);
}

#[tokio::test]
async fn description_is_forwarded_when_present() {
    let remote = Arc::new(FakeRemote::default());
    let manager = manager(&remote);

    manager
        .create_resource("demo", "  a demo repo ", true)
        .await
        .unwrap();

    let requests = remote.requests.lock().unwrap();
    let create = requests
        .iter()
        .find(|req| req.method == Method::Post)
        .expect("create request");
    assert_eq!(
        create.body,
        Some(json!({"name": "agent-demo", "private": true, "description": "a demo repo"}))
    );
}

#[tokio::test]
async fn deleting_unknown_resource_is_not_found() {
    let remote = Arc::new(FakeRemote::default());
    let manager = manager(&remote);

    let outcome = manager.delete_resource("demo").await.unwrap();

    match outcome {
        OperationOutcome::NotFound { resource } => {
            assert_eq!(resource.full_name(), "octocat/demo");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_is_idempotent() {
    let remote = Arc::new(FakeRemote::default().with_repo("agent-demo"));
    let manager = manager(&remote);

    let first = manager.delete_resource("agent-demo").await.unwrap();
    let second = manager.delete_resource("agent-demo").await.unwrap();

    assert!(matches!(first, OperationOutcome::Deleted { .. }));
    assert!(matches!(second, OperationOutcome::NotFound { .. }));
    assert_eq!(remote.count(Method::Delete, "/repos/"), 2);
    assert_eq!(remote.count(Method::Get, "/repos/"), 0);
}

#[tokio::test]
async fn missing_credential_fails_before_any_network_call() {
    let remote = Arc::new(FakeRemote::default());
    let manager = manager_with(&remote, None);

    let owner = manager.resolve_owner().await;
    let create = manager.create_resource("demo", "", false).await;
    let delete = manager.delete_resource("demo").await;

    for result in [owner.map(|_| ()), create.map(|_| ()), delete.map(|_| ())] {
        assert!(matches!(
            result,
            Err(LifecycleError::Auth(AuthError::MissingCredential))
        ));
    }
    assert_eq!(remote.total_requests(), 0);
}

#[tokio::test]
async fn rejected_credential_stops_after_identity_call() {
    let remote = Arc::new(FakeRemote::default());
    let manager = manager_with(&remote, Some("expired"));

    let err = manager
        .create_resource("demo", "", false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Auth(AuthError::Rejected { status: 401, .. })
    ));
    assert_eq!(remote.total_requests(), 1);
    assert_eq!(remote.count(Method::Get, "/user"), 1);
}

#[tokio::test]
async fn owner_is_resolved_for_every_operation() {
    let remote = Arc::new(FakeRemote::default());
    let manager = manager(&remote);

    manager.create_resource("demo", "", false).await.unwrap();
    manager.delete_resource("agent-demo").await.unwrap();

    let identity_calls = remote
        .requests
        .lock()
        .unwrap()
        .iter()
        .filter(|req| req.url == format!("{BASE}/user"))
        .count();
    assert_eq!(identity_calls, 2);
}

#[tokio::test]
async fn empty_name_is_rejected_locally() {
    let remote = Arc::new(FakeRemote::default());
    let manager = manager(&remote);

    assert!(matches!(
        manager.create_resource("  ", "", false).await,
        Err(LifecycleError::InvalidName { .. })
    ));
    assert!(matches!(
        manager.delete_resource("").await,
        Err(LifecycleError::InvalidName { .. })
    ));
    assert_eq!(remote.total_requests(), 0);
}

#[tokio::test]
async fn list_keeps_only_prefixed_resources() {
    let remote = Arc::new(
        FakeRemote::default()
            .with_repo("agent-one")
            .with_repo("dotfiles")
            .with_repo("agent-two"),
    );
    let manager = manager(&remote);

    let names: Vec<String> = manager
        .list_resources()
        .await
        .unwrap()
        .iter()
        .filter_map(|descriptor| descriptor.name().map(str::to_string))
        .collect();

    assert_eq!(names, vec!["agent-one", "agent-two"]);
}

#[tokio::test]
async fn list_resolves_owner_before_listing() {
    let remote = Arc::new(FakeRemote::default().with_repo("agent-one"));
    manager(&remote).list_resources().await.unwrap();

    let urls: Vec<String> = remote
        .requests
        .lock()
        .unwrap()
        .iter()
        .map(|req| req.url.clone())
        .collect();
    assert_eq!(urls, vec![format!("{BASE}/user"), format!("{BASE}/user/repos")]);

    let rejected = Arc::new(FakeRemote::default());
    let err = manager_with(&rejected, Some("expired"))
        .list_resources()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Auth(AuthError::Rejected { status: 401, .. })
    ));
    assert_eq!(rejected.total_requests(), 1);
}
