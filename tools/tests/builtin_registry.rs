use std::sync::Arc;
use std::time::Duration;

use agentkit_lifecycle::LifecycleConfig;
use agentkit_lifecycle::ReqwestTransport;
use agentkit_lifecycle::ResourceLifecycleManager;
use agentkit_tools::RedditClient;
use agentkit_tools::RedditConfig;
use agentkit_tools::SpeechClient;
use agentkit_tools::SpeechConfig;
use agentkit_tools::ToolError;
use agentkit_tools::ToolRegistry;
use agentkit_tools::builtin_registry;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn registry_for(server: &MockServer, token: Option<&str>) -> ToolRegistry {
    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(5)).expect("transport"));
    let lifecycle =
        LifecycleConfig::new(token.map(str::to_string)).with_api_base(server.uri());
    let manager = ResourceLifecycleManager::new(lifecycle, transport.clone());
    let reddit = RedditClient::new(RedditConfig::default(), transport.clone());
    let speech = SpeechClient::new(SpeechConfig::new(None, None), transport);
    builtin_registry(manager, reddit, speech).expect("registry")
}

async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn exposes_all_builtin_tools() {
    let server = MockServer::start().await;
    let registry = registry_for(&server, Some("token"));
    assert_eq!(
        registry.names(),
        vec![
            "create_repository",
            "delete_repository",
            "list_repositories",
            "get_top_posts",
            "text_to_speech",
        ]
    );
    for definition in registry.definitions() {
        assert_eq!(definition.input_schema["type"], json!("object"));
        assert!(!definition.description.is_empty());
    }
}

#[tokio::test]
async fn create_repository_reports_existing_repository() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/agent-site"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "agent-site"})))
        .mount(&server)
        .await;

    let result = registry_for(&server, Some("token"))
        .invoke("create_repository", json!({"name": "site", "description": "My site"}))
        .await
        .expect("invoke");

    assert_eq!(
        result,
        json!({"status": "already_exists", "repository": "octocat/agent-site"})
    );
}

#[tokio::test]
async fn delete_repository_reports_missing_repository() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octocat/agent-site"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = registry_for(&server, Some("token"))
        .invoke("delete_repository", json!({"name": "agent-site"}))
        .await
        .expect("invoke");
    assert_eq!(
        result,
        json!({"status": "not_found", "repository": "octocat/agent-site"})
    );
}

#[tokio::test]
async fn create_repository_surfaces_conflict_as_error() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/agent-site"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
        .mount(&server)
        .await;

    let err = registry_for(&server, Some("token"))
        .invoke("create_repository", json!({"name": "site"}))
        .await
        .expect_err("conflict");
    let message = err.to_string();
    assert!(message.contains("octocat/agent-site"), "{message}");
    assert!(message.contains("409"), "{message}");
}

#[tokio::test]
async fn list_repositories_returns_names() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "agent-site"},
            {"name": "notes"}
        ])))
        .mount(&server)
        .await;

    let result = registry_for(&server, Some("token"))
        .invoke("list_repositories", json!({}))
        .await
        .expect("invoke");
    assert_eq!(result, json!(["agent-site"]));
}

#[tokio::test]
async fn missing_token_is_reported_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = registry_for(&server, None)
        .invoke("delete_repository", json!({"name": "agent-site"}))
        .await
        .expect_err("missing token");
    assert!(matches!(err, ToolError::Lifecycle(_)));
    assert!(err.to_string().contains("GITHUB_TOKEN"));
}
