use std::sync::Arc;
use std::time::Duration;

use agentkit_lifecycle::ReqwestTransport;
use agentkit_tools::SpeechClient;
use agentkit_tools::SpeechConfig;
use agentkit_tools::TextToSpeechTool;
use agentkit_tools::Tool;
use agentkit_tools::ToolError;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

const AUDIO: &[u8] = b"ID3\x03\x00fake-mpeg-frames";

fn client(server: &MockServer, config: SpeechConfig) -> SpeechClient {
    let transport = ReqwestTransport::new(Duration::from_secs(5)).expect("transport");
    SpeechClient::new(config.with_api_base(server.uri()), Arc::new(transport))
}

#[tokio::test]
async fn writes_audio_bytes_to_output_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-123"))
        .and(header("xi-api-key", "xi-secret"))
        .and(header("accept", "audio/mpeg"))
        .and(body_json(json!({"text": "Good evening", "model_id": "eleven_multilingual_v2"})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(AUDIO))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let output = dir.path().join("nested").join("anchor.mp3");
    let config = SpeechConfig::new(Some("xi-secret".to_string()), Some("voice-123".to_string()))
        .with_output_path(&output);
    let tool = TextToSpeechTool::new(client(&server, config));

    let result = tool
        .invoke(json!({"text": "Good evening"}))
        .await
        .expect("invoke");

    assert_eq!(result, json!({"path": output.display().to_string()}));
    assert_eq!(std::fs::read(&output).expect("read audio"), AUDIO);
}

#[tokio::test]
async fn missing_key_or_voice_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let no_key = client(&server, SpeechConfig::new(None, Some("voice".to_string())));
    assert!(matches!(
        no_key.synthesize("hello", None).await,
        Err(ToolError::MissingConfig(_))
    ));

    let no_voice = client(&server, SpeechConfig::new(Some("key".to_string()), Some(" ".to_string())));
    assert!(matches!(
        no_voice.synthesize("hello", None).await,
        Err(ToolError::MissingConfig(_))
    ));
}

#[tokio::test]
async fn empty_text_is_rejected() {
    let server = MockServer::start().await;
    let speech = client(
        &server,
        SpeechConfig::new(Some("key".to_string()), Some("voice".to_string())),
    );
    assert!(matches!(
        speech.synthesize("   ", None).await,
        Err(ToolError::InvalidArguments { .. })
    ));
}

#[tokio::test]
async fn remote_error_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let output = dir.path().join("out.mp3");
    let speech = client(
        &server,
        SpeechConfig::new(Some("key".to_string()), Some("voice".to_string())),
    );

    let err = speech
        .synthesize("hello", Some(output.clone()))
        .await
        .expect_err("401");
    assert!(matches!(err, ToolError::Remote { status: 401, .. }));
    assert!(!output.exists());
}
