//! Text-to-speech through the ElevenLabs REST API.
//!
//! The returned audio is written to disk as received; no decoding or
//! re-encoding happens here.

use std::path::PathBuf;
use std::sync::Arc;

use agentkit_lifecycle::HttpRequest;
use agentkit_lifecycle::Secret;
use agentkit_lifecycle::Transport;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_json::json;

use crate::error::ToolError;
use crate::error::ToolResult;
use crate::registry::Tool;
use crate::registry::parse_args;

pub const TEXT_TO_SPEECH: &str = "text_to_speech";
pub const DEFAULT_SPEECH_BASE: &str = "https://api.elevenlabs.io";
pub const DEFAULT_SPEECH_MODEL: &str = "eleven_multilingual_v2";
pub const DEFAULT_SPEECH_OUTPUT: &str = "output_tts.mp3";

#[derive(Debug)]
pub struct SpeechConfig {
    pub api_base: String,
    pub api_key: Option<Secret<String>>,
    pub voice_id: Option<String>,
    pub model_id: String,
    pub output_path: PathBuf,
}

impl SpeechConfig {
    pub fn new(api_key: Option<String>, voice_id: Option<String>) -> Self {
        Self {
            api_base: DEFAULT_SPEECH_BASE.to_string(),
            api_key: api_key
                .filter(|key| !key.trim().is_empty())
                .map(Secret::new),
            voice_id: voice_id.filter(|voice| !voice.trim().is_empty()),
            model_id: DEFAULT_SPEECH_MODEL.to_string(),
            output_path: PathBuf::from(DEFAULT_SPEECH_OUTPUT),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }
}

#[derive(Clone)]
pub struct SpeechClient {
    config: Arc<SpeechConfig>,
    transport: Arc<dyn Transport>,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn output_path(&self) -> &PathBuf {
        &self.config.output_path
    }

    /// Synthesizes `text` and writes the audio to the configured output path,
    /// or to `output` when given. Returns the path written.
    pub async fn synthesize(&self, text: &str, output: Option<PathBuf>) -> ToolResult<PathBuf> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(ToolError::MissingConfig("ELEVENLABS_API_KEY is not set"))?;
        let voice_id = self
            .config
            .voice_id
            .as_deref()
            .ok_or(ToolError::MissingConfig("ELEVENLABS_VOICE_ID is not set"))?;
        if text.trim().is_empty() {
            return Err(ToolError::invalid_arguments(
                TEXT_TO_SPEECH,
                "text must not be empty",
            ));
        }

        let url = format!("{}/v1/text-to-speech/{voice_id}", self.config.api_base);
        let request = HttpRequest::post(url)
            .header("xi-api-key", api_key.expose_secret().as_str())
            .header("Accept", "audio/mpeg")
            .json(json!({
                "text": text,
                "model_id": self.config.model_id,
            }));

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ToolError::Remote {
                service: "elevenlabs",
                subject: voice_id.to_string(),
                status: response.status,
                body: response.text(),
            });
        }

        let path = output.unwrap_or_else(|| self.config.output_path.clone());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| ToolError::io(parent, err))?;
        }
        tokio::fs::write(&path, &response.body)
            .await
            .map_err(|err| ToolError::io(&path, err))?;
        tracing::info!(path = %path.display(), bytes = response.body.len(), "wrote speech audio");
        Ok(path)
    }
}

#[derive(Debug, Deserialize)]
struct SpeechArgs {
    text: String,
}

#[derive(Clone)]
pub struct TextToSpeechTool {
    client: SpeechClient,
}

impl TextToSpeechTool {
    pub fn new(client: SpeechClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for TextToSpeechTool {
    fn name(&self) -> &str {
        TEXT_TO_SPEECH
    }

    fn description(&self) -> &str {
        "Convert text to speech and return the local path of the generated audio file"
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string"}
            },
            "required": ["text"]
        })
    }

    async fn invoke(&self, args: JsonValue) -> ToolResult<JsonValue> {
        let args: SpeechArgs = parse_args(self.name(), args)?;
        let path = self.client.synthesize(&args.text, None).await?;
        Ok(json!({"path": path.display().to_string()}))
    }
}
