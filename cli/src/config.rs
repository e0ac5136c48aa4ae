use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use agentkit_lifecycle::LifecycleConfig;
use agentkit_lifecycle::NamingPolicy;
use agentkit_lifecycle::Secret;
use agentkit_tools::RedditConfig;
use agentkit_tools::SpeechConfig;
use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use dirs::home_dir;
use serde::Deserialize;

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const ELEVENLABS_API_KEY_ENV: &str = "ELEVENLABS_API_KEY";
pub const ELEVENLABS_VOICE_ID_ENV: &str = "ELEVENLABS_VOICE_ID";

const CONFIG_DIR_NAME: &str = ".agentkit";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Settings loaded from `~/.agentkit/config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub github: GithubSection,
    pub reddit: RedditSection,
    pub speech: SpeechSection,
    pub agents: AgentsSection,

    // Runtime state
    #[serde(skip)]
    pub config_dir: PathBuf,
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubSection {
    pub api_base: Option<String>,
    pub name_prefix: Option<String>,
    /// Applies to every outbound HTTP request, not only GitHub's.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedditSection {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeechSection {
    pub api_base: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentsSection {
    pub dir: Option<PathBuf>,
}

/// Credentials taken from the environment, never from the config file.
#[derive(Debug, Default)]
pub struct Secrets {
    pub github_token: Option<Secret<String>>,
    pub elevenlabs_api_key: Option<Secret<String>>,
    pub elevenlabs_voice_id: Option<String>,
}

impl Config {
    /// Loads the config file, falling back to defaults when the default file
    /// does not exist. An explicitly requested file must exist.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let (config_file, explicit) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_config_dir()?.join(CONFIG_FILE_NAME), false),
        };
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut config = if config_file.exists() {
            let contents = std::fs::read_to_string(&config_file)
                .with_context(|| format!("failed to read {}", config_file.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("invalid config file {}", config_file.display()))?
        } else if explicit {
            return Err(anyhow!(
                "config file {} does not exist",
                config_file.display()
            ));
        } else {
            Self::default()
        };

        config.config_dir = config_dir;
        config.merge_env_vars();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn default_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
        Ok(home.join(CONFIG_DIR_NAME))
    }

    fn merge_env_vars(&mut self) {
        self.merge_env(|key| std::env::var(key).ok());
    }

    /// Fills [`Secrets`] from `lookup`; blank values count as unset.
    pub fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        self.secrets = Secrets {
            github_token: non_empty(GITHUB_TOKEN_ENV).map(Secret::new),
            elevenlabs_api_key: non_empty(ELEVENLABS_API_KEY_ENV).map(Secret::new),
            elevenlabs_voice_id: non_empty(ELEVENLABS_VOICE_ID_ENV),
        };
    }

    pub fn timeout(&self) -> Duration {
        self.github
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(agentkit_lifecycle::DEFAULT_TIMEOUT)
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        let token = self
            .secrets
            .github_token
            .as_ref()
            .map(|secret| secret.expose_secret().clone());
        let mut config = LifecycleConfig::new(token).with_timeout(self.timeout());
        if let Some(api_base) = &self.github.api_base {
            config = config.with_api_base(api_base.as_str());
        }
        if let Some(prefix) = &self.github.name_prefix {
            config = config.with_naming(NamingPolicy::new(prefix.as_str()));
        }
        config
    }

    pub fn reddit_config(&self) -> RedditConfig {
        let mut config = RedditConfig::default();
        if let Some(base_url) = &self.reddit.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(user_agent) = &self.reddit.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }

    pub fn speech_config(&self) -> SpeechConfig {
        let api_key = self
            .secrets
            .elevenlabs_api_key
            .as_ref()
            .map(|secret| secret.expose_secret().clone());
        let voice_id = self
            .secrets
            .elevenlabs_voice_id
            .clone()
            .or_else(|| self.speech.voice_id.clone());
        let mut config = SpeechConfig::new(api_key, voice_id);
        if let Some(api_base) = &self.speech.api_base {
            config = config.with_api_base(api_base.as_str());
        }
        if let Some(model_id) = &self.speech.model_id {
            config = config.with_model_id(model_id.as_str());
        }
        if let Some(output_path) = &self.speech.output_path {
            config = config.with_output_path(output_path.clone());
        }
        config
    }

    /// Agent definitions directory; relative paths resolve against the
    /// config directory.
    pub fn agents_dir(&self) -> PathBuf {
        match &self.agents.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.config_dir.join(dir),
            None => self.config_dir.join("agents"),
        }
    }
}
