use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::gesture::GestureThresholds;
use crate::notify::ClearPolicy;
use crate::selection::DebounceMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera_id: i32,
    pub model_path: String,
    pub presence_threshold: f32,
    pub rotation_interval_secs: u64,
    pub gesture: GestureThresholds,
    pub selection: SelectionConfig,
    pub llm: LlmConfig,
    pub email: EmailConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_id: 0,
            model_path: "models/face_mesh.onnx".to_string(),
            presence_threshold: 0.5,
            rotation_interval_secs: 7,
            gesture: GestureThresholds::default(),
            selection: SelectionConfig::default(),
            llm: LlmConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub debounce: DebounceMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub prompt_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            prompt_path: PathBuf::from("prompts/default_prompt.txt"),
            timeout_secs: 10,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn load_prompt(&self) -> Result<String, ConfigError> {
        fs::read_to_string(&self.prompt_path).map_err(|source| ConfigError::Read {
            path: self.prompt_path.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub recipient: String,
    pub clear_policy: ClearPolicy,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            recipient: "recipient@example.com".to_string(),
            clear_policy: ClearPolicy::default(),
            timeout_secs: 20,
        }
    }
}

impl EmailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Credentials that never live in the config file.
#[derive(Clone, Default)]
pub struct Secrets {
    pub llm_api_key: String,
    pub email_address: String,
    pub email_password: String,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            llm_api_key: env_any(&["GROQ_API_KEY", "groq_api_key"]),
            email_address: env_any(&["EMAIL_ADDRESS"]),
            email_password: env_any(&["EMAIL_PASSWORD"]),
        }
    }
}

fn env_any(keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| std::env::var(k).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Config::load`], but a missing file means defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Environment overrides that are not secrets.
    pub fn apply_env(&mut self) {
        if let Ok(recipient) = std::env::var("HEADWORD_RECIPIENT") {
            if !recipient.is_empty() {
                self.email.recipient = recipient;
            }
        }
    }

    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.gesture.tilt_degrees > 0.0 && self.gesture.tilt_degrees < 90.0) {
            return invalid("gesture.tilt_degrees must be between 0 and 90");
        }
        if self.gesture.bow_pixels <= 0 || self.gesture.mouth_pixels <= 0 {
            return invalid("gesture pixel thresholds must be positive");
        }
        if !(0.0..=1.0).contains(&self.presence_threshold) {
            return invalid("presence_threshold must be between 0 and 1");
        }
        if self.rotation_interval_secs == 0 {
            return invalid("rotation_interval_secs must be greater than 0");
        }
        if self.llm.timeout_secs == 0 || self.email.timeout_secs == 0 {
            return invalid("timeouts must be greater than 0");
        }
        if self.email.smtp_port == 0 {
            return invalid("email.smtp_port must be nonzero");
        }
        if self.email.recipient.parse::<Mailbox>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "email.recipient is not a valid address: {}",
                self.email.recipient
            )));
        }
        Ok(())
    }
}
