//! Agent configuration with documented defaults
//!
//! Everything tunable lives here. Values come from an optional TOML file,
//! then environment overrides; every field has a default so an empty file
//! (or no file at all) is a valid configuration.

use crate::core::error::{AgentError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "os-agent.toml";

/// Placeholder shipped in example `.env` files
const PLACEHOLDER_KEY: &str = "your_api_key_here";

/// Environment variables checked for the API key, in order
const API_KEY_VARS: [&str; 2] = ["LLM_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub dispatch: DispatchConfig,
    pub session: SessionConfig,
    pub voice: VoiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Endpoint; the API format is detected from it
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".into(),
            model: "claude-3-haiku-20240307".into(),
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Hard wall-clock limit for `run_command`
    pub shell_timeout_secs: u64,

    /// Maximum characters of shell output reported back
    pub output_limit: usize,

    /// Prefix the URL-encoded query is appended to
    pub search_url: String,

    /// Used by `take_screenshot` when no filename is given
    pub default_screenshot: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            shell_timeout_secs: 10,
            output_limit: 500,
            search_url: "https://www.google.com/search?q=".into(),
            default_screenshot: "screenshot.png".into(),
        }
    }
}

impl DispatchConfig {
    pub fn shell_timeout(&self) -> Duration {
        Duration::from_secs(self.shell_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Carry an unconfirmed destructive action into the next turn so a bare
    /// "yes" can confirm it. When false, the backend must rebuild the whole
    /// descriptor with `confirmed: true` on its own.
    pub carry_confirmation: bool,

    /// Speak without waiting for synthesis to finish. Relaxes ordering:
    /// the next listen may start while the previous reply is still playing.
    pub background_speech: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            carry_confirmation: true,
            background_speech: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Recognizer program; prints the heard text or an `ERROR:` token
    pub listen_command: Vec<String>,

    /// Synthesizer program; the message is appended as the last argument
    pub speak_command: Vec<String>,

    /// Run once before the first listen (ambient noise calibration)
    pub calibrate_command: Option<Vec<String>>,

    /// Upper bound on a single recognizer run
    pub listen_timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        let speak = if cfg!(target_os = "macos") {
            vec!["say".to_string()]
        } else {
            vec!["espeak".to_string()]
        };
        Self {
            listen_command: vec!["os-agent-listen".into()],
            speak_command: speak,
            calibrate_command: None,
            listen_timeout_secs: 20,
        }
    }
}

impl AgentConfig {
    /// Load from `path`, or from `os-agent.toml` in the working directory if
    /// present, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(&fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        config.validate().map_err(AgentError::ConfigError)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AgentError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.dispatch.shell_timeout_secs == 0 {
            return Err("dispatch.shell_timeout_secs must be greater than 0".into());
        }
        if self.dispatch.output_limit == 0 {
            return Err("dispatch.output_limit must be greater than 0".into());
        }
        if self.llm.api_url.trim().is_empty() {
            return Err("llm.api_url must not be empty".into());
        }
        if self.voice.listen_command.is_empty() || self.voice.speak_command.is_empty() {
            return Err("voice.listen_command and voice.speak_command must not be empty".into());
        }
        if self.voice.listen_timeout_secs == 0 {
            return Err("voice.listen_timeout_secs must be greater than 0".into());
        }
        Ok(())
    }
}

/// Find the backend API key.
///
/// Checks `LLM_API_KEY` then `GEMINI_API_KEY` in the environment, then the same
/// names in `env_file`. Blank values and the example placeholder are skipped;
/// finding no usable key is an error.
pub fn resolve_api_key(env_file: &Path) -> Result<String> {
    pick_api_key(|var| std::env::var(var).ok(), env_file)
}

fn pick_api_key(lookup: impl Fn(&str) -> Option<String>, env_file: &Path) -> Result<String> {
    API_KEY_VARS
        .iter()
        .find_map(|var| lookup(var).and_then(usable_key))
        .or_else(|| read_dotenv_key(env_file))
        .ok_or_else(|| {
            AgentError::ConfigError(format!(
                "API key not found. Set LLM_API_KEY (or GEMINI_API_KEY) in the environment or in {}",
                env_file.display()
            ))
        })
}

fn usable_key(raw: String) -> Option<String> {
    let key = raw.trim().trim_matches('"');
    if key.is_empty() || key == PLACEHOLDER_KEY {
        None
    } else {
        Some(key.to_string())
    }
}

fn read_dotenv_key(env_file: &Path) -> Option<String> {
    let content = fs::read_to_string(env_file).ok()?;
    parse_dotenv_key(&content)
}

fn parse_dotenv_key(content: &str) -> Option<String> {
    API_KEY_VARS.iter().find_map(|var| {
        let prefix = format!("{}=", var);
        content
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .and_then(|value| usable_key(value.to_string()))
    })
}
