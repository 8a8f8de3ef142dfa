use crate::actions::catalog::ActionKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Console error: {0}")]
    ConsoleError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Failure of a single action handler.
///
/// The `Display` text is what the user sees, so every variant reads as a
/// complete sentence fragment naming what went wrong.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid parameters for {action}: {reason}")]
    InvalidParams { action: ActionKind, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find application: {0}")]
    AppNotFound(String),

    #[error("Command timed out after {seconds} seconds: {command}")]
    TimedOut { command: String, seconds: u64 },

    #[error("Failed to take screenshot: {0}")]
    Capture(String),
}

impl HandlerError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type HandlerResult = std::result::Result<String, HandlerError>;
