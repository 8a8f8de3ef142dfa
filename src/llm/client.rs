//! Async LLM client for command parsing
//!
//! This is a model-agnostic HTTP client for calling LLM APIs.
//! Supports Anthropic, Gemini and OpenAI-compatible APIs (DeepSeek, etc).
//! The backend only translates text into an action descriptor; it never
//! touches the operating system itself.

use crate::core::config::LlmConfig;
use crate::core::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Anything that can turn a prompt into free text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// # Arguments
    /// * `system` - Instructions describing the task and output format
    /// * `user` - The user's request
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    Gemini,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            max_tokens: 1024,
            api_format,
        }
    }

    pub fn from_config(config: &LlmConfig, api_key: String) -> Self {
        let mut client = Self::new(api_key, config.api_url.clone(), config.model.clone());
        client.max_tokens = config.max_tokens;
        client
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("generativelanguage.googleapis.com") {
            ApiFormat::Gemini
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| AgentError::LlmError("Empty response".into()))
    }

    async fn complete_gemini(&self, system: &str, user: &str) -> Result<String> {
        let request = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: system.into(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: user.into() }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.gemini_endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        completion
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| AgentError::LlmError("Empty response".into()))
    }

    /// Gemini puts the model in the path; a full `:generateContent` URL is
    /// used as-is.
    fn gemini_endpoint(&self) -> String {
        if self.api_url.contains(":generateContent") {
            self.api_url.clone()
        } else {
            format!(
                "{}/models/{}:generateContent",
                self.api_url.trim_end_matches('/'),
                self.model
            )
        }
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| AgentError::LlmError("Empty response".into()))
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::Gemini => self.complete_gemini(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// Gemini API format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
