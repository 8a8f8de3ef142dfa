//! Parse natural language commands into action descriptors
//!
//! The backend reply is untrusted text. It should hold exactly one JSON
//! object, possibly inside a fenced block, but anything can come back.
//! `CommandParser::think` never fails: every bad reply degrades to a
//! conversational `respond` descriptor.

use crate::actions::catalog::ActionCatalog;
use crate::actions::descriptor::ActionDescriptor;
use crate::core::error::{AgentError, Result};
use crate::llm::client::CompletionBackend;
use crate::llm::prompt::{build_system_prompt, user_message};
use std::sync::Arc;

/// Reply used when the backend answered but no descriptor could be read
pub const REPHRASE_MESSAGE: &str =
    "I'm having trouble understanding that command. Could you rephrase?";

const FENCE: &str = "```";

/// Turns utterances into action descriptors via a completion backend
pub struct CommandParser {
    backend: Arc<dyn CompletionBackend>,
    system_prompt: String,
}

impl CommandParser {
    pub fn new(backend: Arc<dyn CompletionBackend>, catalog: &ActionCatalog) -> Self {
        Self {
            backend,
            system_prompt: build_system_prompt(catalog),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Convert one utterance into a descriptor.
    ///
    /// The action name is not checked against the catalog here; that is the
    /// dispatcher's job.
    pub async fn think(&self, utterance: &str) -> ActionDescriptor {
        let reply = match self
            .backend
            .complete(&self.system_prompt, &user_message(utterance))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Backend call failed");
                return ActionDescriptor::respond(format!("An error occurred: {}", e));
            }
        };

        tracing::debug!(reply = %reply, "Backend reply");

        match parse_reply(&reply) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read a descriptor from backend reply");
                ActionDescriptor::respond(REPHRASE_MESSAGE)
            }
        }
    }
}

/// Read a descriptor out of a raw backend reply
pub fn parse_reply(reply: &str) -> Result<ActionDescriptor> {
    let payload = extract_payload(reply);

    match serde_json::from_str::<ActionDescriptor>(payload) {
        Ok(descriptor) => Ok(descriptor),
        Err(first_err) => {
            // Prose around a bare object: retry on the outermost braces
            let span = brace_span(payload).ok_or_else(|| {
                AgentError::LlmError(format!(
                    "No JSON found in response: {} - Response: {}",
                    first_err, reply
                ))
            })?;
            serde_json::from_str(span).map_err(|e| {
                AgentError::LlmError(format!(
                    "Failed to parse descriptor: {} - Response: {}",
                    e, reply
                ))
            })
        }
    }
}

/// Pick the text that should hold the JSON object.
///
/// First `json`-tagged fenced block, else the first fenced block of any
/// kind, else the whole trimmed reply.
pub fn extract_payload(reply: &str) -> &str {
    let reply = reply.trim();
    let blocks = fenced_blocks(reply);

    if let Some(block) = blocks.iter().find(|b| b.info.eq_ignore_ascii_case("json")) {
        return block.body;
    }
    if let Some(block) = blocks.first() {
        return block.body;
    }
    reply
}

#[derive(Debug, PartialEq)]
struct FencedBlock<'a> {
    info: &'a str,
    body: &'a str,
}

/// Split out fenced blocks in order; an unterminated fence runs to the end
fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after = &rest[open + FENCE.len()..];
        let close = after.find(FENCE);
        let inner = match close {
            Some(end) => &after[..end],
            None => after,
        };

        let info_len = inner
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(inner.len());
        blocks.push(FencedBlock {
            info: &inner[..info_len],
            body: inner[info_len..].trim(),
        });

        match close {
            Some(end) => rest = &after[end + FENCE.len()..],
            None => break,
        }
    }

    blocks
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
