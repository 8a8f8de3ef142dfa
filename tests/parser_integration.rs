//! Integration tests for turning backend replies into action descriptors

use async_trait::async_trait;
use os_agent::actions::ActionCatalog;
use os_agent::core::error::{AgentError, Result};
use os_agent::llm::parser::REPHRASE_MESSAGE;
use os_agent::llm::{CommandParser, CompletionBackend};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

/// Backend that answers every request with the same canned result
struct CannedBackend {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl CannedBackend {
    fn ok(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionBackend for CannedBackend {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.reply.clone().map_err(AgentError::LlmError)
    }
}

fn parser(backend: Arc<CannedBackend>) -> CommandParser {
    CommandParser::new(backend, &ActionCatalog::new())
}

/// Test 1: A plain JSON reply becomes the descriptor as-is
#[tokio::test]
async fn test_plain_json_reply() {
    let p = parser(CannedBackend::ok(
        r#"{"action": "open_app", "params": {"app_name": "notepad"}}"#,
    ));

    let d = p.think("Open notepad").await;
    assert_eq!(d.action, "open_app");
    assert_eq!(d.params["app_name"], "notepad");
}

/// Test 2: Tagged fenced block with prose around it
#[tokio::test]
async fn test_tagged_block_with_trailing_text() {
    let reply = "Sure thing!\n```json\n{\"action\": \"create_file\", \"params\": {\"path\": \"test.txt\", \"content\": \"\"}}\n```\nLet me know if you need anything else.";
    let p = parser(CannedBackend::ok(reply));

    let d = p.think("Create a file called test.txt").await;
    assert_eq!(d.action, "create_file");
    assert_eq!(d.params["path"], "test.txt");
    assert_eq!(d.params["content"], "");
}

/// Test 3: Untagged fence is used when there is no json-tagged block
#[tokio::test]
async fn test_untagged_block() {
    let p = parser(CannedBackend::ok(
        "```\n{\"action\": \"get_system_info\"}\n```",
    ));

    let d = p.think("what system is this").await;
    assert_eq!(d.action, "get_system_info");
    assert!(d.params.is_empty());
}

/// Test 4: Bare object embedded in prose is recovered
#[tokio::test]
async fn test_object_inside_prose() {
    let p = parser(CannedBackend::ok(
        r#"The action is {"action": "search_web", "params": {"query": "rust"}} as requested."#,
    ));

    let d = p.think("search rust").await;
    assert_eq!(d.action, "search_web");
    assert_eq!(d.params["query"], "rust");
}

/// Test 5: Unknown action names pass through to the dispatcher untouched
#[tokio::test]
async fn test_unknown_action_passes_through() {
    let p = parser(CannedBackend::ok(r#"{"action": "format_disk", "params": {}}"#));
    assert_eq!(p.think("wipe everything").await.action, "format_disk");
}

/// Test 6: Malformed JSON degrades to a rephrase request
#[tokio::test]
async fn test_malformed_reply_becomes_respond() {
    let p = parser(CannedBackend::ok(r#"{"action": "open_app", "params": {"#));

    let d = p.think("open").await;
    assert_eq!(d.action, "respond");
    assert_eq!(d.message(), Some(REPHRASE_MESSAGE));
}

/// Test 7: A failing backend produces an error message, not a panic
#[tokio::test]
async fn test_backend_failure_becomes_respond() {
    let p = parser(CannedBackend::failing("connection refused"));

    let d = p.think("open notepad").await;
    assert_eq!(d.action, "respond");
    let message = d.message().unwrap();
    assert!(message.starts_with("An error occurred:"));
    assert!(message.contains("connection refused"));
}

/// Test 8: The request carries the catalog prompt and the quoted utterance
#[tokio::test]
async fn test_request_shape() {
    let backend = CannedBackend::ok(r#"{"action": "respond", "params": {"message": "hi"}}"#);
    let p = parser(backend.clone());

    p.think("Hello there").await;

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (system, user) = &requests[0];
    assert_eq!(system, p.system_prompt());
    assert!(system.contains("Available Actions:"));
    assert!(system.contains("delete_file"));
    assert_eq!(user, "User: \"Hello there\"");
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    /// Replies with no JSON structure in them always yield a respond
    /// descriptor with something to say
    #[test]
    fn prop_no_json_yields_respond(reply in "[a-zA-Z0-9 .,!?']{0,80}") {
        let p = parser(CannedBackend::ok(&reply));
        let d = runtime().block_on(p.think("anything"));

        prop_assert_eq!(d.action.as_str(), "respond");
        prop_assert!(!d.message().unwrap_or_default().is_empty());
    }
}
