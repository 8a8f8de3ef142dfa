//! Action definitions and catalog

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every action the agent understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    OpenApp,
    CloseApp,
    CreateFile,
    CreateFolder,
    DeleteFile,
    DeleteFolder,
    SearchWeb,
    OpenUrl,
    RunCommand,
    GetSystemInfo,
    TakeScreenshot,
    Respond,
    Clarify,
}

/// What part of the system an action touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffectClass {
    ProcessLifecycle,
    FilesystemMutation,
    Browser,
    Shell,
    Introspection,
    Capture,
    Conversation,
}

impl ActionKind {
    pub const ALL: [ActionKind; 13] = [
        ActionKind::OpenApp,
        ActionKind::CloseApp,
        ActionKind::CreateFile,
        ActionKind::CreateFolder,
        ActionKind::DeleteFile,
        ActionKind::DeleteFolder,
        ActionKind::SearchWeb,
        ActionKind::OpenUrl,
        ActionKind::RunCommand,
        ActionKind::GetSystemInfo,
        ActionKind::TakeScreenshot,
        ActionKind::Respond,
        ActionKind::Clarify,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::OpenApp => "open_app",
            ActionKind::CloseApp => "close_app",
            ActionKind::CreateFile => "create_file",
            ActionKind::CreateFolder => "create_folder",
            ActionKind::DeleteFile => "delete_file",
            ActionKind::DeleteFolder => "delete_folder",
            ActionKind::SearchWeb => "search_web",
            ActionKind::OpenUrl => "open_url",
            ActionKind::RunCommand => "run_command",
            ActionKind::GetSystemInfo => "get_system_info",
            ActionKind::TakeScreenshot => "take_screenshot",
            ActionKind::Respond => "respond",
            ActionKind::Clarify => "clarify",
        }
    }

    pub fn category(&self) -> SideEffectClass {
        match self {
            ActionKind::OpenApp | ActionKind::CloseApp => SideEffectClass::ProcessLifecycle,
            ActionKind::CreateFile
            | ActionKind::CreateFolder
            | ActionKind::DeleteFile
            | ActionKind::DeleteFolder => SideEffectClass::FilesystemMutation,
            ActionKind::SearchWeb | ActionKind::OpenUrl => SideEffectClass::Browser,
            ActionKind::RunCommand => SideEffectClass::Shell,
            ActionKind::GetSystemInfo => SideEffectClass::Introspection,
            ActionKind::TakeScreenshot => SideEffectClass::Capture,
            ActionKind::Respond | ActionKind::Clarify => SideEffectClass::Conversation,
        }
    }

    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            ActionKind::DeleteFile | ActionKind::DeleteFolder | ActionKind::RunCommand
        )
    }

    /// Conversational pseudo-actions never touch the operating system
    pub fn is_conversational(&self) -> bool {
        self.category() == SideEffectClass::Conversation
    }

    /// Reply used when a conversational action arrives without a message
    pub fn default_message(&self) -> Option<&'static str> {
        match self {
            ActionKind::Respond => Some("I understand."),
            ActionKind::Clarify => Some("Could you clarify that?"),
            _ => None,
        }
    }

    /// The parameter that names what a destructive action operates on
    pub fn target_param(&self) -> Option<&'static str> {
        match self {
            ActionKind::DeleteFile | ActionKind::DeleteFolder => Some("path"),
            ActionKind::RunCommand => Some("command"),
            _ => None,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            ActionKind::OpenApp => "Open an application",
            ActionKind::CloseApp => "Close an application",
            ActionKind::CreateFile => "Create a new file",
            ActionKind::CreateFolder => "Create a new folder",
            ActionKind::DeleteFile => "Delete a file (requires confirmation)",
            ActionKind::DeleteFolder => "Delete a folder (requires confirmation)",
            ActionKind::SearchWeb => "Search on Google",
            ActionKind::OpenUrl => "Open a URL",
            ActionKind::RunCommand => "Run a shell command (requires confirmation)",
            ActionKind::GetSystemInfo => "Get system information",
            ActionKind::TakeScreenshot => "Take a screenshot",
            ActionKind::Respond => "Reply conversationally to greetings or chat",
            ActionKind::Clarify => "Ask the user to clarify an unclear command",
        }
    }

    fn params_hint(&self) -> &'static str {
        match self {
            ActionKind::OpenApp | ActionKind::CloseApp => r#"{"app_name": "application name"}"#,
            ActionKind::CreateFile => {
                r#"{"path": "file path", "content": "file content (optional)"}"#
            }
            ActionKind::CreateFolder => r#"{"path": "folder path"}"#,
            ActionKind::DeleteFile => r#"{"path": "file path", "confirmed": false}"#,
            ActionKind::DeleteFolder => r#"{"path": "folder path", "confirmed": false}"#,
            ActionKind::SearchWeb => r#"{"query": "search query"}"#,
            ActionKind::OpenUrl => r#"{"url": "web address"}"#,
            ActionKind::RunCommand => r#"{"command": "shell command", "confirmed": false}"#,
            ActionKind::GetSystemInfo => "{}",
            ActionKind::TakeScreenshot => r#"{"filename": "screenshot.png"}"#,
            ActionKind::Respond => r#"{"message": "your response"}"#,
            ActionKind::Clarify => r#"{"message": "clarification question"}"#,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalog entry for one action
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub name: &'static str,
    pub summary: &'static str,
    pub params_hint: &'static str,
    pub requires_confirmation: bool,
}

impl ActionSpec {
    fn from_kind(kind: ActionKind) -> Self {
        Self {
            kind,
            name: kind.name(),
            summary: kind.summary(),
            params_hint: kind.params_hint(),
            requires_confirmation: kind.requires_confirmation(),
        }
    }
}

/// Immutable registry of supported actions
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    specs: Vec<ActionSpec>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self {
            specs: ActionKind::ALL.iter().map(|k| ActionSpec::from_kind(*k)).collect(),
        }
    }

    /// Look up an action by its wire name
    pub fn spec(&self, name: &str) -> Option<&ActionSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Numbered capability listing for the parser prompt.
    ///
    /// Conversational pseudo-actions are left out; the prompt rules describe
    /// them separately.
    pub fn describe(&self) -> String {
        let mut out = String::from("Available Actions:\n");
        for (i, spec) in self
            .specs
            .iter()
            .filter(|s| !s.kind.is_conversational())
            .enumerate()
        {
            out.push_str(&format!(
                "{}. {} - {}\n   Params: {}\n\n",
                i + 1,
                spec.name,
                spec.summary,
                spec.params_hint
            ));
        }
        out
    }
}
