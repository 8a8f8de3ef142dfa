//! Action dispatch - validates descriptors and runs exactly one handler
//!
//! Unknown action -> confirmation gate -> typed validation -> handler.
//! Every path ends in a `ResultEnvelope`; nothing escapes as an error.

use crate::actions::catalog::{ActionCatalog, ActionKind};
use crate::actions::descriptor::{is_confirmed, ActionDescriptor, Params, ResultEnvelope};
use crate::actions::params::Action;
use crate::command::desktop::Desktop;
use crate::command::handlers::shell::ShellLimits;
use crate::command::handlers::{browser, capture, filesystem, process, shell, system};
use crate::command::resolver::PathResolver;
use crate::core::config::DispatchConfig;
use crate::core::error::HandlerResult;
use serde_json::Value;
use std::sync::Arc;

/// Handler tunables, fixed at construction
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub shell: ShellLimits,
    pub search_url: String,
    pub default_screenshot: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

impl DispatchSettings {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            shell: ShellLimits {
                timeout: config.shell_timeout(),
                output_limit: config.output_limit,
            },
            search_url: config.search_url.clone(),
            default_screenshot: config.default_screenshot.clone(),
        }
    }
}

/// Stateless executor for action descriptors.
///
/// Holds no memory between calls: an unconfirmed destructive action is
/// answered with a confirmation request and forgotten.
pub struct ActionDispatcher {
    catalog: ActionCatalog,
    desktop: Arc<dyn Desktop>,
    resolver: PathResolver,
    settings: DispatchSettings,
}

impl ActionDispatcher {
    pub fn new(
        catalog: ActionCatalog,
        desktop: Arc<dyn Desktop>,
        resolver: PathResolver,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            catalog,
            desktop,
            resolver,
            settings,
        }
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub async fn dispatch(&self, descriptor: &ActionDescriptor) -> ResultEnvelope {
        self.execute(&descriptor.action, &descriptor.params).await
    }

    /// Execute one action and report the outcome as a message
    pub async fn execute(&self, action: &str, params: &Params) -> ResultEnvelope {
        let Some(spec) = self.catalog.spec(action) else {
            tracing::warn!(action, "Unknown action");
            return ResultEnvelope::new(format!("Unknown action: {}", action));
        };
        let kind = spec.kind;

        if spec.requires_confirmation && !is_confirmed(params) {
            tracing::info!(action, "Destructive action held for confirmation");
            return ResultEnvelope::new(self.confirmation_request(kind, params));
        }

        let typed = match Action::from_parts(kind, params) {
            Ok(typed) => typed,
            Err(e) => {
                tracing::warn!(action, error = %e, "Parameter validation failed");
                return ResultEnvelope::new(e.to_string());
            }
        };

        tracing::info!(action, "Dispatching action");
        match self.run(typed).await {
            Ok(message) => ResultEnvelope::new(message),
            Err(e) => {
                tracing::warn!(action, error = %e, "Handler failed");
                ResultEnvelope::new(e.to_string())
            }
        }
    }

    /// True when `execute` would stop at the confirmation gate
    pub fn awaits_confirmation(&self, action: &str, params: &Params) -> bool {
        self.catalog
            .spec(action)
            .map(|spec| spec.requires_confirmation && !is_confirmed(params))
            .unwrap_or(false)
    }

    async fn run(&self, action: Action) -> HandlerResult {
        let kind = action.kind();
        let desktop = self.desktop.as_ref();
        match action {
            Action::OpenApp(p) => process::open_app(desktop, &p),
            Action::CloseApp(p) => process::close_app(desktop, &p).await,
            Action::CreateFile(p) => filesystem::create_file(&self.resolver, &p).await,
            Action::CreateFolder(p) => filesystem::create_folder(&self.resolver, &p).await,
            Action::DeleteFile(p) => filesystem::delete_file(&self.resolver, &p).await,
            Action::DeleteFolder(p) => filesystem::delete_folder(&self.resolver, &p).await,
            Action::SearchWeb(p) => browser::search_web(desktop, &self.settings.search_url, &p),
            Action::OpenUrl(p) => browser::open_url(desktop, &p),
            Action::RunCommand(p) => shell::run_command(&p, self.settings.shell).await,
            Action::GetSystemInfo => system::get_system_info(),
            Action::TakeScreenshot(p) => {
                capture::take_screenshot(
                    desktop,
                    &self.resolver,
                    &self.settings.default_screenshot,
                    &p,
                )
                .await
            }
            Action::Respond(p) | Action::Clarify(p) => Ok(p
                .message
                .unwrap_or_else(|| kind.default_message().unwrap_or_default().to_string())),
        }
    }

    fn confirmation_request(&self, kind: ActionKind, params: &Params) -> String {
        let raw_target = kind
            .target_param()
            .and_then(|key| params.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let target = match (kind, raw_target) {
            (ActionKind::DeleteFile | ActionKind::DeleteFolder, Some(path)) => {
                self.resolver.resolve(path).display().to_string()
            }
            (_, Some(other)) => other.to_string(),
            (_, None) => "(unspecified)".to_string(),
        };

        let what = match kind {
            ActionKind::DeleteFolder => format!("deletion of folder: {}", target),
            ActionKind::RunCommand => format!("running command: {}", target),
            _ => format!("deletion of: {}", target),
        };

        format!(
            "Please confirm {}. Send {} again with confirmed=true to proceed.",
            what, kind
        )
    }
}
