//! Typed parameter records, validated from the parser's untyped mapping

use crate::actions::catalog::ActionKind;
use crate::actions::descriptor::Params;
use crate::core::error::HandlerError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct AppParams {
    pub app_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFileParams {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathParams {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlParams {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandParams {
    pub command: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreenshotParams {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageParams {
    #[serde(default)]
    pub message: Option<String>,
}

/// A fully validated action, one variant per catalog entry
#[derive(Debug, Clone)]
pub enum Action {
    OpenApp(AppParams),
    CloseApp(AppParams),
    CreateFile(CreateFileParams),
    CreateFolder(PathParams),
    DeleteFile(PathParams),
    DeleteFolder(PathParams),
    SearchWeb(SearchParams),
    OpenUrl(UrlParams),
    RunCommand(CommandParams),
    GetSystemInfo,
    TakeScreenshot(ScreenshotParams),
    Respond(MessageParams),
    Clarify(MessageParams),
}

impl Action {
    /// Validate `params` against the record for `kind`
    pub fn from_parts(kind: ActionKind, params: &Params) -> Result<Self, HandlerError> {
        let action = match kind {
            ActionKind::OpenApp => Action::OpenApp(decode(kind, params)?),
            ActionKind::CloseApp => Action::CloseApp(decode(kind, params)?),
            ActionKind::CreateFile => Action::CreateFile(decode(kind, params)?),
            ActionKind::CreateFolder => Action::CreateFolder(decode(kind, params)?),
            ActionKind::DeleteFile => Action::DeleteFile(decode(kind, params)?),
            ActionKind::DeleteFolder => Action::DeleteFolder(decode(kind, params)?),
            ActionKind::SearchWeb => Action::SearchWeb(decode(kind, params)?),
            ActionKind::OpenUrl => Action::OpenUrl(decode(kind, params)?),
            ActionKind::RunCommand => Action::RunCommand(decode(kind, params)?),
            ActionKind::GetSystemInfo => Action::GetSystemInfo,
            ActionKind::TakeScreenshot => Action::TakeScreenshot(decode(kind, params)?),
            ActionKind::Respond => Action::Respond(decode(kind, params)?),
            ActionKind::Clarify => Action::Clarify(decode(kind, params)?),
        };
        action.check_required(kind)?;
        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::OpenApp(_) => ActionKind::OpenApp,
            Action::CloseApp(_) => ActionKind::CloseApp,
            Action::CreateFile(_) => ActionKind::CreateFile,
            Action::CreateFolder(_) => ActionKind::CreateFolder,
            Action::DeleteFile(_) => ActionKind::DeleteFile,
            Action::DeleteFolder(_) => ActionKind::DeleteFolder,
            Action::SearchWeb(_) => ActionKind::SearchWeb,
            Action::OpenUrl(_) => ActionKind::OpenUrl,
            Action::RunCommand(_) => ActionKind::RunCommand,
            Action::GetSystemInfo => ActionKind::GetSystemInfo,
            Action::TakeScreenshot(_) => ActionKind::TakeScreenshot,
            Action::Respond(_) => ActionKind::Respond,
            Action::Clarify(_) => ActionKind::Clarify,
        }
    }

    fn check_required(&self, kind: ActionKind) -> Result<(), HandlerError> {
        let (field, value) = match self {
            Action::OpenApp(p) | Action::CloseApp(p) => ("app_name", p.app_name.as_str()),
            Action::CreateFile(p) => ("path", p.path.as_str()),
            Action::CreateFolder(p) | Action::DeleteFile(p) | Action::DeleteFolder(p) => {
                ("path", p.path.as_str())
            }
            Action::SearchWeb(p) => ("query", p.query.as_str()),
            Action::OpenUrl(p) => ("url", p.url.as_str()),
            Action::RunCommand(p) => ("command", p.command.as_str()),
            Action::GetSystemInfo
            | Action::TakeScreenshot(_)
            | Action::Respond(_)
            | Action::Clarify(_) => return Ok(()),
        };
        if value.trim().is_empty() {
            return Err(HandlerError::InvalidParams {
                action: kind,
                reason: format!("`{}` must not be empty", field),
            });
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(kind: ActionKind, params: &Params) -> Result<T, HandlerError> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|e| {
        HandlerError::InvalidParams {
            action: kind,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> Params {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_file_content_defaults_to_empty() {
        let action =
            Action::from_parts(ActionKind::CreateFile, &params(json!({"path": "a.txt"}))).unwrap();
        match action {
            Action::CreateFile(p) => {
                assert_eq!(p.path, "a.txt");
                assert_eq!(p.content, "");
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let action = Action::from_parts(
            ActionKind::DeleteFile,
            &params(json!({"path": "a.txt", "confirmed": true, "reason": "cleanup"})),
        )
        .unwrap();
        assert_eq!(action.kind(), ActionKind::DeleteFile);
    }

    #[test]
    fn test_missing_field_is_invalid_params() {
        let err = Action::from_parts(ActionKind::OpenUrl, &params(json!({}))).unwrap_err();
        assert!(err.to_string().starts_with("Invalid parameters for open_url"));
    }

    #[test]
    fn test_wrong_type_is_invalid_params() {
        let err =
            Action::from_parts(ActionKind::RunCommand, &params(json!({"command": 42}))).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidParams { .. }));
    }

    #[test]
    fn test_blank_required_field_is_invalid() {
        let err = Action::from_parts(ActionKind::OpenApp, &params(json!({"app_name": "  "})))
            .unwrap_err();
        assert!(err.to_string().contains("`app_name` must not be empty"));
    }

    #[test]
    fn test_parameterless_actions_accept_anything() {
        assert!(Action::from_parts(ActionKind::GetSystemInfo, &params(json!({"x": 1}))).is_ok());
        assert!(Action::from_parts(ActionKind::TakeScreenshot, &params(json!({}))).is_ok());
    }
}
