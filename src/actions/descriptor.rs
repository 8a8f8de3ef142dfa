//! Per-turn values exchanged between parser, dispatcher and session

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped action parameters as produced by the parser
pub type Params = Map<String, Value>;

/// Structured command produced once per turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub action: String,
    #[serde(default)]
    pub params: Params,
}

impl ActionDescriptor {
    pub fn new(action: impl Into<String>, params: Params) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }

    /// A conversational reply carrying `message`
    pub fn respond(message: impl Into<String>) -> Self {
        let mut params = Params::new();
        params.insert("message".into(), Value::String(message.into()));
        Self::new("respond", params)
    }

    /// The `message` parameter, if it is a string
    pub fn message(&self) -> Option<&str> {
        self.params.get("message").and_then(Value::as_str)
    }

    pub fn is_confirmed(&self) -> bool {
        is_confirmed(&self.params)
    }

    /// Copy of this descriptor with `confirmed` set to `true`
    pub fn confirmed(&self) -> Self {
        let mut params = self.params.clone();
        params.insert("confirmed".into(), Value::Bool(true));
        Self::new(self.action.clone(), params)
    }
}

/// Only the JSON boolean `true` confirms; `"true"` or `1` do not.
pub fn is_confirmed(params: &Params) -> bool {
    matches!(params.get("confirmed"), Some(Value::Bool(true)))
}

/// Uniform outcome of a dispatch, success or failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub message: String,
}

impl ResultEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
