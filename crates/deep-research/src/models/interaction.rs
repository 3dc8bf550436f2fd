use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier the service hands back when an interaction is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionHandle(String);

impl InteractionHandle {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteractionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionStatus {
    /// Still running. Keeps the label the service reported.
    Pending(String),
    Completed,
    Failed,
}

impl InteractionStatus {
    pub fn from_label(label: &str) -> Self {
        match label {
            "completed" => InteractionStatus::Completed,
            "failed" | "cancelled" => InteractionStatus::Failed,
            other => InteractionStatus::Pending(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            InteractionStatus::Pending(label) => label,
            InteractionStatus::Completed => "completed",
            InteractionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InteractionStatus::Pending(_))
    }
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFragment {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl OutputFragment {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            kind: Some("text".to_string()),
            text: Some(text.into()),
        }
    }
}

/// One status snapshot of a remote interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub handle: InteractionHandle,
    pub status: InteractionStatus,
    pub error: Option<String>,
    pub outputs: Vec<OutputFragment>,
}

impl Interaction {
    pub fn pending<S: Into<String>>(id: S) -> Self {
        Self {
            handle: InteractionHandle::new(id),
            status: InteractionStatus::Pending("in_progress".to_string()),
            error: None,
            outputs: Vec::new(),
        }
    }

    pub fn completed<S: Into<String>, T: Into<String>>(id: S, text: T) -> Self {
        Self {
            handle: InteractionHandle::new(id),
            status: InteractionStatus::Completed,
            error: None,
            outputs: vec![OutputFragment::text(text)],
        }
    }

    pub fn failed<S: Into<String>, T: Into<String>>(id: S, error: T) -> Self {
        Self {
            handle: InteractionHandle::new(id),
            status: InteractionStatus::Failed,
            error: Some(error.into()),
            outputs: Vec::new(),
        }
    }

    /// Text of the last output fragment. Earlier fragments are partial results.
    pub fn final_text(&self) -> Option<&str> {
        self.outputs.last().and_then(|fragment| fragment.text.as_deref())
    }

    pub fn error_detail(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "no error detail reported".to_string())
    }
}

/// Interaction object as returned by the service.
#[derive(Debug, Deserialize)]
pub(crate) struct InteractionPayload {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub outputs: Option<Vec<OutputFragment>>,
}

impl From<InteractionPayload> for Interaction {
    fn from(payload: InteractionPayload) -> Self {
        let status = payload
            .status
            .as_deref()
            .map(InteractionStatus::from_label)
            .unwrap_or_else(|| InteractionStatus::Pending("pending".to_string()));

        Self {
            handle: InteractionHandle(payload.id),
            status,
            error: payload.error.as_ref().and_then(error_message),
            outputs: payload.outputs.unwrap_or_default(),
        }
    }
}

fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => Some(
            fields
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        ),
        other => Some(other.to_string()),
    }
}
