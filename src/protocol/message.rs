//! Message types carried in `tasks/send` params

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message submitted with a task
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskMessage {
    /// Optional sender role, accepted and ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl TaskMessage {
    /// Read a message leniently
    ///
    /// Parts are taken in order up to the first one that does not fit the
    /// part shape; a non-string role is dropped.
    pub fn from_value(message: &Value) -> Self {
        let parts = message
            .get("parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .map_while(|part| Part::deserialize(part).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            role: message.get("role").and_then(Value::as_str).map(str::to_owned),
            parts,
        }
    }

    /// Text of the first part. Later parts are not consumed.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.first().and_then(|part| part.text.as_deref())
    }
}

/// A content part of a message or artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(rename = "type", default = "default_part_type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

fn default_part_type() -> String {
    "text".to_string()
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: default_part_type(),
            text: Some(text.into()),
        }
    }
}
