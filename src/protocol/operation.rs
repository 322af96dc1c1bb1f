//! Gateway operations

use serde_json::Value;

use super::{error::GatewayError, message::TaskMessage};

/// Text used when a `tasks/send` message carries no text part
pub const NO_TEXT_PROVIDED: &str = "No text provided";

/// Operations the gateway serves
///
/// The JSON-RPC method name selects the variant. Only `tasks/send` is
/// supported; the gateway keeps no task history, so there is nothing for
/// `tasks/get` or `tasks/cancel` to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOperation {
    /// Submit a message for a single-shot completion
    Send(TaskSendParams),
}

impl TaskOperation {
    pub const SEND: &'static str = "tasks/send";

    /// Route a method name and its params to an operation
    pub fn from_call(method: &str, params: &Value) -> Result<Self, GatewayError> {
        match method {
            Self::SEND => Ok(TaskOperation::Send(TaskSendParams::from_value(params))),
            other => Err(GatewayError::MethodNotFound(other.to_string())),
        }
    }
}

/// Parameters of a `tasks/send` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSendParams {
    /// Caller-supplied task id
    pub task_id: Option<String>,

    /// The submitted message
    pub message: TaskMessage,

    /// Requested provider, honoured only by a params-aware selector
    pub provider: Option<String>,
}

impl TaskSendParams {
    /// Extract params leniently
    ///
    /// Fields of the wrong type are treated as absent rather than rejected.
    pub fn from_value(params: &Value) -> Self {
        let non_empty = |key: &str| {
            params
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        Self {
            task_id: non_empty("id"),
            message: params
                .get("message")
                .map(TaskMessage::from_value)
                .unwrap_or_default(),
            provider: non_empty("provider"),
        }
    }

    /// The prompt to send, falling back to [`NO_TEXT_PROVIDED`]
    pub fn prompt(&self) -> &str {
        self.message.first_text().unwrap_or(NO_TEXT_PROVIDED)
    }
}
