//! Core protocol types: JSON-RPC envelope, tasks, messages and the descriptor

use serde::{Deserialize, Serialize};

pub mod agent;
pub mod error;
pub mod jsonrpc;
pub mod message;
pub mod operation;
pub mod task;

pub use agent::{AgentCapabilities, AgentDescriptor};
pub use error::{GatewayError, ProviderError, ProviderErrorKind};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use message::{Part, TaskMessage};
pub use operation::{TaskOperation, TaskSendParams};
pub use task::{Task, TaskState, TaskStatus};

/// Output of a completed task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    /// Contents of the artifact. A single text part for this gateway
    pub parts: Vec<Part>,

    /// Position among the task's artifacts
    pub index: u32,
}

impl Artifact {
    /// The sole text artifact of a completed task
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
            index: 0,
        }
    }
}
