//! Service response types

use serde_json::Value;

use crate::{codec::Completion, protocol::jsonrpc::JsonRpcResponse};

/// Response from a provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// Decoded completion (from a prompt payload)
    Completion(Completion),

    /// Raw JSON body (from a JSON payload)
    Json(Value),
}

impl ProviderResponse {
    /// Extract a completion from the response, if present
    pub fn into_completion(self) -> Option<Completion> {
        match self {
            ProviderResponse::Completion(completion) => Some(completion),
            _ => None,
        }
    }

    /// Extract the raw JSON body from the response, if present
    pub fn into_json(self) -> Option<Value> {
        match self {
            ProviderResponse::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// A JSON-RPC response paired with the HTTP status it is served with
#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    pub status: u16,
    pub body: JsonRpcResponse,
}

impl RpcReply {
    pub fn new(status: u16, body: JsonRpcResponse) -> Self {
        Self { status, body }
    }
}
