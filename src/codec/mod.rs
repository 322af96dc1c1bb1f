//! Serialization codecs
//!
//! [`JsonRpcCodec`] handles the inbound JSON-RPC envelope. [`PayloadCodec`]
//! implementations handle the outbound wire formats spoken by AI backends.

pub mod chat;
pub mod json;
pub mod jsonrpc;

pub use chat::ChatCodec;
pub use json::MessageCodec;
pub use jsonrpc::{JsonRpcCodec, ValidatedCall};

use bytes::Bytes;
use serde::Deserialize;

use crate::{protocol::error::ProviderError, provider::ProviderConfig};

/// Codec trait for provider request and response bodies
///
/// Each backend family speaks one wire format; the provider config selects
/// which codec is used.
pub trait PayloadCodec: Send + Sync {
    /// Serialize a prompt into a request body
    fn encode_prompt(&self, prompt: &str, config: &ProviderConfig) -> Result<Bytes, ProviderError>;

    /// Extract the completion from a successful response body
    fn decode_completion(&self, body: &[u8]) -> Result<Completion, ProviderError>;

    /// Get the content type for this codec
    fn content_type(&self) -> &str {
        "application/json"
    }
}

/// A decoded completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// Token counts reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}
