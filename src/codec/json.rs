//! Generic `{"message": ...}` JSON codec

use bytes::Bytes;
use serde_json::{json, Value};

use super::{Completion, PayloadCodec};
use crate::{protocol::error::ProviderError, provider::ProviderConfig};

/// Fields searched, in order, for the completion text
const COMPLETION_FIELDS: [&str; 5] = ["message", "text", "completion", "output", "response"];

/// Codec for simple JSON backends
///
/// Requests are `{"message": prompt}`; the completion is the first string
/// found among [`COMPLETION_FIELDS`] at the top level of the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl PayloadCodec for MessageCodec {
    fn encode_prompt(&self, prompt: &str, _config: &ProviderConfig) -> Result<Bytes, ProviderError> {
        serde_json::to_vec(&json!({ "message": prompt }))
            .map(Bytes::from)
            .map_err(|e| ProviderError::malformed(format!("Failed to encode request: {}", e)))
    }

    fn decode_completion(&self, body: &[u8]) -> Result<Completion, ProviderError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ProviderError::malformed(format!("Invalid JSON response: {}", e)))?;

        COMPLETION_FIELDS
            .iter()
            .find_map(|field| value.get(field).and_then(Value::as_str))
            .map(Completion::new)
            .ok_or_else(|| ProviderError::malformed("Response has no completion field"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig::new("echo", "http://localhost:9000/ai")
    }

    #[test]
    fn test_encode_message_body() {
        let bytes = MessageCodec.encode_prompt("Hello from WASM!", &config()).unwrap();
        assert_eq!(&bytes[..], br#"{"message":"Hello from WASM!"}"#);
    }

    #[test]
    fn test_decode_searches_fields_in_order() {
        let completion = MessageCodec
            .decode_completion(br#"{"output": "second", "text": "first"}"#)
            .unwrap();
        assert_eq!(completion.text, "first");

        let completion = MessageCodec
            .decode_completion(br#"{"response": "ollama style"}"#)
            .unwrap();
        assert_eq!(completion.text, "ollama style");
    }

    #[test]
    fn test_decode_ignores_non_string_fields() {
        let completion = MessageCodec
            .decode_completion(br#"{"message": {"nested": true}, "completion": "ok"}"#)
            .unwrap();
        assert_eq!(completion.text, "ok");
    }

    #[test]
    fn test_decode_missing_completion() {
        assert!(MessageCodec.decode_completion(br#"{"status": "ok"}"#).is_err());
        assert!(MessageCodec.decode_completion(b"not json").is_err());
    }
}
