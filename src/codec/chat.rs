//! OpenAI-compatible chat-completions codec
//!
//! Spoken by OpenAI, DeepSeek, xAI, Qwen (compatible mode) and Ollama's
//! `/v1/chat/completions` endpoint.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{Completion, PayloadCodec, TokenUsage};
use crate::{protocol::error::ProviderError, provider::ProviderConfig};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatCodec;

impl PayloadCodec for ChatCodec {
    fn encode_prompt(&self, prompt: &str, config: &ProviderConfig) -> Result<Bytes, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = config.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatRequest {
            model: config.model.as_deref(),
            messages,
            stream: false,
        };

        serde_json::to_vec(&request)
            .map(Bytes::from)
            .map_err(|e| ProviderError::malformed(format!("Failed to encode chat request: {}", e)))
    }

    fn decode_completion(&self, body: &[u8]) -> Result<Completion, ProviderError> {
        let response: ChatResponse = serde_json::from_slice(body)
            .map_err(|e| ProviderError::malformed(format!("Invalid chat response: {}", e)))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| ProviderError::malformed("Chat response has no choices[0].message.content"))?;

        Ok(Completion {
            text,
            usage: response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::protocol::error::ProviderErrorKind;

    #[test]
    fn test_encode_with_system_prompt() {
        let config = ProviderConfig::new("xai", "https://api.x.ai/v1/chat/completions")
            .with_model("grok-2-latest")
            .with_system_prompt("You are Grok.");

        let bytes = ChatCodec.encode_prompt("hi", &config).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["model"], "grok-2-latest");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are Grok.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_encode_without_model_omits_field() {
        let config = ProviderConfig::new("local", "http://localhost:8080/v1/chat/completions");

        let bytes = ChatCodec.encode_prompt("hello", &config).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        assert!(json.get("model").is_none());
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_decode_completion_with_usage() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        });

        let completion = ChatCodec
            .decode_completion(body.to_string().as_bytes())
            .unwrap();

        assert_eq!(completion.text, "Hello!");
        assert_eq!(
            completion.usage,
            Some(TokenUsage {
                prompt_tokens: 3,
                completion_tokens: 2,
                total_tokens: 5
            })
        );
    }

    #[test]
    fn test_decode_without_choices_is_malformed() {
        let err = ChatCodec
            .decode_completion(br#"{"choices": []}"#)
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::MalformedResponse);

        let err = ChatCodec.decode_completion(b"<html>").unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::MalformedResponse);
    }
}
