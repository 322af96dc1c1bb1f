//! Outbound provider request types

use std::{collections::HashMap, sync::Arc, time::Duration};

use bytes::Bytes;

use crate::{layer::auth::AuthCredentials, provider::ProviderConfig};

/// A request to a provider backend
///
/// Pairs the payload with the provider it targets and the per-call context
/// the layers fill in.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Target provider
    pub config: Arc<ProviderConfig>,

    /// What to send
    pub payload: ProviderPayload,

    /// Request context (auth, timeout, extra headers)
    pub context: RequestContext,
}

impl ProviderRequest {
    /// Ask the provider to complete a prompt
    pub fn prompt(config: Arc<ProviderConfig>, prompt: impl Into<String>) -> Self {
        let context = RequestContext::for_config(&config);
        Self {
            config,
            payload: ProviderPayload::Prompt(prompt.into()),
            context,
        }
    }

    /// Post an already-serialized JSON body and return the provider's JSON
    pub fn json(config: Arc<ProviderConfig>, body: impl Into<Bytes>) -> Self {
        let context = RequestContext::for_config(&config);
        Self {
            config,
            payload: ProviderPayload::Json(body.into()),
            context,
        }
    }
}

/// Outbound payload
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    /// Encoded with the provider's payload codec, answered with a completion
    Prompt(String),

    /// Sent verbatim, answered with the raw JSON body
    Json(Bytes),
}

/// Per-call context
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Authentication credentials (if any)
    pub auth: Option<AuthCredentials>,

    /// Upper bound on the provider call
    pub timeout: Duration,

    /// Additional headers
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    /// Context with the provider's timeout and no headers yet
    pub fn for_config(config: &ProviderConfig) -> Self {
        Self {
            auth: None,
            timeout: config.timeout,
            metadata: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_takes_provider_timeout() {
        let config = ProviderConfig::new("slow", "http://localhost:1/v1/chat/completions")
            .with_timeout(Duration::from_secs(5));
        let request = ProviderRequest::prompt(Arc::new(config), "hi");

        assert_eq!(request.context.timeout, Duration::from_secs(5));
        assert!(request.context.auth.is_none());
        assert_eq!(request.payload, ProviderPayload::Prompt("hi".into()));
    }

    #[test]
    fn test_json_request_keeps_body() {
        let config = Arc::new(ProviderConfig::new("legacy", "http://localhost:1/ai"));
        let request = ProviderRequest::json(config, r#"{"message":"x"}"#);

        assert_eq!(
            request.payload,
            ProviderPayload::Json(Bytes::from_static(br#"{"message":"x"}"#))
        );
        assert!(request.context.metadata.is_empty());
    }
}
