//! HTTP provider running the outbound tower stack

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use serde_json::Value;
use tower::{Service, ServiceBuilder, ServiceExt};
use tracing::debug;

use super::{Provider, ProviderConfig};
use crate::{
    codec::TokenUsage,
    layer::{AuthLayer, AuthService, UserAgentLayer, UserAgentService},
    protocol::error::ProviderError,
    service::{ProviderRequest, ProviderResponse, ProviderService},
    transport::{HttpTransport, Transport},
};

/// `UserAgentLayer → AuthLayer → ProviderService`
pub type ProviderStack<T> = UserAgentService<AuthService<ProviderService<T>>>;

/// Cumulative token counts across all calls
#[derive(Debug, Default)]
struct UsageTotals {
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    total_tokens: AtomicU64,
}

impl UsageTotals {
    fn add(&self, usage: &TokenUsage) {
        self.prompt_tokens.fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.completion_tokens
            .fetch_add(usage.completion_tokens, Ordering::Relaxed);
        self.total_tokens.fetch_add(usage.total_tokens, Ordering::Relaxed);
    }

    fn get(&self) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
    }
}

/// Provider backed by a tower service stack
#[derive(Clone)]
pub struct HttpProvider<S> {
    service: S,
    usage: Arc<UsageTotals>,
}

impl<S> HttpProvider<S> {
    /// Wrap an already-built service
    pub fn new(service: S) -> Self {
        Self {
            service,
            usage: Arc::new(UsageTotals::default()),
        }
    }

    /// Token counts reported by backends since startup
    pub fn token_usage(&self) -> TokenUsage {
        self.usage.get()
    }
}

impl<T: Transport> HttpProvider<ProviderStack<T>> {
    /// Build the standard stack over a transport
    pub fn with_transport(transport: T, user_agent: UserAgentLayer) -> Self {
        let service = ServiceBuilder::new()
            .layer(user_agent)
            .layer(AuthLayer::new())
            .service(ProviderService::new(transport));
        Self::new(service)
    }
}

impl HttpProvider<ProviderStack<HttpTransport>> {
    /// Build the standard stack over reqwest
    pub fn http(user_agent: UserAgentLayer) -> Self {
        Self::with_transport(HttpTransport::new(), user_agent)
    }
}

impl<S> HttpProvider<S>
where
    S: Service<ProviderRequest, Response = ProviderResponse, Error = ProviderError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.service.clone().oneshot(request).await
    }
}

#[async_trait]
impl<S> Provider for HttpProvider<S>
where
    S: Service<ProviderRequest, Response = ProviderResponse, Error = ProviderError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    async fn complete(&self, prompt: &str, config: Arc<ProviderConfig>) -> Result<String, ProviderError> {
        let request = ProviderRequest::prompt(config.clone(), prompt);
        let completion = self
            .execute(request)
            .await?
            .into_completion()
            .ok_or_else(|| ProviderError::malformed("Expected a completion response"))?;

        if let Some(usage) = &completion.usage {
            self.usage.add(usage);
            debug!(
                provider = %config.identifier,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Token usage"
            );
        }

        Ok(completion.text)
    }

    async fn forward(&self, payload: String, config: Arc<ProviderConfig>) -> Result<Value, ProviderError> {
        let request = ProviderRequest::json(config, payload);
        self.execute(request)
            .await?
            .into_json()
            .ok_or_else(|| ProviderError::malformed("Expected a JSON response"))
    }
}
