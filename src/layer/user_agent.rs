//! User-Agent layer for provider calls

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use rand::seq::SliceRandom;
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::error::ProviderError,
    service::{ProviderRequest, ProviderResponse},
};

/// Fallback when a rotating pool is empty
pub const GATEWAY_USER_AGENT: &str = concat!("a2a-gateway/", env!("CARGO_PKG_VERSION"));

const DEFAULT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

/// Supplies the identification header value for each outbound call
pub trait UserAgentSource: Send + Sync {
    fn user_agent(&self) -> String;
}

/// Picks a random entry from a pool on every call
#[derive(Debug, Clone)]
pub struct RotatingUserAgent {
    pool: Vec<String>,
}

impl RotatingUserAgent {
    pub fn new(pool: Vec<String>) -> Self {
        Self { pool }
    }
}

impl Default for RotatingUserAgent {
    fn default() -> Self {
        Self::new(DEFAULT_POOL.iter().map(|ua| ua.to_string()).collect())
    }
}

impl UserAgentSource for RotatingUserAgent {
    fn user_agent(&self) -> String {
        self.pool
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| GATEWAY_USER_AGENT.to_string())
    }
}

/// Always the same value
#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl UserAgentSource for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}

/// Layer that sets `User-Agent` on every provider request
#[derive(Clone)]
pub struct UserAgentLayer {
    source: Arc<dyn UserAgentSource>,
}

impl UserAgentLayer {
    pub fn new(source: Arc<dyn UserAgentSource>) -> Self {
        Self { source }
    }

    /// Random pick from the built-in pool
    pub fn rotating() -> Self {
        Self::new(Arc::new(RotatingUserAgent::default()))
    }

    pub fn fixed(user_agent: impl Into<String>) -> Self {
        Self::new(Arc::new(FixedUserAgent(user_agent.into())))
    }
}

impl<S> Layer<S> for UserAgentLayer {
    type Service = UserAgentService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserAgentService {
            inner,
            source: self.source.clone(),
        }
    }
}

/// User-Agent service
#[derive(Clone)]
pub struct UserAgentService<S> {
    inner: S,
    source: Arc<dyn UserAgentSource>,
}

impl<S> Service<ProviderRequest> for UserAgentService<S>
where
    S: Service<ProviderRequest, Response = ProviderResponse, Error = ProviderError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ProviderResponse;
    type Error = ProviderError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: ProviderRequest) -> Self::Future {
        req.context
            .metadata
            .insert("User-Agent".to_string(), self.source.user_agent());

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}
