use std::{
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    protocol::error::ProviderError,
    transport::{Transport, TransportRequest, TransportResponse},
};

type Handler = dyn Fn(TransportRequest) -> Result<TransportResponse, ProviderError> + Send + Sync;

/// Mock transport for internal testing
///
/// Answers requests from a closure, optionally after a delay, without a
/// network connection or a mock HTTP server.
#[derive(Clone)]
pub(crate) struct MockTransport {
    handler: Arc<Handler>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Create a new mock transport with a custom request handler
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(TransportRequest) -> Result<TransportResponse, ProviderError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            delay: None,
        }
    }

    /// Create a mock transport that always answers with `status` and `body`
    pub fn respond(status: u16, body: &'static str) -> Self {
        Self::new(move |_| Ok(TransportResponse::new(status).body(body.into())))
    }

    /// Wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), ProviderError>> {
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(request)
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish()
    }
}
