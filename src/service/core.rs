//! Core provider service implementation

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use serde_json::Value;
use tower_service::Service;
use url::Url;

use crate::{
    codec::PayloadCodec,
    protocol::error::ProviderError,
    service::{ProviderPayload, ProviderRequest, ProviderResponse},
    transport::{Transport, TransportRequest, TransportResponse},
};

/// Innermost service of the outbound stack
///
/// Encodes the payload with the provider's codec, executes it over the
/// transport within the context timeout, and maps the response. Any
/// response outside 2xx is an upstream failure.
pub struct ProviderService<T> {
    transport: T,
}

impl<T> ProviderService<T>
where
    T: Transport,
{
    /// Create a new provider service
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Build a transport request from a provider request
    fn build_transport_request(req: &ProviderRequest) -> Result<TransportRequest, ProviderError> {
        let url = Url::parse(&req.config.endpoint_url).map_err(|e| {
            ProviderError::transport(format!(
                "Invalid endpoint URL '{}': {}",
                req.config.endpoint_url, e
            ))
        })?;
        let codec = req.config.format.codec();

        let mut transport_req = TransportRequest::new(url, "POST")
            .header("Content-Type", codec.content_type())
            .header("Accept", "application/json");

        if let Some(auth) = &req.context.auth {
            let (header, value) = auth.to_header();
            transport_req = transport_req.header(header, value);
        }

        for (key, value) in &req.context.metadata {
            transport_req = transport_req.header(key.clone(), value.clone());
        }

        let body = match &req.payload {
            ProviderPayload::Prompt(prompt) => codec.encode_prompt(prompt, &req.config)?,
            ProviderPayload::Json(body) => body.clone(),
        };

        Ok(transport_req.body(body))
    }

    /// Parse a transport response into a provider response
    fn parse_transport_response(
        transport_resp: TransportResponse,
        codec: &dyn PayloadCodec,
        payload: &ProviderPayload,
    ) -> Result<ProviderResponse, ProviderError> {
        if !transport_resp.is_success() {
            return Err(Self::handle_error_response(&transport_resp));
        }

        match payload {
            ProviderPayload::Prompt(_) => codec
                .decode_completion(&transport_resp.body)
                .map(ProviderResponse::Completion),
            ProviderPayload::Json(_) => serde_json::from_slice::<Value>(&transport_resp.body)
                .map(ProviderResponse::Json)
                .map_err(|e| ProviderError::malformed(format!("Invalid JSON response: {}", e))),
        }
    }

    /// Handle error responses from the transport
    fn handle_error_response(transport_resp: &TransportResponse) -> ProviderError {
        let status = transport_resp.status;

        // OpenAI-style {"error": {"message"}} or a flat {"message"}
        if let Ok(json) = serde_json::from_slice::<Value>(&transport_resp.body) {
            let message = json
                .pointer("/error/message")
                .or_else(|| json.get("message"))
                .and_then(Value::as_str);
            if let Some(message) = message {
                return ProviderError::upstream(status, format!("HTTP {}: {}", status, message));
            }
        }

        ProviderError::upstream(status, format!("HTTP error: {}", status))
    }
}

impl<T> Service<ProviderRequest> for ProviderService<T>
where
    T: Transport + Clone,
{
    type Response = ProviderResponse;
    type Error = ProviderError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.transport.poll_ready(cx)
    }

    fn call(&mut self, req: ProviderRequest) -> Self::Future {
        let transport = self.transport.clone();

        Box::pin(async move {
            let transport_req = Self::build_transport_request(&req)?;

            let timeout = req.context.timeout;
            let transport_resp = tokio::time::timeout(timeout, transport.execute(transport_req))
                .await
                .map_err(|_| ProviderError::timeout(timeout))??;

            Self::parse_transport_response(transport_resp, req.config.format.codec(), &req.payload)
        })
    }
}

impl<T> Clone for ProviderService<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}
