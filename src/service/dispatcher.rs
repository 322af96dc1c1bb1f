//! Task dispatcher: envelope validation, routing and response shaping

use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use serde_json::{json, Value};
use tower_service::Service;
use tracing::{debug, warn};

use crate::{
    codec::JsonRpcCodec,
    preprocess::PreprocessChain,
    protocol::{
        error::{GatewayError, ProviderError},
        jsonrpc::{JsonRpcRequest, JsonRpcResponse, RequestId},
        operation::{TaskOperation, TaskSendParams},
        task::Task,
    },
    provider::{
        FixedSelector, PlaceholderProvider, Provider, ProviderRegistry, ProviderSelector,
    },
    service::RpcReply,
};

/// Message sent by the legacy `/api/ai` path
pub const LEGACY_MESSAGE: &str = "Hello from WASM!";

/// Handles JSON-RPC calls end to end
///
/// Every outcome, including malformed input, is turned into an [`RpcReply`];
/// nothing escapes as an error. All shared state is read-only, so clones are
/// cheap and calls are independent.
#[derive(Clone)]
pub struct TaskDispatcher {
    provider: Arc<dyn Provider>,
    registry: Arc<ProviderRegistry>,
    selector: Arc<dyn ProviderSelector>,
    prompt_preprocessor: Arc<PreprocessChain>,
    legacy_preprocessor: Arc<PreprocessChain>,
    codec: JsonRpcCodec,
}

impl TaskDispatcher {
    /// Create a dispatcher with the fixed selection policy and no preprocessing
    pub fn new(provider: Arc<dyn Provider>, registry: ProviderRegistry) -> Self {
        Self {
            provider,
            registry: Arc::new(registry),
            selector: Arc::new(FixedSelector),
            prompt_preprocessor: Arc::new(PreprocessChain::new()),
            legacy_preprocessor: Arc::new(PreprocessChain::new()),
            codec: JsonRpcCodec::new(),
        }
    }

    /// Dispatcher answering with `Processed: <text>` and no backend
    pub fn placeholder() -> Self {
        Self::new(Arc::new(PlaceholderProvider), ProviderRegistry::placeholder())
    }

    pub fn with_selector(mut self, selector: Arc<dyn ProviderSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Chain applied to `tasks/send` prompts
    pub fn with_prompt_preprocessor(mut self, preprocessor: PreprocessChain) -> Self {
        self.prompt_preprocessor = Arc::new(preprocessor);
        self
    }

    /// Chain applied to the `/api/ai` JSON payload
    pub fn with_legacy_preprocessor(mut self, preprocessor: PreprocessChain) -> Self {
        self.legacy_preprocessor = Arc::new(preprocessor);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Handle a raw request body
    pub async fn handle_bytes(&self, body: &[u8]) -> RpcReply {
        match self.codec.decode_request(body) {
            Ok(request) => self.handle(request).await,
            Err(error) => Self::reject(None, error),
        }
    }

    /// Handle a decoded request
    pub async fn handle(&self, request: JsonRpcRequest) -> RpcReply {
        let call = match self.codec.validate(&request) {
            Ok(call) => call,
            Err(error) => return Self::reject(request.response_id(), error),
        };

        let operation = match TaskOperation::from_call(&call.method, &call.params) {
            Ok(operation) => operation,
            Err(error) => return Self::reject(Some(call.id), error),
        };

        match operation {
            TaskOperation::Send(params) => self.send_task(call.id, params).await,
        }
    }

    async fn send_task(&self, id: RequestId, params: TaskSendParams) -> RpcReply {
        let task = match &params.task_id {
            Some(task_id) => Task::new(task_id.clone()),
            None => Task::with_generated_id(),
        };
        debug!(request_id = %id, task_id = %task.id, "Task submitted");

        match self.complete(&params).await {
            Ok(text) => {
                debug!(task_id = %task.id, "Task completed");
                RpcReply::new(200, JsonRpcResponse::success(id, task.complete(text)))
            }
            Err(error) => {
                warn!(
                    task_id = %task.id,
                    kind = %error.kind,
                    status = ?error.status,
                    error = %error.message,
                    "Provider call failed"
                );
                let task = task.fail();
                let error = GatewayError::from(error);

                let mut rpc_error = error.to_rpc_error();
                if let Ok(data) = serde_json::to_value(&task) {
                    rpc_error = rpc_error.with_data(data);
                }
                RpcReply::new(error.http_status(), JsonRpcResponse::failure(Some(id), rpc_error))
            }
        }
    }

    async fn complete(&self, params: &TaskSendParams) -> Result<String, ProviderError> {
        let config = self.selector.select(params, &self.registry)?;
        let prompt = self.prompt_preprocessor.apply(params.prompt());
        self.provider.complete(&prompt, config).await
    }

    /// Send the fixed legacy payload to the legacy provider
    pub async fn forward_legacy(&self) -> Result<Value, ProviderError> {
        let payload = json!({ "message": LEGACY_MESSAGE }).to_string();
        let payload = self.legacy_preprocessor.apply(&payload);
        let config = self.registry.legacy_config();
        let provider = config.identifier.clone();

        debug!(%provider, "Forwarding legacy payload");
        self.provider.forward(payload, config).await.inspect_err(|error| {
            warn!(%provider, %error, "Legacy provider call failed");
        })
    }

    fn reject(id: Option<RequestId>, error: GatewayError) -> RpcReply {
        debug!(%error, "Rejecting request");
        RpcReply::new(
            error.http_status(),
            JsonRpcResponse::failure(id, error.to_rpc_error()),
        )
    }
}

impl Service<JsonRpcRequest> for TaskDispatcher {
    type Response = RpcReply;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: JsonRpcRequest) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.handle(req).await) })
    }
}
