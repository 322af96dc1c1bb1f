//! # A2A Gateway
//!
//! A JSON-RPC gateway that accepts A2A `tasks/send` calls, forwards the
//! message text to a configurable AI completion backend and answers with a
//! task carrying the completion as its single artifact.
//!
//! Outbound calls run through a Tower stack:
//!
//! ```text
//! UserAgentLayer -> AuthLayer -> ProviderService<Transport>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use a2a_gateway::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = TaskDispatcher::placeholder();
//! let request = JsonRpcRequest::new(
//!     "abc",
//!     "tasks/send",
//!     json!({"message": {"parts": [{"type": "text", "text": "hi"}]}}),
//! );
//!
//! let reply = dispatcher.handle(request).await;
//! let task = reply.body.result.unwrap();
//! assert_eq!(task.output_text(), Some("Processed: hi"));
//! # });
//! ```

pub mod codec;
pub mod config;
pub mod layer;
pub mod preprocess;
pub mod protocol;
pub mod provider;
pub mod server;
pub mod service;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        config::{ConfigError, GatewayConfig},
        preprocess::{PreprocessChain, Preprocessor},
        protocol::{
            AgentDescriptor, GatewayError, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
            ProviderError, ProviderErrorKind, RequestId, Task, TaskMessage, TaskState,
        },
        provider::{
            HttpProvider, PlaceholderProvider, Provider, ProviderConfig, ProviderRegistry,
            ProviderSelector,
        },
        server::GatewayServer,
        service::{RpcReply, TaskDispatcher},
    };
}
