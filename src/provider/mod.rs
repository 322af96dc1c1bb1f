//! Provider adapters
//!
//! A [`Provider`] turns a prompt into a completion using one of the configs
//! held by the [`ProviderRegistry`]. [`HttpProvider`] runs the tower stack
//! over a real transport; [`PlaceholderProvider`] answers locally when no
//! backend is configured.

pub mod config;
pub mod http;
pub mod placeholder;
pub mod registry;

pub use config::{PayloadFormat, ProviderConfig, DEFAULT_PROVIDER_TIMEOUT};
pub use http::{HttpProvider, ProviderStack};
pub use placeholder::PlaceholderProvider;
pub use registry::{
    FixedSelector, ParamsSelector, ProviderRegistry, ProviderSelector, SelectionPolicy,
    PLACEHOLDER_PROVIDER,
};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::error::ProviderError;

/// Uniform interface to an AI backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Complete a text prompt
    async fn complete(&self, prompt: &str, config: Arc<ProviderConfig>) -> Result<String, ProviderError>;

    /// Post a raw JSON payload and return the provider's JSON body
    async fn forward(&self, payload: String, config: Arc<ProviderConfig>) -> Result<Value, ProviderError>;
}
