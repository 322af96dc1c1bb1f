//! Local stand-in used when no backend is configured

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Provider, ProviderConfig};
use crate::protocol::error::ProviderError;

/// Echoes the prompt back as `Processed: <prompt>`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

#[async_trait]
impl Provider for PlaceholderProvider {
    async fn complete(&self, prompt: &str, _config: Arc<ProviderConfig>) -> Result<String, ProviderError> {
        Ok(format!("Processed: {prompt}"))
    }

    async fn forward(&self, payload: String, _config: Arc<ProviderConfig>) -> Result<Value, ProviderError> {
        Ok(json!({ "message": format!("Processed: {payload}") }))
    }
}
