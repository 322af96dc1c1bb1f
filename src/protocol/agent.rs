//! Agent descriptor served for discovery

use serde::{Deserialize, Serialize};

/// Static capability manifest
///
/// Published at `/.well-known/agent.json`. Built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDescriptor {
    /// Name of the agent
    pub name: String,

    /// Human-readable description of the agent
    pub description: String,

    /// Public URL of the JSON-RPC endpoint
    pub url: String,

    /// Agent version
    pub version: String,

    /// Agent capabilities
    pub capabilities: AgentCapabilities,
}

impl AgentDescriptor {
    pub const DEFAULT_NAME: &'static str = "A2A AI Gateway";
    pub const DEFAULT_DESCRIPTION: &'static str =
        "Forwards A2A tasks/send requests to configurable AI completion backends";
    pub const DEFAULT_URL: &'static str = "http://localhost:3000";

    /// Create a new descriptor with default capabilities
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: AgentCapabilities::default(),
        }
    }

    /// Set version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set capabilities
    pub fn with_capabilities(mut self, capabilities: AgentCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

impl Default for AgentDescriptor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME, Self::DEFAULT_DESCRIPTION, Self::DEFAULT_URL)
    }
}

/// What the agent supports. The gateway is single-shot, so all false.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
    pub state_transition_history: bool,
}
