//! Gateway configuration from environment variables
//!
//! Read once at startup. Every variable is optional; unset values fall back
//! to defaults, and with no providers listed the gateway runs in placeholder
//! mode.

use std::{env, fmt::Display, str::FromStr, sync::Arc, time::Duration};

use thiserror::Error;
use url::Url;

use crate::{
    layer::UserAgentLayer,
    preprocess::{CompactJson, PreprocessChain},
    protocol::agent::AgentDescriptor,
    provider::{
        HttpProvider, PayloadFormat, PlaceholderProvider, Provider, ProviderConfig,
        ProviderRegistry, SelectionPolicy, DEFAULT_PROVIDER_TIMEOUT,
    },
    service::TaskDispatcher,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Provider '{0}' has no preset, set GATEWAY_PROVIDER_<ID>_URL")]
    MissingEndpoint(String),

    #[error("Provider '{0}' is not registered")]
    UnknownProvider(String),

    #[error("Provider '{0}' is listed more than once")]
    DuplicateProvider(String),

    #[error("No providers configured")]
    NoProviders,
}

/// Complete gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,

    /// Providers in the order listed; empty means placeholder mode
    pub providers: Vec<ProviderConfig>,
    pub default_provider: Option<String>,
    pub legacy_provider: Option<String>,
    pub selection: SelectionPolicy,

    /// Applied to `tasks/send` prompts; empty by default
    pub prompt_preprocessor: PreprocessChain,

    /// Applied to the `/api/ai` JSON payload
    pub legacy_preprocessor: PreprocessChain,

    /// Fixed User-Agent; the rotating pool is used when unset
    pub user_agent: Option<String>,

    pub descriptor: AgentDescriptor,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            providers: Vec::new(),
            default_provider: None,
            legacy_provider: None,
            selection: SelectionPolicy::default(),
            prompt_preprocessor: PreprocessChain::new(),
            legacy_preprocessor: PreprocessChain::new().stage(CompactJson),
            user_agent: None,
            descriptor: AgentDescriptor::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };
        let defaults = Self::default();

        let host = env.string("GATEWAY_HOST").unwrap_or(defaults.host);
        let port = match env.parsed::<u16>("GATEWAY_PORT")? {
            Some(port) => port,
            None => env.parsed::<u16>("PORT")?.unwrap_or(DEFAULT_PORT),
        };

        let timeout = env
            .parsed::<u64>("GATEWAY_PROVIDER_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT);

        let providers = env
            .list("GATEWAY_PROVIDERS")
            .iter()
            .map(|id| load_provider(&env, id, timeout))
            .collect::<Result<Vec<_>, _>>()?;

        let selection = env
            .parsed::<SelectionPolicy>("GATEWAY_PROVIDER_SELECTION")?
            .unwrap_or_default();
        let prompt_preprocessor = env
            .parsed::<PreprocessChain>("GATEWAY_PREPROCESSOR")?
            .unwrap_or(defaults.prompt_preprocessor);
        let legacy_preprocessor = env
            .parsed::<PreprocessChain>("GATEWAY_LEGACY_PREPROCESSOR")?
            .unwrap_or(defaults.legacy_preprocessor);

        let mut descriptor = AgentDescriptor::new(
            env.string("GATEWAY_AGENT_NAME")
                .unwrap_or_else(|| AgentDescriptor::DEFAULT_NAME.to_string()),
            env.string("GATEWAY_AGENT_DESCRIPTION")
                .unwrap_or_else(|| AgentDescriptor::DEFAULT_DESCRIPTION.to_string()),
            env.string("GATEWAY_AGENT_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
        );
        if let Some(version) = env.string("GATEWAY_AGENT_VERSION") {
            descriptor = descriptor.with_version(version);
        }

        Ok(Self {
            host,
            port,
            providers,
            default_provider: env.identifier("GATEWAY_DEFAULT_PROVIDER"),
            legacy_provider: env.identifier("GATEWAY_LEGACY_PROVIDER"),
            selection,
            prompt_preprocessor,
            legacy_preprocessor,
            user_agent: env.string("GATEWAY_USER_AGENT"),
            descriptor,
        })
    }

    /// No real backend configured
    pub fn is_placeholder(&self) -> bool {
        self.providers.is_empty()
    }

    /// Host and port to bind; host names are resolved by the listener
    pub fn bind_addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    pub fn registry(&self) -> Result<ProviderRegistry, ConfigError> {
        if self.is_placeholder() {
            return Ok(ProviderRegistry::placeholder());
        }
        ProviderRegistry::new(
            self.providers.clone(),
            self.default_provider.as_deref(),
            self.legacy_provider.as_deref(),
        )
    }

    pub fn user_agent_layer(&self) -> UserAgentLayer {
        match &self.user_agent {
            Some(user_agent) => UserAgentLayer::fixed(user_agent.clone()),
            None => UserAgentLayer::rotating(),
        }
    }

    /// Wire the provider, registry, selector and preprocessor together
    pub fn dispatcher(&self) -> Result<TaskDispatcher, ConfigError> {
        let provider: Arc<dyn Provider> = if self.is_placeholder() {
            Arc::new(PlaceholderProvider)
        } else {
            Arc::new(HttpProvider::http(self.user_agent_layer()))
        };

        Ok(TaskDispatcher::new(provider, self.registry()?)
            .with_selector(self.selection.selector())
            .with_prompt_preprocessor(self.prompt_preprocessor.clone())
            .with_legacy_preprocessor(self.legacy_preprocessor.clone()))
    }
}

fn load_provider<F>(env: &EnvSource<F>, id: &str, timeout: Duration) -> Result<ProviderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let prefix = format!(
        "GATEWAY_PROVIDER_{}_",
        id.to_ascii_uppercase().replace('-', "_")
    );
    let key = |suffix: &str| format!("{prefix}{suffix}");

    let url_key = key("URL");
    let mut config = match (env.string(&url_key), ProviderConfig::preset(id)) {
        (Some(url), Some(preset)) => ProviderConfig {
            endpoint_url: url,
            ..preset
        },
        (Some(url), None) => ProviderConfig::new(id, url),
        (None, Some(preset)) => preset,
        (None, None) => return Err(ConfigError::MissingEndpoint(id.to_string())),
    };

    if let Err(e) = Url::parse(&config.endpoint_url) {
        return Err(ConfigError::InvalidEnvVar {
            key: url_key,
            message: format!("invalid URL '{}': {e}", config.endpoint_url),
        });
    }

    if let Some(token) = env.string(&key("TOKEN")) {
        config = config.with_token(token);
    }
    if let Some(model) = env.string(&key("MODEL")) {
        config = config.with_model(model);
    }
    if let Some(format) = env.parsed::<PayloadFormat>(&key("FORMAT"))? {
        config = config.with_format(format);
    }
    if let Some(header) = env.string(&key("AUTH_HEADER")) {
        config = config.with_auth_header(header);
    }
    if let Some(system_prompt) = env.string(&key("SYSTEM_PROMPT")) {
        config = config.with_system_prompt(system_prompt);
    }

    Ok(config.with_timeout(timeout))
}

struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty, trimmed value
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.string(key) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    key: key.to_string(),
                    message: format!("invalid value '{value}': {e}"),
                }),
            None => Ok(None),
        }
    }

    /// Provider identifier, lowercased
    fn identifier(&self, key: &str) -> Option<String> {
        self.string(key).map(|value| value.to_ascii_lowercase())
    }

    /// Comma-separated, lowercased identifiers
    fn list(&self, key: &str) -> Vec<String> {
        self.string(key)
            .map(|value| {
                value
                    .split(',')
                    .map(|item| item.trim().to_ascii_lowercase())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
