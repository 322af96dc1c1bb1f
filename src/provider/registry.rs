//! Provider registry and per-request selection policies

use std::{collections::HashMap, str::FromStr, sync::Arc};

use crate::{
    config::ConfigError,
    protocol::{error::ProviderError, operation::TaskSendParams},
};

use super::ProviderConfig;

/// Identifier of the config used when no real provider is configured
pub const PLACEHOLDER_PROVIDER: &str = "placeholder";

/// Provider configs keyed by identifier
///
/// Resolved once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<ProviderConfig>>,
    order: Vec<String>,
    default_id: String,
    legacy_id: String,
}

impl ProviderRegistry {
    /// Build a registry
    ///
    /// The default falls back to the first config and the legacy provider
    /// to the default. Both must name a registered config.
    pub fn new(
        configs: Vec<ProviderConfig>,
        default_id: Option<&str>,
        legacy_id: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let first = configs.first().ok_or(ConfigError::NoProviders)?;
        let default_id = default_id.unwrap_or(&first.identifier).to_string();
        let legacy_id = legacy_id.unwrap_or(&default_id).to_string();

        let mut providers = HashMap::with_capacity(configs.len());
        let mut order = Vec::with_capacity(configs.len());
        for config in configs {
            if providers.contains_key(&config.identifier) {
                return Err(ConfigError::DuplicateProvider(config.identifier));
            }
            order.push(config.identifier.clone());
            providers.insert(config.identifier.clone(), Arc::new(config));
        }

        for id in [&default_id, &legacy_id] {
            if !providers.contains_key(id) {
                return Err(ConfigError::UnknownProvider(id.clone()));
            }
        }

        Ok(Self {
            providers,
            order,
            default_id,
            legacy_id,
        })
    }

    /// Registry holding only the placeholder entry
    pub fn placeholder() -> Self {
        let config = ProviderConfig::new(PLACEHOLDER_PROVIDER, "placeholder://local");
        let id = config.identifier.clone();
        Self {
            providers: HashMap::from([(id.clone(), Arc::new(config))]),
            order: vec![id.clone()],
            default_id: id.clone(),
            legacy_id: id,
        }
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<ProviderConfig>> {
        self.providers.get(identifier).cloned()
    }

    /// Look up a provider, failing the call when it is unknown
    pub fn resolve(&self, identifier: &str) -> Result<Arc<ProviderConfig>, ProviderError> {
        self.get(identifier)
            .ok_or_else(|| ProviderError::not_configured(identifier))
    }

    pub fn default_config(&self) -> Arc<ProviderConfig> {
        self.providers[&self.default_id].clone()
    }

    /// Provider behind the legacy `/api/ai` path
    pub fn legacy_config(&self) -> Arc<ProviderConfig> {
        self.providers[&self.legacy_id].clone()
    }

    /// Identifiers in registration order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Chooses the provider for a `tasks/send` call
pub trait ProviderSelector: Send + Sync {
    fn select(
        &self,
        params: &TaskSendParams,
        registry: &ProviderRegistry,
    ) -> Result<Arc<ProviderConfig>, ProviderError>;
}

/// Always the registry default
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSelector;

impl ProviderSelector for FixedSelector {
    fn select(
        &self,
        _params: &TaskSendParams,
        registry: &ProviderRegistry,
    ) -> Result<Arc<ProviderConfig>, ProviderError> {
        Ok(registry.default_config())
    }
}

/// Honours `params.provider` (case-insensitive), else the registry default
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamsSelector;

impl ProviderSelector for ParamsSelector {
    fn select(
        &self,
        params: &TaskSendParams,
        registry: &ProviderRegistry,
    ) -> Result<Arc<ProviderConfig>, ProviderError> {
        match params.provider.as_deref() {
            Some(identifier) => registry.resolve(&identifier.to_ascii_lowercase()),
            None => Ok(registry.default_config()),
        }
    }
}

/// Configured selection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    #[default]
    Fixed,
    Params,
}

impl SelectionPolicy {
    pub fn selector(&self) -> Arc<dyn ProviderSelector> {
        match self {
            SelectionPolicy::Fixed => Arc::new(FixedSelector),
            SelectionPolicy::Params => Arc::new(ParamsSelector),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(SelectionPolicy::Fixed),
            "params" => Ok(SelectionPolicy::Params),
            other => Err(format!("unknown selection policy '{other}', expected fixed or params")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::protocol::error::ProviderErrorKind;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(
            vec![
                ProviderConfig::preset("deepseek").unwrap(),
                ProviderConfig::preset("xai").unwrap(),
            ],
            None,
            Some("xai"),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_resolve() {
        let registry = registry();

        assert_eq!(registry.default_config().identifier, "deepseek");
        assert_eq!(registry.legacy_config().identifier, "xai");
        assert_eq!(registry.ids(), ["deepseek", "xai"]);
    }

    #[test]
    fn test_unknown_default_rejected() {
        let err = ProviderRegistry::new(
            vec![ProviderConfig::preset("openai").unwrap()],
            Some("qwen"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(id) if id == "qwen"));

        assert!(matches!(
            ProviderRegistry::new(Vec::new(), None, None),
            Err(ConfigError::NoProviders)
        ));
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = ProviderRegistry::new(
            vec![
                ProviderConfig::preset("openai").unwrap(),
                ProviderConfig::preset("openai").unwrap(),
            ],
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProvider(_)));
    }

    fn params(provider: Option<&str>) -> TaskSendParams {
        TaskSendParams::from_value(&json!({
            "provider": provider,
            "message": {"parts": [{"type": "text", "text": "hi"}]}
        }))
    }

    #[test]
    fn test_fixed_selector_ignores_params() {
        let config = FixedSelector.select(&params(Some("xai")), &registry()).unwrap();
        assert_eq!(config.identifier, "deepseek");
    }

    #[test]
    fn test_params_selector() {
        let registry = registry();

        let selected = ParamsSelector.select(&params(None), &registry).unwrap();
        assert_eq!(selected.identifier, "deepseek");

        let selected = ParamsSelector.select(&params(Some("xai")), &registry).unwrap();
        assert_eq!(selected.identifier, "xai");

        let err = ParamsSelector.select(&params(Some("gemini")), &registry).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::NotConfigured);
    }

    #[test]
    fn test_params_selector_ignores_case() {
        let selected = ParamsSelector.select(&params(Some("XAI")), &registry()).unwrap();
        assert_eq!(selected.identifier, "xai");
    }

    #[test]
    fn test_placeholder_registry() {
        let registry = ProviderRegistry::placeholder();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.default_config().identifier, PLACEHOLDER_PROVIDER);
        assert_eq!(registry.legacy_config().identifier, PLACEHOLDER_PROVIDER);
    }

    #[test]
    fn test_selection_policy_parsing() {
        assert_eq!("params".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Params));
        assert_eq!("FIXED".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Fixed));
        assert!("random".parse::<SelectionPolicy>().is_err());
    }
}
