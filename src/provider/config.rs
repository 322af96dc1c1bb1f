//! Provider configuration and built-in presets

use std::{fmt, str::FromStr, time::Duration};

use crate::{
    codec::{ChatCodec, MessageCodec, PayloadCodec},
    layer::auth::AuthCredentials,
};

/// Default upper bound on a provider call
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire format a provider speaks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    /// OpenAI-compatible chat completions
    #[default]
    Chat,

    /// `{"message": prompt}` in, completion field out
    Message,
}

impl PayloadFormat {
    /// Codec for this format
    pub fn codec(&self) -> &'static dyn PayloadCodec {
        match self {
            PayloadFormat::Chat => &ChatCodec,
            PayloadFormat::Message => &MessageCodec,
        }
    }
}

impl FromStr for PayloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" | "openai" => Ok(PayloadFormat::Chat),
            "message" | "json" => Ok(PayloadFormat::Message),
            other => Err(format!("unknown payload format '{other}', expected chat or message")),
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Chat => f.write_str("chat"),
            PayloadFormat::Message => f.write_str("message"),
        }
    }
}

/// Everything needed to call one backend
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Registry key
    pub identifier: String,

    /// Absolute URL requests are posted to
    pub endpoint_url: String,

    /// Secret sent with every call, if any
    pub auth_token: Option<String>,

    /// Header carrying the raw token instead of `Authorization: Bearer`
    pub auth_header: Option<String>,

    pub model: Option<String>,

    pub format: PayloadFormat,

    /// System message prepended by the chat codec
    pub system_prompt: Option<String>,

    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create a config with the chat format and default timeout
    pub fn new(identifier: impl Into<String>, endpoint_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            endpoint_url: endpoint_url.into(),
            auth_token: None,
            auth_header: None,
            model: None,
            format: PayloadFormat::default(),
            system_prompt: None,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Start from a built-in preset, if `identifier` names one
    pub fn preset(identifier: &str) -> Option<Self> {
        let preset = PRESETS.iter().find(|p| p.identifier == identifier)?;

        let mut config = Self::new(preset.identifier, preset.endpoint_url).with_model(preset.model);
        if let Some(system_prompt) = preset.system_prompt {
            config = config.with_system_prompt(system_prompt);
        }
        Some(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = Some(header.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Credentials derived from the token and auth header
    pub fn credentials(&self) -> Option<AuthCredentials> {
        let token = self.auth_token.as_ref()?;
        Some(match &self.auth_header {
            Some(header) => AuthCredentials::api_key(token.clone(), header.clone()),
            None => AuthCredentials::bearer(token.clone()),
        })
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("identifier", &self.identifier)
            .field("endpoint_url", &self.endpoint_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("auth_header", &self.auth_header)
            .field("model", &self.model)
            .field("format", &self.format)
            .field("system_prompt", &self.system_prompt)
            .field("timeout", &self.timeout)
            .finish()
    }
}

struct Preset {
    identifier: &'static str,
    endpoint_url: &'static str,
    model: &'static str,
    system_prompt: Option<&'static str>,
}

const PRESETS: &[Preset] = &[
    Preset {
        identifier: "openai",
        endpoint_url: "https://api.openai.com/v1/chat/completions",
        model: "gpt-4o-mini",
        system_prompt: None,
    },
    Preset {
        identifier: "deepseek",
        endpoint_url: "https://api.deepseek.com/chat/completions",
        model: "deepseek-chat",
        system_prompt: Some("You are a helpful assistant"),
    },
    Preset {
        identifier: "xai",
        endpoint_url: "https://api.x.ai/v1/chat/completions",
        model: "grok-2-latest",
        system_prompt: Some(
            "You are Grok, a chatbot inspired by the Hitchhikers Guide to the Galaxy.",
        ),
    },
    Preset {
        identifier: "qwen",
        endpoint_url: "https://dashscope-intl.aliyuncs.com/compatible-mode/v1/chat/completions",
        model: "qwen-plus",
        system_prompt: None,
    },
    Preset {
        identifier: "ollama",
        endpoint_url: "http://localhost:11434/v1/chat/completions",
        model: "llama3",
        system_prompt: None,
    },
];
