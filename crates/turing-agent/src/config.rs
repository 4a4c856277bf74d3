//! Provider and model configuration.

use serde::{Deserialize, Serialize};

/// Environment variable for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable for the Anthropic API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable for the OpenRouter API key.
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// LLM provider behind a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// OpenAI Chat Completions.
    OpenAI,
    /// Anthropic Messages API.
    Anthropic,
    /// OpenRouter (any `vendor/model` id).
    OpenRouter,
}

impl Provider {
    /// Routes a model id to its provider by prefix.
    ///
    /// - `vendor/model` ids go through OpenRouter
    /// - `claude-*` goes to Anthropic
    /// - `gpt-*`, `chatgpt-*`, `o1*`, `o3*`, `o4*` go to OpenAI
    pub fn for_model(model: &str) -> Option<Self> {
        if model.contains('/') {
            return Some(Self::OpenRouter);
        }
        if model.starts_with("claude-") {
            return Some(Self::Anthropic);
        }
        const OPENAI_PREFIXES: [&str; 5] = ["gpt-", "chatgpt-", "o1", "o3", "o4"];
        if OPENAI_PREFIXES.iter().any(|p| model.starts_with(p)) {
            return Some(Self::OpenAI);
        }
        None
    }

    /// Environment variable holding this provider's key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAI => OPENAI_API_KEY_ENV,
            Self::Anthropic => ANTHROPIC_API_KEY_ENV,
            Self::OpenRouter => OPENROUTER_API_KEY_ENV,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// API keys for each provider. Missing keys disable that provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub openrouter: Option<String>,
}

impl ProviderKeys {
    /// Reads keys from the standard environment variables.
    pub fn from_env() -> Self {
        fn read(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        Self {
            openai: read(OPENAI_API_KEY_ENV),
            anthropic: read(ANTHROPIC_API_KEY_ENV),
            openrouter: read(OPENROUTER_API_KEY_ENV),
        }
    }

    /// Returns the key configured for `provider`.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAI => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
            Provider::OpenRouter => self.openrouter.as_deref(),
        }
    }
}

/// A model offered to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub provider: Provider,
}

/// Models offered by default.
pub const MODEL_CATALOG: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-4o",
        label: "GPT-4o",
        provider: Provider::OpenAI,
    },
    ModelInfo {
        id: "gpt-4o-mini",
        label: "GPT-4o mini",
        provider: Provider::OpenAI,
    },
    ModelInfo {
        id: "claude-sonnet-4-20250514",
        label: "Claude Sonnet 4",
        provider: Provider::Anthropic,
    },
    ModelInfo {
        id: "claude-3-5-haiku-20241022",
        label: "Claude 3.5 Haiku",
        provider: Provider::Anthropic,
    },
    ModelInfo {
        id: "meta-llama/llama-3.1-70b-instruct",
        label: "Llama 3.1 70B (OpenRouter)",
        provider: Provider::OpenRouter,
    },
    ModelInfo {
        id: "google/gemini-2.0-flash-001",
        label: "Gemini 2.0 Flash (OpenRouter)",
        provider: Provider::OpenRouter,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_routing() {
        assert_eq!(Provider::for_model("gpt-4o"), Some(Provider::OpenAI));
        assert_eq!(Provider::for_model("o3-mini"), Some(Provider::OpenAI));
        assert_eq!(
            Provider::for_model("claude-sonnet-4-20250514"),
            Some(Provider::Anthropic)
        );
        assert_eq!(
            Provider::for_model("anthropic/claude-sonnet-4"),
            Some(Provider::OpenRouter)
        );
        assert_eq!(Provider::for_model("mistral-large"), None);
    }

    #[test]
    fn test_catalog_routes_to_declared_provider() {
        for model in MODEL_CATALOG {
            assert_eq!(Provider::for_model(model.id), Some(model.provider), "{}", model.id);
        }
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(Provider::OpenAI.to_string(), "openai");
        assert_eq!(Provider::Anthropic.to_string(), "anthropic");
        assert_eq!(Provider::OpenRouter.to_string(), "openrouter");
    }

    #[test]
    fn test_keys_lookup() {
        let keys = ProviderKeys {
            anthropic: Some("sk-ant".into()),
            ..Default::default()
        };
        assert_eq!(keys.get(Provider::Anthropic), Some("sk-ant"));
        assert_eq!(keys.get(Provider::OpenAI), None);
    }
}
