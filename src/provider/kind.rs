//! Provider kind enumeration and default model mapping.
//!
//! Defines [`ProviderKind`] which identifies which LLM backend to use,
//! and [`default_model_for`] which returns the default model for each
//! provider.

use crate::constants::{
    DEFAULT_CLAUDE_MODEL, DEFAULT_GEMINI_MODEL, DEFAULT_GROQ_MODEL, DEFAULT_KIMI_MODEL,
    DEFAULT_OPENAI_MODEL,
};
use crate::error::ChatError;
use serde::{Deserialize, Serialize};

/// Identifies which LLM provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Claude models.
    Claude,
    /// OpenAI GPT models.
    OpenAi,
    /// Google Gemini models.
    Gemini,
    /// Moonshot Kimi models (OpenAI-compatible endpoint).
    Kimi,
    /// Groq-hosted open models (OpenAI-compatible endpoint).
    Groq,
}

impl ProviderKind {
    /// Every supported provider.
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Claude,
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
        ProviderKind::Kimi,
        ProviderKind::Groq,
    ];

    /// Lowercase identifier used in settings keys and request parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Kimi => "kimi",
            ProviderKind::Groq => "groq",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn env_key(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Kimi => "MOONSHOT_API_KEY",
            ProviderKind::Groq => "GROQ_API_KEY",
        }
    }

    /// Environment variable that overrides this provider's default model.
    pub fn model_env_key(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "CLAUDE_MODEL",
            ProviderKind::OpenAi => "OPENAI_MODEL",
            ProviderKind::Gemini => "GEMINI_MODEL",
            ProviderKind::Kimi => "KIMI_MODEL",
            ProviderKind::Groq => "GROQ_MODEL",
        }
    }

    /// Settings-store key under which this provider's API key is persisted.
    pub fn api_key_setting(&self) -> String {
        format!("llm.{}.api_key", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(ProviderKind::Claude),
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "kimi" => Ok(ProviderKind::Kimi),
            "groq" => Ok(ProviderKind::Groq),
            other => Err(ChatError::UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    /// Human-readable provider name, used in user-facing messages.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderKind::Claude => "Claude",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Kimi => "Kimi",
            ProviderKind::Groq => "Groq",
        };
        f.write_str(name)
    }
}

/// Returns the default model identifier for a given provider.
///
/// The hardcoded default can be overridden with the provider's model
/// environment variable (e.g. `GEMINI_MODEL`). Stable within a process
/// lifetime unless the environment is deliberately changed.
pub fn default_model_for(provider: ProviderKind) -> String {
    if let Ok(value) = std::env::var(provider.model_env_key()) {
        if !value.is_empty() {
            return value;
        }
    }
    match provider {
        ProviderKind::Claude => DEFAULT_CLAUDE_MODEL,
        ProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
        ProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
        ProviderKind::Kimi => DEFAULT_KIMI_MODEL,
        ProviderKind::Groq => DEFAULT_GROQ_MODEL,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_names() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>().ok(), Some(kind));
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().ok(), Some(ProviderKind::OpenAi));
        assert_eq!("GROQ".parse::<ProviderKind>().ok(), Some(ProviderKind::Groq));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_identifiers() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let kind: ProviderKind = serde_json::from_str("\"kimi\"").unwrap();
        assert_eq!(kind, ProviderKind::Kimi);
    }
}
