//! Selectable model identifiers per provider.
//!
//! These are the models a settings UI may offer; the per-provider default
//! lives in `constants.rs` and can be overridden through the environment.

use crate::provider::ProviderKind;

/// Selectable Claude models.
pub const CLAUDE_MODELS: &[&str] = &[
    "claude-sonnet-4-6",
    "claude-opus-4-6",
    "claude-haiku-4-5",
];

/// Selectable OpenAI models.
pub const OPENAI_MODELS: &[&str] = &["gpt-4.1", "gpt-4.1-mini", "gpt-5.2", "o4-mini"];

/// Selectable Gemini models.
pub const GEMINI_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
];

/// Selectable Kimi (Moonshot) models.
pub const KIMI_MODELS: &[&str] = &[
    "moonshot-v1-8k",
    "moonshot-v1-32k",
    "moonshot-v1-128k",
];

/// Selectable Groq-hosted models.
pub const GROQ_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "openai/gpt-oss-120b",
];

/// The selectable model identifiers for a provider.
pub fn selectable_models(provider: ProviderKind) -> &'static [&'static str] {
    match provider {
        ProviderKind::Claude => CLAUDE_MODELS,
        ProviderKind::OpenAi => OPENAI_MODELS,
        ProviderKind::Gemini => GEMINI_MODELS,
        ProviderKind::Kimi => KIMI_MODELS,
        ProviderKind::Groq => GROQ_MODELS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::default_model_for;

    #[test]
    fn every_provider_has_selectable_models() {
        for kind in ProviderKind::ALL {
            assert!(!selectable_models(kind).is_empty());
        }
    }

    #[test]
    fn hardcoded_defaults_are_selectable() {
        // Skip when an environment override is active.
        for kind in ProviderKind::ALL {
            if std::env::var(kind.model_env_key()).is_ok() {
                continue;
            }
            let default = default_model_for(kind);
            assert!(
                selectable_models(kind).contains(&default.as_str()),
                "{kind} default {default} missing from its selectable list"
            );
        }
    }
}
