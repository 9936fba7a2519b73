//! Centralized constants for tsugi.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

use crate::provider::ProviderKind;

/// Application name used in settings paths and CLI output.
pub const APP_NAME: &str = "tsugi";

/// Settings filename under the XDG config directory.
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Provider used when no selection has been made or persisted.
pub const DEFAULT_PROVIDER: ProviderKind = ProviderKind::Gemini;

// --- Per-provider default models ---

/// Default model identifier for Claude.
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-6";

/// Default model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Default model identifier for Gemini.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default model identifier for Kimi (Moonshot).
pub const DEFAULT_KIMI_MODEL: &str = "moonshot-v1-8k";

/// Default model identifier for Groq.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

// --- OpenAI-compatible endpoints ---

/// Base URL for the Moonshot (Kimi) chat completions API.
pub const KIMI_BASE_URL: &str = "https://api.moonshot.cn/v1";

/// Base URL for the Groq chat completions API.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

// --- Request defaults ---

/// Default maximum output tokens for a chat request.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature for a chat request.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Highest temperature Claude accepts; higher requests are clamped down.
pub const CLAUDE_TEMPERATURE_CEILING: f64 = 1.0;

/// Highest temperature the remaining providers accept.
pub const TEMPERATURE_CEILING: f64 = 2.0;

// --- Retry and fallback policy ---

/// Backoff before the single same-provider retry after a rate limit.
pub const RATE_LIMIT_BACKOFF_MS: u64 = 2_000;

/// Fallback priority, cheapest and most generous free tier first.
pub const FALLBACK_COST_ORDER: [ProviderKind; 5] = [
    ProviderKind::Groq,
    ProviderKind::Gemini,
    ProviderKind::Kimi,
    ProviderKind::OpenAi,
    ProviderKind::Claude,
];

/// Longest excerpt of an unrecognized provider error included in the
/// user-facing message.
pub const UNKNOWN_ERROR_EXCERPT_LEN: usize = 120;

// --- Settings keys ---

/// Settings key holding the active provider name.
pub const SETTING_ACTIVE_PROVIDER: &str = "llm.active_provider";

/// Settings key holding the active model identifier.
pub const SETTING_ACTIVE_MODEL: &str = "llm.active_model";
