//! The uniform backend contract every provider implements.

use crate::constants::{CLAUDE_TEMPERATURE_CEILING, TEMPERATURE_CEILING};
use crate::error::ProviderError;
use crate::message::Message;
use crate::request::TokenUsage;

use super::kind::ProviderKind;

/// One chat completion call, fully resolved: the model is concrete and the
/// defaults have already been applied.
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// A normalized completion result.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    /// Token counters, for providers that report them.
    pub usage: Option<TokenUsage>,
}

/// A single provider's chat capability.
///
/// Implementations perform exactly one completion call per [`complete`]
/// invocation and surface the provider's raw failure unmodified; retry,
/// classification, and fallback all live in the orchestrator.
///
/// [`complete`]: ChatBackend::complete
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Which provider this backend speaks to.
    fn kind(&self) -> ProviderKind;

    /// The model used when a request does not name one.
    fn default_model(&self) -> &str;

    /// Perform one chat completion call.
    async fn complete(&self, call: &CompletionCall) -> Result<Completion, ProviderError>;
}

/// Clamp a requested temperature into the provider's accepted range.
///
/// Claude caps at 1.0; the other providers accept the uniform [0, 2] range.
pub(crate) fn clamp_temperature(kind: ProviderKind, temperature: f64) -> f64 {
    let ceiling = match kind {
        ProviderKind::Claude => CLAUDE_TEMPERATURE_CEILING,
        _ => TEMPERATURE_CEILING,
    };
    temperature.clamp(0.0, ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_temperature_caps_at_one() {
        assert_eq!(clamp_temperature(ProviderKind::Claude, 1.8), 1.0);
        assert_eq!(clamp_temperature(ProviderKind::Claude, 0.7), 0.7);
    }

    #[test]
    fn other_providers_allow_up_to_two() {
        assert_eq!(clamp_temperature(ProviderKind::Groq, 1.8), 1.8);
        assert_eq!(clamp_temperature(ProviderKind::Gemini, 2.5), 2.0);
    }

    #[test]
    fn negative_temperatures_clamp_to_zero() {
        assert_eq!(clamp_temperature(ProviderKind::Kimi, -0.3), 0.0);
    }
}
