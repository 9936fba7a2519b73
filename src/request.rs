//! Uniform chat request and result types.
//!
//! [`ChatRequest`] is the single input shape accepted by the orchestrator,
//! regardless of which backend ends up serving it. [`ChatReply`] reports
//! which provider actually produced the text, which may differ from the
//! requested one when a fallback occurred.

use crate::constants::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::message::Message;
use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};

/// A chat completion request. Immutable once issued.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Ordered conversation turns; the last one is the current turn.
    pub messages: Vec<Message>,
    /// Optional system instruction, placed per-provider by the backend.
    pub system: Option<String>,
    /// Target provider; defaults to the orchestrator's current selection.
    pub provider: Option<ProviderKind>,
    /// Target model; defaults to the resolved provider's default model.
    pub model: Option<String>,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Sampling temperature; backends clamp to their provider's valid range.
    pub temperature: f64,
    /// Correlation identifier for interaction logging. A fresh UUID is minted
    /// when absent.
    pub correlation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system: None,
            provider: None,
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            correlation_id: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// Token accounting reported by providers that include it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// The result of a successful chat request.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Generated text.
    pub text: String,
    /// The provider whose backend actually returned this text.
    pub provider: ProviderKind,
    /// The model that served the request.
    pub model: String,
    /// Token counters, when the provider reported them.
    pub usage: Option<TokenUsage>,
    /// The originally requested provider, set only when a fallback served
    /// the request.
    pub fallback_from: Option<ProviderKind>,
}
