//! Vendor-SDK-backed chat backends.
//!
//! Claude, OpenAI, and Gemini go through rig-core provider clients wrapped
//! behind enum dispatch. Agents are constructed on each call since they are
//! cheap to create and each call may carry a different system instruction.

use rig::client::CompletionClient;
use rig::completion::Chat;
use rig::message::Message as RigMessage;
use rig::providers::{anthropic, gemini, openai};

use crate::error::ProviderError;
use crate::message::{Message, Role};

use super::backend::{clamp_temperature, ChatBackend, Completion, CompletionCall};
use super::kind::{default_model_for, ProviderKind};

/// Internal enum wrapping provider-specific rig clients.
enum SdkClient {
    Claude(anthropic::Client),
    OpenAi(openai::Client),
    Gemini(gemini::Client),
}

/// A chat backend for one of the SDK-served providers.
pub struct SdkBackend {
    kind: ProviderKind,
    client: SdkClient,
    default_model: String,
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`SdkClient`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            SdkClient::Claude($client) => $body,
            SdkClient::OpenAi($client) => $body,
            SdkClient::Gemini($client) => $body,
        }
    };
}

impl SdkBackend {
    /// Builds a Claude backend from an API key.
    pub fn claude(api_key: &str) -> Result<Self, ProviderError> {
        let client = anthropic::Client::new(api_key).map_err(|e| ProviderError::Backend {
            provider: ProviderKind::Claude,
            message: e.to_string(),
        })?;
        Ok(Self {
            kind: ProviderKind::Claude,
            client: SdkClient::Claude(client),
            default_model: default_model_for(ProviderKind::Claude),
        })
    }

    /// Builds an OpenAI backend from an API key.
    pub fn openai(api_key: &str) -> Result<Self, ProviderError> {
        let client = openai::Client::new(api_key).map_err(|e| ProviderError::Backend {
            provider: ProviderKind::OpenAi,
            message: e.to_string(),
        })?;
        Ok(Self {
            kind: ProviderKind::OpenAi,
            client: SdkClient::OpenAi(client),
            default_model: default_model_for(ProviderKind::OpenAi),
        })
    }

    /// Builds a Gemini backend from an API key.
    pub fn gemini(api_key: &str) -> Result<Self, ProviderError> {
        let client = gemini::Client::new(api_key).map_err(|e| ProviderError::Backend {
            provider: ProviderKind::Gemini,
            message: e.to_string(),
        })?;
        Ok(Self {
            kind: ProviderKind::Gemini,
            client: SdkClient::Gemini(client),
            default_model: default_model_for(ProviderKind::Gemini),
        })
    }
}

#[async_trait::async_trait]
impl ChatBackend for SdkBackend {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, call: &CompletionCall) -> Result<Completion, ProviderError> {
        let temperature = clamp_temperature(self.kind, call.temperature);
        let (prompt, history) = split_current_turn(&call.messages);

        let result = dispatch!(self, |client| {
            let builder = client
                .agent(&call.model)
                .max_tokens(u64::from(call.max_tokens))
                .temperature(temperature);
            let agent = if let Some(system) = &call.system {
                builder.preamble(system.as_str()).build()
            } else {
                builder.build()
            };
            agent.chat(prompt, history).await
        });

        let text = result.map_err(|e| ProviderError::Backend {
            provider: self.kind,
            message: e.to_string(),
        })?;

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion {
                provider: self.kind,
            });
        }
        Ok(Completion { text, usage: None })
    }
}

/// Splits the uniform message list into the current turn and prior history,
/// the shape rig's `Chat` trait expects.
fn split_current_turn(messages: &[Message]) -> (String, Vec<RigMessage>) {
    let prompt = messages
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default();
    let history = messages
        .iter()
        .take(messages.len().saturating_sub(1))
        .map(|m| match m.role {
            Role::User => RigMessage::user(m.content.as_str()),
            Role::Assistant => RigMessage::assistant(m.content.as_str()),
        })
        .collect();
    (prompt, history)
}
