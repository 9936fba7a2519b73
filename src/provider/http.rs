//! OpenAI-compatible HTTP chat backends.
//!
//! Kimi and Groq expose chat-completions endpoints that speak the OpenAI
//! wire format, so both are served by one backend parameterized over base
//! URL. The request is a single non-streaming POST; a non-2xx response is
//! surfaced with its status and body text so the classifier can pattern
//! match against it.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{GROQ_BASE_URL, KIMI_BASE_URL};
use crate::error::ProviderError;
use crate::request::TokenUsage;

use super::backend::{clamp_temperature, ChatBackend, Completion, CompletionCall};
use super::kind::{default_model_for, ProviderKind};

/// A chat backend for providers speaking the OpenAI chat-completions
/// protocol over plain HTTP.
pub struct OpenAiCompatBackend {
    kind: ProviderKind,
    base_url: String,
    api_key: String,
    default_model: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl OpenAiCompatBackend {
    /// Builds a Kimi (Moonshot) backend.
    pub fn kimi(http: Client, api_key: String) -> Self {
        Self::new(ProviderKind::Kimi, KIMI_BASE_URL, http, api_key)
    }

    /// Builds a Groq backend.
    pub fn groq(http: Client, api_key: String) -> Self {
        Self::new(ProviderKind::Groq, GROQ_BASE_URL, http, api_key)
    }

    fn new(kind: ProviderKind, base_url: &str, http: Client, api_key: String) -> Self {
        Self {
            kind,
            base_url: base_url.to_string(),
            api_key,
            default_model: default_model_for(kind),
            http,
        }
    }

    /// Maps the uniform call into the chat-completions body. The system
    /// instruction becomes a leading `system`-role message.
    fn request_body(&self, call: &CompletionCall) -> WireRequest {
        let mut messages = Vec::with_capacity(call.messages.len() + 1);
        if let Some(system) = &call.system {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        for message in &call.messages {
            messages.push(WireMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            });
        }
        WireRequest {
            model: call.model.clone(),
            messages,
            max_tokens: call.max_tokens,
            temperature: clamp_temperature(self.kind, call.temperature),
            stream: false,
        }
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAiCompatBackend {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, call: &CompletionCall) -> Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(call))
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                provider: self.kind,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: self.kind,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: WireResponse =
            response.json().await.map_err(|e| ProviderError::Backend {
                provider: self.kind,
                message: format!("invalid response body: {e}"),
            })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyCompletion {
                provider: self.kind,
            })?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(Completion { text, usage })
    }
}
