//! LLM provider abstraction for tsugi.
//!
//! One [`ChatBackend`] implementation exists per provider: Claude, OpenAI,
//! and Gemini through rig-core clients, Kimi and Groq through the
//! OpenAI-compatible HTTP transport. The [`ProviderRegistry`] holds the
//! backends that currently have credentials.

mod backend;
mod http;
mod kind;
mod registry;
mod sdk;

pub use backend::{ChatBackend, Completion, CompletionCall};
pub use http::OpenAiCompatBackend;
pub use kind::{default_model_for, ProviderKind};
pub use registry::{CredentialOverrides, ProviderRegistry};
pub use sdk::SdkBackend;
