//! Multi-provider LLM chat orchestration with retry and automatic fallback.
//!
//! tsugi presents one chat contract over five interchangeable providers
//! (Claude, OpenAI, Gemini, Kimi, Groq). A request goes to the selected
//! provider; failures are classified into a small fixed taxonomy, rate
//! limits earn a single retry, and anything else retryable sweeps the
//! remaining providers in cost order until one answers or all are exhausted.
//!
//! The [`Orchestrator`] is the entry point. It owns a [`ProviderRegistry`]
//! of credentialed backends and talks to two narrow collaborators: a
//! [`SettingsStore`] for persisted credentials and selections, and an
//! [`InteractionLogger`] for a fire-and-forget audit trail.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tsugi::{
//!     ChatRequest, CredentialOverrides, FileSettings, Message, NoopLogger, Orchestrator,
//! };
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let settings = Arc::new(FileSettings::open()?);
//! let orchestrator =
//!     Orchestrator::new(settings, Arc::new(NoopLogger), &CredentialOverrides::new()).await;
//!
//! let reply = orchestrator
//!     .chat(ChatRequest::new(vec![Message::user("hello")]))
//!     .await?;
//! println!("{} said: {}", reply.provider, reply.text);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod constants;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod message;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod request;
pub mod settings;

pub use classify::{classify, ClassifiedError, FailureKind};
pub use error::{ChatError, ProviderError};
pub use fallback::{cost_effective_provider, fallback_candidates};
pub use logging::{InteractionEntry, InteractionLogger, MemoryLogger, NoopLogger};
pub use message::{Message, Role};
pub use models::selectable_models;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use provider::{
    default_model_for, ChatBackend, Completion, CompletionCall, CredentialOverrides,
    OpenAiCompatBackend, ProviderKind, ProviderRegistry, SdkBackend,
};
pub use request::{ChatReply, ChatRequest, TokenUsage};
pub use settings::{FileSettings, MemorySettings, SettingsStore};
