//! The interaction-logger collaborator interface.
//!
//! Every backend attempt, successful or not, is offered to an
//! [`InteractionLogger`] so an external audit trail can be kept. Logging is
//! fire-and-forget: a failed write is noted on the diagnostic log and never
//! affects the chat outcome.

use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use serde::Serialize;

use crate::provider::ProviderKind;

/// One logged backend attempt.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionEntry {
    /// Correlation identifier shared by every attempt of one chat request.
    pub correlation_id: String,
    /// Operation kind; always `"chat"` for the orchestrator.
    pub kind: String,
    /// The provider that was attempted.
    pub provider: ProviderKind,
    /// The model the attempt targeted.
    pub model: String,
    /// Request payload summary.
    pub input: serde_json::Value,
    /// Response text or error summary.
    pub output: serde_json::Value,
    /// Which stage of the protocol issued the attempt
    /// (`"primary"`, `"retry"`, or `"fallback"`).
    pub context: Option<String>,
    pub success: bool,
    /// RFC 3339 timestamp of when the attempt finished.
    pub recorded_at: String,
}

/// External collaborator receiving interaction entries.
#[async_trait::async_trait]
pub trait InteractionLogger: Send + Sync {
    async fn record(&self, entry: InteractionEntry) -> Result<()>;
}

/// Logger that discards everything.
#[derive(Debug, Default)]
pub struct NoopLogger;

#[async_trait::async_trait]
impl InteractionLogger for NoopLogger {
    async fn record(&self, _entry: InteractionEntry) -> Result<()> {
        Ok(())
    }
}

/// Logger that keeps entries in memory, for tests and embedding callers
/// that want to inspect the trail directly.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<InteractionEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<InteractionEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl InteractionLogger for MemoryLogger {
    async fn record(&self, entry: InteractionEntry) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        Ok(())
    }
}
