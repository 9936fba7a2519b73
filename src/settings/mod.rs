//! The settings-store collaborator interface.
//!
//! The orchestration core persists very little: per-provider credentials and
//! the current provider/model selection. It reaches all of it through
//! [`SettingsStore`], so any key-value backing works. The store is allowed
//! to be unavailable; callers treat read failures as "no persisted value"
//! and write failures as best-effort losses.

mod file;
mod memory;

pub use file::FileSettings;
pub use memory::MemorySettings;

use anyhow::Result;

/// A string-keyed persistence collaborator.
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch a persisted value. `Ok(None)` when the key is unset.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Persist a value under a key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
