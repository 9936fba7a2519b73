//! In-memory settings store, used in tests and as a stand-in when no
//! persistence is wanted.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;

use super::SettingsStore;

/// A [`SettingsStore`] backed by a plain map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value directly, bypassing the trait. Handy for seeding
    /// state in tests.
    pub async fn seed(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let settings = MemorySettings::new();
        settings.set("llm.active_provider", "groq").await.unwrap();
        assert_eq!(
            settings.get("llm.active_provider").await.unwrap().as_deref(),
            Some("groq")
        );
        assert!(settings.get("missing").await.unwrap().is_none());
    }
}
