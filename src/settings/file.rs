//! TOML-file settings store.
//!
//! Persists settings as a flat key-value table at
//! `~/.config/tsugi/settings.toml` (`XDG_CONFIG_HOME/tsugi` on Linux). A
//! missing or unreadable file serves defaults instead of failing, which is
//! the degraded mode the orchestration core expects from its settings
//! collaborator.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;

use super::SettingsStore;
use crate::constants::{APP_NAME, SETTINGS_FILENAME};

/// A [`SettingsStore`] backed by one TOML file.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// Opens the store at the platform config path
    /// (`~/.config/tsugi/settings.toml` on Linux).
    ///
    /// # Errors
    ///
    /// Returns an error only if the platform's config directory cannot be
    /// determined; a missing settings file is fine.
    pub fn open() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join(APP_NAME);
        Ok(Self {
            path: dir.join(SETTINGS_FILENAME),
        })
    }

    /// Opens the store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the whole table, serving an empty one when the file is missing
    /// or unreadable.
    fn load(&self) -> HashMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(err) => {
                warn!("settings file {:?} unreadable: {err}", self.path);
                return HashMap::new();
            }
        };
        match toml::from_str(&contents) {
            Ok(values) => values,
            Err(err) => {
                warn!("settings file {:?} unparsable: {err}", self.path);
                HashMap::new()
            }
        }
    }

    fn store(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }
        let contents = toml::to_string_pretty(values)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write settings to {:?}", self.path))
    }
}

#[async_trait::async_trait]
impl SettingsStore for FileSettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load();
        values.insert(key.to_string(), value.to_string());
        self.store(&values)
    }
}
