//! Provider registry: which backends are usable and with what credential.
//!
//! Credentials resolve through a fixed precedence chain (explicit override,
//! then persisted setting, then environment variable). A provider with no
//! credential is simply absent from the registry; that is an expected state,
//! not an error.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};

use crate::error::ProviderError;
use crate::settings::SettingsStore;

use super::backend::ChatBackend;
use super::http::OpenAiCompatBackend;
use super::kind::ProviderKind;
use super::sdk::SdkBackend;

/// Explicit per-provider credential overrides, taking precedence over both
/// persisted settings and the environment.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    secrets: HashMap<ProviderKind, String>,
}

impl CredentialOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, provider: ProviderKind, secret: impl Into<String>) -> Self {
        self.secrets.insert(provider, secret.into());
        self
    }

    pub fn get(&self, provider: ProviderKind) -> Option<&str> {
        self.secrets.get(&provider).map(String::as_str)
    }
}

/// Holds the usable provider backends, keyed by [`ProviderKind`].
pub struct ProviderRegistry {
    backends: RwLock<HashMap<ProviderKind, Arc<dyn ChatBackend>>>,
    http: reqwest::Client,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            backends: RwLock::new(HashMap::new()),
            http: reqwest::Client::new(),
        }
    }

    /// Resolves credentials for every supported provider and builds a
    /// backend for each one that has a credential.
    ///
    /// Providers without credentials are skipped silently; a backend whose
    /// client fails to construct is logged and left unavailable.
    pub async fn configure(&self, settings: &dyn SettingsStore, overrides: &CredentialOverrides) {
        for kind in ProviderKind::ALL {
            let Some(secret) = resolve_credential(kind, settings, overrides).await else {
                debug!("{kind} has no credential; leaving unavailable");
                continue;
            };
            match build_backend(kind, &secret, &self.http) {
                Ok(backend) => {
                    self.write_backends().insert(kind, backend);
                }
                Err(err) => warn!("could not initialize {kind} backend: {err}"),
            }
        }
    }

    /// Rebuilds a provider's backend with a new secret and best-effort
    /// persists it. Effective immediately for subsequent requests.
    pub async fn set_credential(
        &self,
        settings: &dyn SettingsStore,
        kind: ProviderKind,
        secret: &str,
    ) -> Result<(), ProviderError> {
        let backend = build_backend(kind, secret, &self.http)?;
        self.write_backends().insert(kind, backend);
        if let Err(err) = settings.set(&kind.api_key_setting(), secret).await {
            warn!("could not persist {kind} credential: {err}");
        }
        Ok(())
    }

    /// Registers a backend directly. Useful for custom backends and tests.
    pub fn register(&self, backend: Arc<dyn ChatBackend>) {
        self.write_backends().insert(backend.kind(), backend);
    }

    /// True iff a usable backend is currently held for this provider.
    pub fn is_available(&self, kind: ProviderKind) -> bool {
        self.read_backends().contains_key(&kind)
    }

    /// The backend for a provider, when one is configured.
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ChatBackend>> {
        self.read_backends().get(&kind).cloned()
    }

    /// Every currently available provider, in declaration order.
    pub fn available(&self) -> Vec<ProviderKind> {
        let backends = self.read_backends();
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| backends.contains_key(kind))
            .collect()
    }

    fn read_backends(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<ProviderKind, Arc<dyn ChatBackend>>> {
        self.backends.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_backends(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<ProviderKind, Arc<dyn ChatBackend>>> {
        self.backends
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a provider's credential: explicit override, then persisted
/// setting, then environment variable.
///
/// A settings-store read failure degrades to "no persisted value" so startup
/// works without the store.
async fn resolve_credential(
    kind: ProviderKind,
    settings: &dyn SettingsStore,
    overrides: &CredentialOverrides,
) -> Option<String> {
    if let Some(secret) = overrides.get(kind) {
        return Some(secret.to_string());
    }
    match settings.get(&kind.api_key_setting()).await {
        Ok(Some(value)) if !value.is_empty() => return Some(value),
        Ok(_) => {}
        Err(err) => debug!("settings store unavailable for {kind}: {err}"),
    }
    std::env::var(kind.env_key()).ok().filter(|v| !v.is_empty())
}

fn build_backend(
    kind: ProviderKind,
    secret: &str,
    http: &reqwest::Client,
) -> Result<Arc<dyn ChatBackend>, ProviderError> {
    Ok(match kind {
        ProviderKind::Claude => Arc::new(SdkBackend::claude(secret)?),
        ProviderKind::OpenAi => Arc::new(SdkBackend::openai(secret)?),
        ProviderKind::Gemini => Arc::new(SdkBackend::gemini(secret)?),
        ProviderKind::Kimi => Arc::new(OpenAiCompatBackend::kimi(http.clone(), secret.to_string())),
        ProviderKind::Groq => Arc::new(OpenAiCompatBackend::groq(http.clone(), secret.to_string())),
    })
}
