//! Error types for tsugi.
//!
//! [`ProviderError`] is what a single backend attempt can raise; it keeps the
//! provider's raw failure intact so the classifier one layer up can inspect
//! it. [`ChatError`] is what the orchestrator surfaces to callers: one
//! human-readable failure, never a per-provider trace.

use crate::classify::FailureKind;
use crate::provider::ProviderKind;

/// Failure raised by a single provider backend attempt.
///
/// Backends never classify or suppress; they surface the raw failure and let
/// the orchestrator decide what to do with it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Non-2xx HTTP response from an OpenAI-compatible endpoint.
    #[error("{provider} API error: {status} - {body}")]
    Api {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    /// The request never produced an HTTP response.
    #[error("{provider} request failed: {message}")]
    Network {
        provider: ProviderKind,
        message: String,
    },

    /// Failure reported by a vendor SDK, or a malformed provider response.
    #[error("{provider} error: {message}")]
    Backend {
        provider: ProviderKind,
        message: String,
    },

    /// A 2xx response that carried no usable text.
    #[error("{provider} returned an empty completion")]
    EmptyCompletion { provider: ProviderKind },
}

impl ProviderError {
    /// The provider whose attempt raised this failure.
    pub fn provider(&self) -> ProviderKind {
        match self {
            ProviderError::Api { provider, .. }
            | ProviderError::Network { provider, .. }
            | ProviderError::Backend { provider, .. }
            | ProviderError::EmptyCompletion { provider } => *provider,
        }
    }

    /// HTTP status code, when the failure came from a raw HTTP response.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure surfaced to the orchestrator's caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatError {
    /// The requested provider has no credential configured.
    #[error("{provider} is not configured; add an API key in settings")]
    NotConfigured { provider: ProviderKind },

    /// A provider name that does not match any supported backend.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The primary attempt and every eligible fallback failed.
    ///
    /// `message` is the primary failure's user-facing sentence, extended with
    /// the fallback count when alternates were tried.
    #[error("{message}")]
    Exhausted {
        kind: FailureKind,
        message: String,
        fallbacks_tried: usize,
    },
}
