//! Failure classification for provider errors.
//!
//! LLM vendor SDKs share no common exception taxonomy, so classification
//! works from whatever signal is available: the HTTP status when the failure
//! came from a raw HTTP response, otherwise an ordered substring match over
//! the stringified error. The five-kind output taxonomy is the stable
//! contract regardless of input shape.

use crate::constants::UNKNOWN_ERROR_EXCERPT_LEN;
use crate::error::ProviderError;
use crate::provider::ProviderKind;
use serde::Serialize;

/// The five failure kinds the orchestrator's retry and fallback policy is
/// written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad or expired credential. The user has to intervene, so never retried.
    Auth,
    /// Quota exhausted or throttled. Retried once, then a fallback.
    RateLimit,
    /// Connectivity or timeout. Immediate fallback.
    Network,
    /// 5xx or overload. Immediate fallback.
    Server,
    /// Unrecognized. Treated as retryable so the system prefers attempting a
    /// fallback over failing outright.
    Unknown,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, FailureKind::Auth)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Auth => "auth",
            FailureKind::RateLimit => "rate_limit",
            FailureKind::Network => "network",
            FailureKind::Server => "server",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider failure mapped onto the fixed taxonomy, with a message fit to
/// show a user.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedError {
    pub kind: FailureKind,
    pub message: String,
    pub retryable: bool,
}

const AUTH_MARKERS: &[&str] = &[
    "401",
    "authentication_error",
    "invalid x-api-key",
    "Unauthorized",
    "Invalid API",
];

const RATE_LIMIT_MARKERS: &[&str] = &[
    "429",
    "Too Many Requests",
    "quota",
    "rate",
    "Quota exceeded",
];

const NETWORK_MARKERS: &[&str] = &[
    "ECONNREFUSED",
    "ETIMEDOUT",
    "fetch failed",
    "network",
    "connection refused",
    "timed out",
    "error sending request",
    "dns error",
];

const SERVER_MARKERS: &[&str] = &["500", "502", "503", "overloaded"];

/// Map a raw backend failure onto the five-kind taxonomy.
///
/// Pure: the same error always classifies the same way. Structured signals
/// win over substring matching; among the substring groups the first match
/// wins, in the order auth, rate limit, network, server.
pub fn classify(error: &ProviderError) -> ClassifiedError {
    let provider = error.provider();

    // Transport failures are network problems by construction.
    if matches!(error, ProviderError::Network { .. }) {
        return network(provider);
    }

    if let Some(status) = error.http_status() {
        match status {
            401 | 403 => return auth(provider),
            429 => return rate_limited(provider),
            500..=599 => return server(provider),
            _ => {}
        }
    }

    let raw = error.to_string();
    if contains_any(&raw, AUTH_MARKERS) {
        auth(provider)
    } else if contains_any(&raw, RATE_LIMIT_MARKERS) {
        rate_limited(provider)
    } else if contains_any(&raw, NETWORK_MARKERS) {
        network(provider)
    } else if contains_any(&raw, SERVER_MARKERS) {
        server(provider)
    } else {
        unknown(provider, &raw)
    }
}

fn contains_any(raw: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| raw.contains(marker))
}

fn auth(provider: ProviderKind) -> ClassifiedError {
    ClassifiedError {
        kind: FailureKind::Auth,
        retryable: false,
        message: format!(
            "{provider} rejected the configured API key. Update the {} key in settings.",
            provider.as_str()
        ),
    }
}

fn rate_limited(provider: ProviderKind) -> ClassifiedError {
    ClassifiedError {
        kind: FailureKind::RateLimit,
        retryable: true,
        message: format!("{provider} is rate limited. A fallback provider will be attempted."),
    }
}

fn network(provider: ProviderKind) -> ClassifiedError {
    ClassifiedError {
        kind: FailureKind::Network,
        retryable: true,
        message: format!("{provider} could not be reached (network error)."),
    }
}

fn server(provider: ProviderKind) -> ClassifiedError {
    ClassifiedError {
        kind: FailureKind::Server,
        retryable: true,
        message: format!("{provider} returned a server error or is overloaded."),
    }
}

fn unknown(provider: ProviderKind, raw: &str) -> ClassifiedError {
    let excerpt: String = raw.chars().take(UNKNOWN_ERROR_EXCERPT_LEN).collect();
    ClassifiedError {
        kind: FailureKind::Unknown,
        retryable: true,
        message: format!("{provider} request failed: {excerpt}"),
    }
}
