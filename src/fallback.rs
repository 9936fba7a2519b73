//! Fallback provider selection.
//!
//! Candidates come from a fixed priority order reflecting a cost and
//! free-tier trade-off, cheapest first, with the failed provider and every
//! unavailable provider removed. The same order doubles as the default
//! choice for batch callers that want the cheapest usable backend.

use crate::constants::FALLBACK_COST_ORDER;
use crate::provider::{ProviderKind, ProviderRegistry};

/// Ordered alternates to try after `failed` has failed.
pub fn fallback_candidates(failed: ProviderKind, registry: &ProviderRegistry) -> Vec<ProviderKind> {
    order_candidates(failed, |kind| registry.is_available(kind))
}

/// The cheapest currently usable provider, for non-interactive callers that
/// prefer cost over the user's manual selection.
pub fn cost_effective_provider(registry: &ProviderRegistry) -> Option<ProviderKind> {
    FALLBACK_COST_ORDER
        .into_iter()
        .find(|kind| registry.is_available(*kind))
}

fn order_candidates(
    failed: ProviderKind,
    is_available: impl Fn(ProviderKind) -> bool,
) -> Vec<ProviderKind> {
    FALLBACK_COST_ORDER
        .into_iter()
        .filter(|kind| *kind != failed && is_available(*kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProviderKind::*;

    #[test]
    fn failed_provider_is_excluded_and_order_is_preserved() {
        let available = [Claude, OpenAi, Gemini, Groq];
        let candidates = order_candidates(Claude, |kind| available.contains(&kind));
        assert_eq!(candidates, vec![Groq, Gemini, OpenAi]);
    }

    #[test]
    fn unavailable_providers_are_excluded() {
        let candidates = order_candidates(Gemini, |kind| kind == Kimi);
        assert_eq!(candidates, vec![Kimi]);
    }

    #[test]
    fn no_available_alternates_yields_empty_list() {
        let candidates = order_candidates(Groq, |kind| kind == Groq);
        assert!(candidates.is_empty());
    }

    #[test]
    fn cost_order_prefers_groq_first_and_claude_last() {
        assert_eq!(FALLBACK_COST_ORDER[0], Groq);
        assert_eq!(FALLBACK_COST_ORDER[4], Claude);
    }
}
