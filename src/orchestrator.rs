//! The chat orchestrator: single public entry point for chat requests.
//!
//! Implements the retry-then-fallback protocol. One attempt goes to the
//! requested provider; a rate-limited failure earns exactly one retry after
//! a short backoff; retryable failures and auth failures then move on to the
//! fallback candidates in cost order. Fallback attempts are classified and
//! logged individually but never retried.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use serde_json::json;
use tokio::time::sleep;
use uuid::Uuid;

use crate::classify::{classify, FailureKind};
use crate::constants::{
    DEFAULT_PROVIDER, RATE_LIMIT_BACKOFF_MS, SETTING_ACTIVE_MODEL, SETTING_ACTIVE_PROVIDER,
};
use crate::error::{ChatError, ProviderError};
use crate::fallback::{cost_effective_provider, fallback_candidates};
use crate::logging::{InteractionEntry, InteractionLogger};
use crate::provider::{
    default_model_for, ChatBackend, Completion, CompletionCall, CredentialOverrides, ProviderKind,
    ProviderRegistry,
};
use crate::request::{ChatReply, ChatRequest};
use crate::settings::SettingsStore;

/// Tunable protocol knobs.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Wait before the single same-provider retry after a rate limit.
    pub rate_limit_backoff: Duration,
    /// Cap on fallback attempts; `None` tries every available candidate.
    pub max_fallbacks: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            rate_limit_backoff: Duration::from_millis(RATE_LIMIT_BACKOFF_MS),
            max_fallbacks: None,
        }
    }
}

/// The current provider and model, used when a request names neither.
#[derive(Debug, Clone)]
struct Selection {
    provider: ProviderKind,
    model: String,
}

/// Orchestrates chat requests across the configured provider backends.
///
/// One instance per logical tenant or session; there is no process-global
/// state. In-flight requests capture the provider selection at call start,
/// so an administrative switch mid-request only affects later requests.
pub struct Orchestrator {
    registry: ProviderRegistry,
    settings: Arc<dyn SettingsStore>,
    logger: Arc<dyn InteractionLogger>,
    config: OrchestratorConfig,
    selection: RwLock<Selection>,
}

impl Orchestrator {
    /// Builds an orchestrator with a freshly configured registry and the
    /// default protocol knobs.
    pub async fn new(
        settings: Arc<dyn SettingsStore>,
        logger: Arc<dyn InteractionLogger>,
        overrides: &CredentialOverrides,
    ) -> Self {
        Self::with_config(settings, logger, overrides, OrchestratorConfig::default()).await
    }

    /// Like [`Orchestrator::new`] with explicit protocol knobs.
    pub async fn with_config(
        settings: Arc<dyn SettingsStore>,
        logger: Arc<dyn InteractionLogger>,
        overrides: &CredentialOverrides,
        config: OrchestratorConfig,
    ) -> Self {
        let registry = ProviderRegistry::new();
        registry.configure(settings.as_ref(), overrides).await;
        Self::from_parts(registry, settings, logger, config).await
    }

    /// Builds an orchestrator around an already-populated registry.
    ///
    /// The current selection is restored from the settings store; when none
    /// was persisted the compile-time default applies and is written back,
    /// best effort.
    pub async fn from_parts(
        registry: ProviderRegistry,
        settings: Arc<dyn SettingsStore>,
        logger: Arc<dyn InteractionLogger>,
        config: OrchestratorConfig,
    ) -> Self {
        let provider = match settings.get(SETTING_ACTIVE_PROVIDER).await {
            Ok(Some(name)) => name.parse().unwrap_or(DEFAULT_PROVIDER),
            _ => {
                let provider = DEFAULT_PROVIDER;
                if let Err(err) = settings.set(SETTING_ACTIVE_PROVIDER, provider.as_str()).await {
                    debug!("could not persist initial provider selection: {err}");
                }
                provider
            }
        };
        let model = settings
            .get(SETTING_ACTIVE_MODEL)
            .await
            .ok()
            .flatten()
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| default_model_for(provider));

        Self {
            registry,
            settings,
            logger,
            config,
            selection: RwLock::new(Selection { provider, model }),
        }
    }

    /// The registry of available provider backends.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// The provider used when a request does not name one.
    pub fn current_provider(&self) -> ProviderKind {
        self.read_selection().provider
    }

    /// The model used when a request names neither provider nor model.
    pub fn current_model(&self) -> String {
        self.read_selection().model
    }

    /// The cheapest usable provider, for batch callers.
    pub fn cost_effective_provider(&self) -> Option<ProviderKind> {
        cost_effective_provider(&self.registry)
    }

    /// Installs a new credential for a provider, effective immediately.
    pub async fn set_credential(
        &self,
        provider: ProviderKind,
        secret: &str,
    ) -> Result<(), ProviderError> {
        self.registry
            .set_credential(self.settings.as_ref(), provider, secret)
            .await
    }

    /// Switches the current provider (and optionally model) selection.
    ///
    /// Validates that the provider is available, updates the in-memory
    /// selection, and best-effort persists it. Never invokes a backend.
    pub async fn switch_provider(
        &self,
        provider: ProviderKind,
        model: Option<String>,
    ) -> Result<(), ChatError> {
        let Some(backend) = self.registry.get(provider) else {
            return Err(ChatError::NotConfigured { provider });
        };
        let model = model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| backend.default_model().to_string());

        {
            let mut selection = self
                .selection
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            selection.provider = provider;
            selection.model = model.clone();
        }

        if let Err(err) = self.settings.set(SETTING_ACTIVE_PROVIDER, provider.as_str()).await {
            debug!("could not persist provider selection: {err}");
        }
        if let Err(err) = self.settings.set(SETTING_ACTIVE_MODEL, &model).await {
            debug!("could not persist model selection: {err}");
        }
        Ok(())
    }

    /// Executes a chat request with retry and fallback.
    ///
    /// A requested provider with no configured credential fails immediately
    /// with [`ChatError::NotConfigured`]; fallback only engages once the
    /// primary backend has actually been attempted.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let correlation_id = request
            .correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let selection = self.read_selection();
        let primary = request.provider.unwrap_or(selection.provider);
        let backend = self
            .registry
            .get(primary)
            .ok_or(ChatError::NotConfigured { provider: primary })?;
        let model = request.model.clone().unwrap_or_else(|| {
            if request.provider.is_none() {
                selection.model.clone()
            } else {
                backend.default_model().to_string()
            }
        });

        let call = CompletionCall {
            messages: request.messages.clone(),
            system: request.system.clone(),
            model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let primary_failure = match self
            .attempt(backend.as_ref(), &call, &correlation_id, "primary")
            .await
        {
            Ok(completion) => return Ok(reply(primary, &call.model, completion, None)),
            Err(err) => classify(&err),
        };
        warn!(
            "{primary} attempt failed ({}): {}",
            primary_failure.kind, primary_failure.message
        );

        // A rate-limited primary earns exactly one more attempt.
        if primary_failure.kind == FailureKind::RateLimit {
            sleep(self.config.rate_limit_backoff).await;
            match self
                .attempt(backend.as_ref(), &call, &correlation_id, "retry")
                .await
            {
                Ok(completion) => return Ok(reply(primary, &call.model, completion, None)),
                Err(err) => warn!("{primary} retry failed: {err}"),
            }
        }

        // Fallback eligibility follows the original classification.
        if !primary_failure.retryable && primary_failure.kind != FailureKind::Auth {
            return Err(ChatError::Exhausted {
                kind: primary_failure.kind,
                message: primary_failure.message,
                fallbacks_tried: 0,
            });
        }

        let mut candidates = fallback_candidates(primary, &self.registry);
        if let Some(cap) = self.config.max_fallbacks {
            candidates.truncate(cap);
        }

        let mut tried = 0usize;
        for kind in candidates {
            let Some(fallback) = self.registry.get(kind) else {
                continue;
            };
            // Models are not interchangeable across providers, so each
            // candidate runs with its own default model.
            let fallback_call = CompletionCall {
                model: fallback.default_model().to_string(),
                ..call.clone()
            };
            tried += 1;
            match self
                .attempt(fallback.as_ref(), &fallback_call, &correlation_id, "fallback")
                .await
            {
                Ok(completion) => {
                    info!("{kind} served the request after {primary} failed");
                    return Ok(reply(kind, &fallback_call.model, completion, Some(primary)));
                }
                Err(err) => {
                    let classified = classify(&err);
                    warn!("fallback {kind} failed ({}): {}", classified.kind, err);
                }
            }
        }

        let message = if tried == 0 {
            primary_failure.message
        } else {
            let plural = if tried == 1 { "" } else { "s" };
            format!(
                "{} ({tried} fallback provider{plural} also failed)",
                primary_failure.message
            )
        };
        Err(ChatError::Exhausted {
            kind: primary_failure.kind,
            message,
            fallbacks_tried: tried,
        })
    }

    /// One backend invocation plus its interaction-log entry.
    async fn attempt(
        &self,
        backend: &dyn ChatBackend,
        call: &CompletionCall,
        correlation_id: &str,
        stage: &str,
    ) -> Result<Completion, ProviderError> {
        debug!(
            "sending chat completion to {} (model {}, stage {stage})",
            backend.kind(),
            call.model
        );
        let result = backend.complete(call).await;

        let output = match &result {
            Ok(completion) => json!({ "text": completion.text }),
            Err(err) => json!({ "error": err.to_string() }),
        };
        let entry = InteractionEntry {
            correlation_id: correlation_id.to_string(),
            kind: "chat".to_string(),
            provider: backend.kind(),
            model: call.model.clone(),
            input: json!({ "messages": call.messages, "system": call.system }),
            output,
            context: Some(stage.to_string()),
            success: result.is_ok(),
            recorded_at: Utc::now().to_rfc3339(),
        };
        if let Err(err) = self.logger.record(entry).await {
            debug!("interaction log write failed: {err}");
        }

        result
    }

    fn read_selection(&self) -> Selection {
        self.selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn reply(
    provider: ProviderKind,
    model: &str,
    completion: Completion,
    fallback_from: Option<ProviderKind>,
) -> ChatReply {
    ChatReply {
        text: completion.text,
        provider,
        model: model.to_string(),
        usage: completion.usage,
        fallback_from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{MemoryLogger, NoopLogger};
    use crate::message::Message;
    use crate::settings::MemorySettings;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Instant;

    struct MockBackend {
        kind: ProviderKind,
        default_model: String,
        script: Mutex<VecDeque<Result<Completion, ProviderError>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl MockBackend {
        fn new(
            kind: ProviderKind,
            script: Vec<Result<Completion, ProviderError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                kind,
                default_model: format!("mock-{}", kind.as_str()),
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for MockBackend {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn default_model(&self) -> &str {
            &self.default_model
        }

        async fn complete(&self, _call: &CompletionCall) -> Result<Completion, ProviderError> {
            self.calls.lock().unwrap().push(Instant::now());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ProviderError::Backend {
                        provider: self.kind,
                        message: "mock script exhausted".into(),
                    })
                })
        }
    }

    fn ok(text: &str) -> Result<Completion, ProviderError> {
        Ok(Completion {
            text: text.to_string(),
            usage: None,
        })
    }

    fn api_err(
        provider: ProviderKind,
        status: u16,
        body: &str,
    ) -> Result<Completion, ProviderError> {
        Err(ProviderError::Api {
            provider,
            status,
            body: body.to_string(),
        })
    }

    fn test_config() -> OrchestratorConfig {
        OrchestratorConfig {
            rate_limit_backoff: Duration::from_millis(25),
            max_fallbacks: None,
        }
    }

    async fn orchestrator_with(
        backends: Vec<Arc<MockBackend>>,
        logger: Arc<dyn InteractionLogger>,
    ) -> (Orchestrator, Arc<MemorySettings>) {
        let registry = ProviderRegistry::new();
        for backend in backends {
            registry.register(backend);
        }
        let settings = Arc::new(MemorySettings::new());
        let orchestrator =
            Orchestrator::from_parts(registry, settings.clone(), logger, test_config()).await;
        (orchestrator, settings)
    }

    fn hello_request(provider: ProviderKind) -> ChatRequest {
        ChatRequest::new(vec![Message::user("hello")]).with_provider(provider)
    }

    #[tokio::test]
    async fn rate_limited_primary_retries_once_then_succeeds() {
        let gemini = MockBackend::new(
            ProviderKind::Gemini,
            vec![
                api_err(ProviderKind::Gemini, 429, "Too Many Requests"),
                ok("second time lucky"),
            ],
        );
        let (orchestrator, _) =
            orchestrator_with(vec![gemini.clone()], Arc::new(NoopLogger)).await;

        let reply = orchestrator
            .chat(hello_request(ProviderKind::Gemini))
            .await
            .expect("retry should succeed");

        assert_eq!(reply.provider, ProviderKind::Gemini);
        assert_eq!(reply.text, "second time lucky");
        assert!(reply.fallback_from.is_none());

        let calls = gemini.call_times();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].duration_since(calls[0]) >= Duration::from_millis(25));
    }

    #[tokio::test]
    async fn auth_failure_falls_back_in_cost_order() {
        let openai = MockBackend::new(
            ProviderKind::OpenAi,
            vec![api_err(ProviderKind::OpenAi, 401, "invalid x-api-key")],
        );
        let groq = MockBackend::new(ProviderKind::Groq, vec![ok("groq answer")]);
        let gemini = MockBackend::new(ProviderKind::Gemini, vec![ok("gemini answer")]);
        let (orchestrator, _) = orchestrator_with(
            vec![openai.clone(), groq.clone(), gemini.clone()],
            Arc::new(NoopLogger),
        )
        .await;

        let reply = orchestrator
            .chat(hello_request(ProviderKind::OpenAi))
            .await
            .expect("fallback should succeed");

        assert_eq!(reply.provider, ProviderKind::Groq);
        assert_eq!(reply.fallback_from, Some(ProviderKind::OpenAi));
        assert_eq!(reply.model, "mock-groq");
        // Auth failures are not retried on the same provider.
        assert_eq!(openai.call_times().len(), 1);
        assert_eq!(groq.call_times().len(), 1);
        assert!(gemini.call_times().is_empty());
    }

    #[tokio::test]
    async fn server_error_skips_retry_and_falls_back() {
        let gemini = MockBackend::new(
            ProviderKind::Gemini,
            vec![api_err(ProviderKind::Gemini, 503, "overloaded")],
        );
        let groq = MockBackend::new(ProviderKind::Groq, vec![ok("groq answer")]);
        let (orchestrator, _) =
            orchestrator_with(vec![gemini.clone(), groq], Arc::new(NoopLogger)).await;

        let reply = orchestrator
            .chat(hello_request(ProviderKind::Gemini))
            .await
            .expect("fallback should succeed");

        assert_eq!(gemini.call_times().len(), 1);
        assert_eq!(reply.provider, ProviderKind::Groq);
    }

    #[tokio::test]
    async fn unknown_failures_are_retryable_and_fall_back() {
        let claude = MockBackend::new(
            ProviderKind::Claude,
            vec![Err(ProviderError::Backend {
                provider: ProviderKind::Claude,
                message: "weird internal thing".into(),
            })],
        );
        let groq = MockBackend::new(ProviderKind::Groq, vec![ok("recovered")]);
        let (orchestrator, _) =
            orchestrator_with(vec![claude, groq], Arc::new(NoopLogger)).await;

        let reply = orchestrator
            .chat(hello_request(ProviderKind::Claude))
            .await
            .expect("unknown failures still fall back");
        assert_eq!(reply.fallback_from, Some(ProviderKind::Claude));
    }

    #[tokio::test]
    async fn exhaustion_aggregates_primary_message_and_fallback_count() {
        let claude = MockBackend::new(
            ProviderKind::Claude,
            vec![api_err(ProviderKind::Claude, 500, "internal error")],
        );
        let gemini = MockBackend::new(
            ProviderKind::Gemini,
            vec![api_err(ProviderKind::Gemini, 503, "overloaded")],
        );
        let groq = MockBackend::new(
            ProviderKind::Groq,
            vec![api_err(ProviderKind::Groq, 429, "Too Many Requests")],
        );
        let (orchestrator, _) =
            orchestrator_with(vec![claude, gemini, groq], Arc::new(NoopLogger)).await;

        let err = orchestrator
            .chat(hello_request(ProviderKind::Claude))
            .await
            .expect_err("everything fails");

        match err {
            ChatError::Exhausted {
                kind,
                message,
                fallbacks_tried,
            } => {
                assert_eq!(kind, FailureKind::Server);
                assert_eq!(fallbacks_tried, 2);
                assert!(message.contains("Claude"));
                assert!(message.contains("2 fallback providers also failed"));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconfigured_provider_fails_immediately_without_fallback() {
        let groq = MockBackend::new(ProviderKind::Groq, vec![ok("never used")]);
        let (orchestrator, _) =
            orchestrator_with(vec![groq.clone()], Arc::new(NoopLogger)).await;

        let err = orchestrator
            .chat(hello_request(ProviderKind::Kimi))
            .await
            .expect_err("kimi has no credential");

        assert!(matches!(
            err,
            ChatError::NotConfigured {
                provider: ProviderKind::Kimi
            }
        ));
        assert!(groq.call_times().is_empty());
    }

    #[tokio::test]
    async fn request_defaults_to_current_selection() {
        let gemini = MockBackend::new(ProviderKind::Gemini, vec![ok("default answer")]);
        let (orchestrator, _) =
            orchestrator_with(vec![gemini], Arc::new(NoopLogger)).await;

        let reply = orchestrator
            .chat(ChatRequest::new(vec![Message::user("hello")]))
            .await
            .expect("default provider serves the request");

        assert_eq!(reply.provider, DEFAULT_PROVIDER);
        assert_eq!(reply.model, default_model_for(DEFAULT_PROVIDER));
    }

    #[tokio::test]
    async fn switch_provider_validates_availability_and_persists() {
        let groq = MockBackend::new(ProviderKind::Groq, vec![]);
        let (orchestrator, settings) =
            orchestrator_with(vec![groq], Arc::new(NoopLogger)).await;

        orchestrator
            .switch_provider(ProviderKind::Groq, None)
            .await
            .expect("groq is available");
        assert_eq!(orchestrator.current_provider(), ProviderKind::Groq);
        assert_eq!(orchestrator.current_model(), "mock-groq");
        assert_eq!(
            settings.get(SETTING_ACTIVE_PROVIDER).await.unwrap().as_deref(),
            Some("groq")
        );
        assert_eq!(
            settings.get(SETTING_ACTIVE_MODEL).await.unwrap().as_deref(),
            Some("mock-groq")
        );

        let err = orchestrator
            .switch_provider(ProviderKind::Claude, None)
            .await
            .expect_err("claude is not configured");
        assert!(matches!(err, ChatError::NotConfigured { .. }));
        assert_eq!(orchestrator.current_provider(), ProviderKind::Groq);
    }

    #[tokio::test]
    async fn every_attempt_is_logged_with_one_correlation_id() {
        let openai = MockBackend::new(
            ProviderKind::OpenAi,
            vec![api_err(ProviderKind::OpenAi, 401, "Unauthorized")],
        );
        let groq = MockBackend::new(ProviderKind::Groq, vec![ok("logged answer")]);
        let logger = Arc::new(MemoryLogger::new());
        let (orchestrator, _) =
            orchestrator_with(vec![openai, groq], logger.clone()).await;

        orchestrator
            .chat(hello_request(ProviderKind::OpenAi).with_correlation_id("agent-7"))
            .await
            .expect("fallback succeeds");

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.correlation_id == "agent-7"));
        assert_eq!(entries[0].context.as_deref(), Some("primary"));
        assert!(!entries[0].success);
        assert_eq!(entries[1].context.as_deref(), Some("fallback"));
        assert!(entries[1].success);
    }

    #[tokio::test]
    async fn logger_failures_never_affect_the_outcome() {
        struct FailingLogger;

        #[async_trait::async_trait]
        impl InteractionLogger for FailingLogger {
            async fn record(&self, _entry: InteractionEntry) -> anyhow::Result<()> {
                anyhow::bail!("log sink offline")
            }
        }

        let gemini = MockBackend::new(ProviderKind::Gemini, vec![ok("still fine")]);
        let (orchestrator, _) =
            orchestrator_with(vec![gemini], Arc::new(FailingLogger)).await;

        let reply = orchestrator
            .chat(hello_request(ProviderKind::Gemini))
            .await
            .expect("logging is fire-and-forget");
        assert_eq!(reply.text, "still fine");
    }

    #[tokio::test]
    async fn max_fallbacks_caps_the_candidate_sweep() {
        let claude = MockBackend::new(
            ProviderKind::Claude,
            vec![api_err(ProviderKind::Claude, 503, "overloaded")],
        );
        let groq = MockBackend::new(
            ProviderKind::Groq,
            vec![api_err(ProviderKind::Groq, 503, "overloaded")],
        );
        let gemini = MockBackend::new(ProviderKind::Gemini, vec![ok("unreachable")]);

        let registry = ProviderRegistry::new();
        registry.register(claude);
        registry.register(groq);
        registry.register(gemini.clone());
        let orchestrator = Orchestrator::from_parts(
            registry,
            Arc::new(MemorySettings::new()),
            Arc::new(NoopLogger),
            OrchestratorConfig {
                rate_limit_backoff: Duration::from_millis(25),
                max_fallbacks: Some(1),
            },
        )
        .await;

        let err = orchestrator
            .chat(hello_request(ProviderKind::Claude))
            .await
            .expect_err("the cap stops before gemini");
        match err {
            ChatError::Exhausted {
                fallbacks_tried, ..
            } => assert_eq!(fallbacks_tried, 1),
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert!(gemini.call_times().is_empty());
    }
}
