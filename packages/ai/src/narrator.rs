//! Rate-spaced, time-bounded access to the configured provider.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::{
    AiError,
    prompt::{ANALYSIS_TEMPERATURE, SYSTEM_PROMPT},
    providers::{ChatRequest, LlmProvider, create_provider_from_env},
};

/// Per-call deadline when `AI_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Minimum spacing between consecutive provider calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Usage counters exposed by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarratorStats {
    /// Whether a provider is configured.
    pub available: bool,
    /// Provider name, if any.
    pub provider: Option<String>,
    /// Model name, if any.
    pub model: Option<String>,
    /// Calls attempted since startup.
    pub total_calls: u64,
    /// When the last call started.
    pub last_call: Option<DateTime<Utc>>,
}

/// Sends prompts to an optional LLM provider.
///
/// Every failure, including a missing provider, surfaces as
/// [`AiError::Unavailable`].
pub struct Narrator {
    provider: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
    min_interval: Duration,
    next_slot: tokio::sync::Mutex<Option<Instant>>,
    total_calls: AtomicU64,
    last_call: Mutex<Option<DateTime<Utc>>>,
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("timeout", &self.timeout)
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}

impl Narrator {
    /// Creates a narrator around an optional provider.
    #[must_use]
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            min_interval: DEFAULT_MIN_INTERVAL,
            next_slot: tokio::sync::Mutex::new(None),
            total_calls: AtomicU64::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// A narrator that never calls out.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_TIMEOUT)
    }

    /// Overrides the minimum spacing between calls.
    #[must_use]
    pub const fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Builds a narrator from `AI_PROVIDER`, the provider API keys and
    /// `AI_TIMEOUT_SECS`. Missing credentials disable narratives instead
    /// of failing.
    #[must_use]
    pub fn from_env() -> Self {
        let timeout = std::env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        match create_provider_from_env() {
            Ok(provider) => {
                log::info!(
                    "AI narratives enabled: provider={} model={} timeout={}s",
                    provider.name(),
                    provider.model(),
                    timeout.as_secs()
                );
                Self::new(Some(Arc::from(provider)), timeout)
            }
            Err(e) => {
                log::info!("AI narratives disabled: {e}");
                Self::new(None, timeout)
            }
        }
    }

    /// Whether a provider is configured.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Sends `prompt` with the default analysis temperature.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Unavailable`] if no provider is configured or the
    /// call fails or times out.
    pub async fn narrate(&self, prompt: &str) -> Result<String, AiError> {
        self.narrate_with(prompt, ANALYSIS_TEMPERATURE).await
    }

    /// Sends `prompt` with an explicit temperature.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Unavailable`] if no provider is configured or the
    /// call fails or times out.
    pub async fn narrate_with(&self, prompt: &str, temperature: f32) -> Result<String, AiError> {
        let Some(provider) = &self.provider else {
            return Err(AiError::Unavailable {
                reason: "no AI provider configured".to_string(),
            });
        };

        let request = ChatRequest::new(SYSTEM_PROMPT, prompt, temperature);
        // The deadline covers queueing for a pacing slot as well as the call.
        let call = async {
            self.wait_for_slot().await;
            self.total_calls.fetch_add(1, Ordering::Relaxed);
            *self
                .last_call
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
            provider.complete(&request).await
        };
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                log::warn!("AI provider {} failed: {e}", provider.name());
                Err(AiError::Unavailable {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                log::warn!(
                    "AI provider {} timed out after {}s",
                    provider.name(),
                    self.timeout.as_secs()
                );
                Err(AiError::Unavailable {
                    reason: format!("request timed out after {}s", self.timeout.as_secs()),
                })
            }
        }
    }

    async fn wait_for_slot(&self) {
        let mut next = self.next_slot.lock().await;
        if let Some(at) = *next {
            tokio::time::sleep_until(at).await;
        }
        *next = Some(Instant::now() + self.min_interval);
    }

    /// Current usage counters.
    #[must_use]
    pub fn stats(&self) -> NarratorStats {
        NarratorStats {
            available: self.is_available(),
            provider: self.provider.as_ref().map(|p| p.name().to_string()),
            model: self.provider.as_ref().map(|p| p.model().to_string()),
            total_calls: self.total_calls.load(Ordering::Relaxed),
            last_call: *self
                .last_call
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Behavior {
        Echo,
        Fail,
        Hang,
    }

    struct MockProvider(Behavior);

    #[async_trait::async_trait]
    impl LlmProvider for MockProvider {
        async fn complete(&self, request: &ChatRequest) -> Result<String, AiError> {
            match self.0 {
                Behavior::Echo => Ok(format!("echo: {}", request.prompt)),
                Behavior::Fail => Err(AiError::Provider {
                    message: "quota exceeded".to_string(),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-1"
        }
    }

    fn narrator(behavior: Behavior) -> Narrator {
        Narrator::new(Some(Arc::new(MockProvider(behavior))), DEFAULT_TIMEOUT)
    }

    #[tokio::test]
    async fn unavailable_without_provider() {
        let n = Narrator::disabled();
        assert!(!n.is_available());
        assert!(matches!(
            n.narrate("hi").await.unwrap_err(),
            AiError::Unavailable { .. }
        ));
        assert_eq!(n.stats().total_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_text_and_counts_calls() {
        let n = narrator(Behavior::Echo);
        assert_eq!(n.narrate("hello").await.unwrap(), "echo: hello");
        let stats = n.stats();
        assert!(stats.available);
        assert_eq!(stats.provider.as_deref(), Some("mock"));
        assert_eq!(stats.model.as_deref(), Some("mock-1"));
        assert_eq!(stats.total_calls, 1);
        assert!(stats.last_call.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn provider_errors_become_unavailable() {
        let n = narrator(Behavior::Fail);
        match n.narrate("x").await.unwrap_err() {
            AiError::Unavailable { reason } => assert!(reason.contains("quota exceeded")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let n = narrator(Behavior::Hang);
        let started = Instant::now();
        match n.narrate("x").await.unwrap_err() {
            AiError::Unavailable { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
        assert!(started.elapsed() >= DEFAULT_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_calls_are_spaced() {
        let n = narrator(Behavior::Echo);
        let started = Instant::now();
        n.narrate("a").await.unwrap();
        n.narrate("b").await.unwrap();
        n.narrate("c").await.unwrap();
        assert!(started.elapsed() >= DEFAULT_MIN_INTERVAL * 2);
        assert_eq!(n.stats().total_calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_for_a_pacing_slot_counts_against_the_timeout() {
        let n = Narrator::new(
            Some(Arc::new(MockProvider(Behavior::Echo))),
            Duration::from_secs(5),
        )
        .with_min_interval(Duration::from_secs(60));
        n.narrate("first").await.unwrap();

        let started = Instant::now();
        match n.narrate("second").await.unwrap_err() {
            AiError::Unavailable { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(6));
        assert_eq!(n.stats().total_calls, 1);
    }
}
