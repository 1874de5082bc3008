//! Best-effort song suggestions.
//!
//! Suggestions are decoration: every failure mode (no provider, blank prompt,
//! offline, provider error, timeout) yields an empty list. The call runs on the
//! caller's task, never on the player actor.

use bridge_traits::{RecommendationProvider, Suggestion};
use core_async::time::{timeout, Duration};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct RecommendationService {
    provider: Option<Arc<dyn RecommendationProvider>>,
    timeout: Duration,
}

impl RecommendationService {
    pub fn new(provider: Option<Arc<dyn RecommendationProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    #[instrument(skip(self), fields(timeout_ms = self.timeout.as_millis() as u64))]
    pub async fn suggest(&self, prompt: &str, online: bool) -> Vec<Suggestion> {
        let Some(provider) = &self.provider else {
            debug!("No recommendation provider configured");
            return Vec::new();
        };

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Vec::new();
        }
        if !online {
            debug!("Skipping suggestions while offline");
            return Vec::new();
        }

        match timeout(self.timeout, provider.suggest(prompt)).await {
            Ok(Ok(suggestions)) => suggestions,
            Ok(Err(e)) => {
                warn!(error = %e, "Recommendation provider failed");
                Vec::new()
            }
            Err(_) => {
                warn!("Recommendation request timed out");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for RecommendationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationService")
            .field("enabled", &self.is_enabled())
            .field("timeout", &self.timeout)
            .finish()
    }
}
