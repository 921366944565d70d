//! HTTP client with per-session cancellation

use crate::wire::{ReviewRequest, ReviewResponse};
use crate::AdjudicatorError;
use async_trait::async_trait;
use dashmap::DashMap;
use filmlane_core::{Adjudicator, ReviewOutcome, ReviewPacket};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Client configuration. The bearer token is read from the
/// `FILMLANE_REVIEW_TOKEN` environment variable, never stored in files.
#[derive(Debug, Clone)]
pub struct AdjudicatorConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    /// Callers gate on this; test runtimes leave it off.
    pub enabled: bool,
}

impl Default for AdjudicatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787".to_string(),
            model: "screenplay-review-1".to_string(),
            timeout: Duration::from_secs(60),
            enabled: false,
        }
    }
}

impl AdjudicatorConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// The review endpoint client. One instance serves all sessions; abort
/// handles are keyed by session id.
pub struct HttpAdjudicator {
    config: AdjudicatorConfig,
    client: reqwest::Client,
    token: Option<String>,
    aborts: DashMap<String, watch::Sender<bool>>,
}

impl HttpAdjudicator {
    pub fn new(config: AdjudicatorConfig) -> Result<Self, AdjudicatorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdjudicatorError::Network(e.to_string()))?;
        Ok(Self {
            config,
            client,
            token: std::env::var("FILMLANE_REVIEW_TOKEN").ok(),
            aborts: DashMap::new(),
        })
    }

    pub fn config(&self) -> &AdjudicatorConfig {
        &self.config
    }

    pub fn has_credentials(&self) -> bool {
        self.token.is_some()
    }

    /// Register a fresh abort pair for the session, cancelling any previous
    /// in-flight request for the same session.
    fn register_abort(&self, session_id: &str) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        if let Some(previous) = self.aborts.insert(session_id.to_string(), tx) {
            let _ = previous.send(true);
        }
        rx
    }

    async fn post_packet(
        &self,
        session_id: &str,
        packet: &ReviewPacket,
    ) -> Result<ReviewResponse, AdjudicatorError> {
        let request = ReviewRequest::from_packet(session_id, packet);
        let url = format!("{}/api/agent/review", self.config.endpoint.trim_end_matches('/'));

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdjudicatorError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<ReviewResponse>()
            .await
            .map_err(|e| AdjudicatorError::Shape(e.to_string()))
    }
}

#[async_trait]
impl Adjudicator for HttpAdjudicator {
    async fn review(&self, session_id: &str, packet: &ReviewPacket) -> ReviewOutcome {
        let mut abort = self.register_abort(session_id);
        let started = Instant::now();
        let model = self.config.model.clone();

        let result = tokio::select! {
            result = self.post_packet(session_id, packet) => result,
            _ = abort.changed() => {
                tracing::info!(session_id, "review aborted by a newer paste");
                return ReviewOutcome::Skipped {
                    model,
                    message: "superseded by a newer paste".to_string(),
                    latency_ms: started.elapsed().as_millis() as u64,
                };
            }
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => response.into_outcome(latency_ms),
            Err(AdjudicatorError::Shape(message)) => {
                tracing::warn!(session_id, %message, "review response shape mismatch");
                ReviewOutcome::Skipped {
                    model,
                    message,
                    latency_ms,
                }
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "review request failed");
                ReviewOutcome::Error {
                    model,
                    message: err.to_string(),
                    latency_ms,
                }
            }
        }
    }

    fn abort(&self, session_id: &str) {
        if let Some((_, tx)) = self.aborts.remove(session_id) {
            let _ = tx.send(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_abort_resolves_to_skipped() {
        // Point at a blackhole address; the abort must win the race.
        let client = HttpAdjudicator::new(
            AdjudicatorConfig::default()
                .with_endpoint("http://10.255.255.1:9")
                .with_enabled(true),
        )
        .unwrap();
        let packet = ReviewPacket {
            total_suspicious: 0,
            total_reviewed: 0,
            suspicion_rate: 0.0,
            suspicious_lines: vec![],
        };

        let review = client.review("s1", &packet);
        tokio::pin!(review);
        // Let the request start, then abort it from the side.
        let outcome = tokio::select! {
            outcome = &mut review => outcome,
            _ = async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                client.abort("s1");
                std::future::pending::<()>().await
            } => unreachable!(),
        };
        assert!(matches!(outcome, ReviewOutcome::Skipped { .. }));
    }

    #[test]
    fn test_unreachable_endpoint_is_error_outcome() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let client = HttpAdjudicator::new(
            AdjudicatorConfig::default().with_endpoint("http://127.0.0.1:1"),
        )
        .unwrap();
        let packet = ReviewPacket::default();
        let outcome = runtime.block_on(client.review("s1", &packet));
        assert!(matches!(outcome, ReviewOutcome::Error { .. }));
    }
}
