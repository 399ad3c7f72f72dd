use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{StreamExt, future};
use http::{HeaderMap, StatusCode, header};
use prism_config::{BackendConfig, RetryConfig};
use rand::Rng;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use url::Url;

use super::{Backend, BackendRequest, DeltaStream, TokenProvider, body};
use crate::error::{BackendError, LlmError};
use crate::extract::probe_delta;

/// Backend reached over HTTP, one POST per call
pub struct HttpBackend {
    client: Client,
    endpoint: Url,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryConfig,
}

impl HttpBackend {
    /// Create from backend configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Internal` if no `base_url` is configured or the
    /// HTTP client cannot be built.
    pub fn new(config: &BackendConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, LlmError> {
        let endpoint = config
            .base_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("backend.base_url is not configured"))?;

        // Whole-call deadlines are enforced by the orchestrator; a client-wide
        // timeout would also cut off long streams
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build backend HTTP client: {e}"))?;

        Ok(Self {
            client,
            endpoint,
            tokens,
            retry: config.retry.clone(),
        })
    }

    /// POST `body`, retrying rate-limited attempts
    async fn send(&self, body: &Value) -> Result<reqwest::Response, BackendError> {
        let mut attempt = 1;

        loop {
            let mut builder = self.client.post(self.endpoint.clone()).json(body);
            if let Some(token) = self.tokens.valid_token().await? {
                builder = builder.bearer_auth(token.expose_secret());
            }

            let response = builder.send().await.map_err(|e| {
                tracing::error!(error = %e, "backend request failed");
                BackendError::from(e)
            })?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after(response.headers());
                if attempt >= self.retry.max_attempts {
                    tracing::error!(attempts = attempt, "backend rate limit persisted after retries");
                    return Err(BackendError::RateLimited { retry_after });
                }

                let delay = retry_after.map_or_else(
                    || backoff_delay(&self.retry, attempt, &mut rand::rng()),
                    |d| d.min(self.retry.max_backoff),
                );
                tracing::warn!(
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "backend rate limited, retrying"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                tracing::error!(status = %status, "backend rejected credentials");
                return Err(BackendError::Unauthorized { status: status.as_u16() });
            }

            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "backend returned error");
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn complete(&self, request: &BackendRequest) -> Result<Value, BackendError> {
        let body = body::request_body(request, false);

        self.send(&body)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn complete_stream(&self, request: &BackendRequest) -> Result<DeltaStream, BackendError> {
        let body = body::request_body(request, true);
        let response = self.send(&body).await?;

        let deltas = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| future::ready(!matches!(event, Ok(e) if e.data.trim() == "[DONE]")))
            .filter_map(|event| {
                future::ready(match event {
                    Ok(event) => match serde_json::from_str::<Value>(&event.data) {
                        Ok(value) => Some(Ok(probe_delta(&value))),
                        Err(e) => {
                            tracing::debug!(error = %e, data = %event.data, "skipping unparseable SSE event");
                            None
                        }
                    },
                    Err(e) => Some(Err(BackendError::Transport(e.to_string()))),
                })
            })
            .boxed();

        Ok(deltas)
    }
}

/// Delay before retry number `attempt`
///
/// Exponential from `initial_backoff`, capped at `max_backoff`, with full
/// jitter: the result is uniform between zero and the capped value.
pub fn backoff_delay(retry: &RetryConfig, attempt: u32, rng: &mut impl Rng) -> Duration {
    let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
    let ceiling = retry.initial_backoff.saturating_mul(factor).min(retry.max_backoff);
    let millis = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);

    Duration::from_millis(rng.random_range(0..=millis))
}

/// `Retry-After` in whole seconds
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(2),
        }
    }

    #[test]
    fn backoff_stays_under_exponential_ceiling() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            assert!(backoff_delay(&retry(), 1, &mut rng) <= Duration::from_millis(500));
            assert!(backoff_delay(&retry(), 2, &mut rng) <= Duration::from_secs(1));
            assert!(backoff_delay(&retry(), 10, &mut rng) <= Duration::from_secs(2));
        }
    }

    #[test]
    fn backoff_is_jittered() {
        let mut rng = StdRng::seed_from_u64(7);
        let delays: std::collections::HashSet<Duration> =
            (0..20).map(|_| backoff_delay(&retry(), 3, &mut rng)).collect();

        assert!(delays.len() > 1);
    }

    #[test]
    fn retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("3"));

        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));
    }

    #[test]
    fn retry_after_http_date_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );

        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn missing_base_url_is_rejected() {
        let config = BackendConfig::default();
        let tokens = Arc::new(super::super::StaticTokenProvider::default());

        assert!(HttpBackend::new(&config, tokens).is_err());
    }
}
