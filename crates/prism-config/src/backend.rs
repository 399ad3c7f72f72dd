use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Connection settings for the hosted model backend
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Completion endpoint, one POST per orchestration turn
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Static bearer token
    #[serde(default)]
    pub api_token: Option<SecretString>,
    /// Upper bound for a single backend call
    #[serde(default = "default_timeout", deserialize_with = "crate::duration::deserialize")]
    pub timeout: Duration,
    /// Retry policy for rate-limited calls
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            timeout: default_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

/// Bounded exponential backoff applied to HTTP 429 responses
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry
    #[serde(default = "default_initial_backoff", deserialize_with = "crate::duration::deserialize")]
    pub initial_backoff: Duration,
    /// Cap for any single delay
    #[serde(default = "default_max_backoff", deserialize_with = "crate::duration::deserialize")]
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
        }
    }
}

/// Model family served behind the backend, which decides request and response shapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// OpenAI-native chat models
    Native,
    /// Anthropic models hosted on Bedrock
    BedrockAnthropic,
    /// Gemini models hosted on Vertex
    VertexGemini,
    /// Anything else, addressed with a plain prompt body
    #[default]
    Generic,
}

impl BackendType {
    /// Stable string form used in logs and metric attributes
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::BedrockAnthropic => "bedrock-anthropic",
            Self::VertexGemini => "vertex-gemini",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

const fn default_max_attempts() -> u32 {
    4
}

const fn default_initial_backoff() -> Duration {
    Duration::from_millis(500)
}

const fn default_max_backoff() -> Duration {
    Duration::from_secs(8)
}
