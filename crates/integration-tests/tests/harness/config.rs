//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use prism_config::{BackendConfig, Config, HealthConfig, RetryConfig, ServerConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pointed at a mock backend, built-in tools off
    pub fn new(backend_url: &str) -> Self {
        let mut config = Config {
            server: ServerConfig {
                listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                health: HealthConfig {
                    enabled: true,
                    ..HealthConfig::default()
                },
            },
            backend: BackendConfig {
                base_url: Some(backend_url.parse().expect("valid URL")),
                api_token: Some(SecretString::from("test-token")),
                timeout: Duration::from_secs(5),
                retry: RetryConfig {
                    max_attempts: 3,
                    initial_backoff: Duration::from_millis(10),
                    max_backoff: Duration::from_millis(50),
                },
            },
            ..Config::default()
        };
        config.tools.builtin = false;

        Self { config }
    }

    /// Enable the built-in tool registry
    pub fn with_builtin_tools(mut self) -> Self {
        self.config.tools.builtin = true;
        self
    }

    /// Add a glossary entry for the `lookup` tool
    pub fn with_glossary(mut self, term: &str, definition: &str) -> Self {
        self.config.tools.lookup.insert(term.to_owned(), definition.to_owned());
        self
    }

    /// Set the orchestration turn limit
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.config.engine.max_turns = max_turns;
        self
    }

    /// Reject unknown model ids
    pub fn strict_models(mut self) -> Self {
        self.config.models.strict = true;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test config");
        self.config
    }
}
