use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_backend()?;
        self.validate_engine()?;
        self.validate_tools()?;
        self.validate_streaming()?;
        Ok(())
    }

    fn validate_backend(&self) -> anyhow::Result<()> {
        let retry = &self.backend.retry;

        if retry.max_attempts == 0 {
            anyhow::bail!("backend.retry.max_attempts must be at least 1");
        }

        if retry.initial_backoff > retry.max_backoff {
            anyhow::bail!("backend.retry.initial_backoff must not exceed backend.retry.max_backoff");
        }

        if self.backend.timeout.is_zero() {
            anyhow::bail!("backend.timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_engine(&self) -> anyhow::Result<()> {
        if self.engine.max_turns == 0 {
            anyhow::bail!("engine.max_turns must be at least 1");
        }

        if self.engine.max_history < 2 {
            anyhow::bail!("engine.max_history must be at least 2");
        }

        Ok(())
    }

    fn validate_tools(&self) -> anyhow::Result<()> {
        if self.tools.allow_dangerous && self.tools.sandbox_root.is_none() {
            anyhow::bail!("tools.sandbox_root is required when tools.allow_dangerous is enabled");
        }

        if self.tools.timeout.is_zero() {
            anyhow::bail!("tools.timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_streaming(&self) -> anyhow::Result<()> {
        if self.streaming.chunk_words == 0 {
            anyhow::bail!("streaming.chunk_words must be at least 1");
        }

        if self.streaming.heartbeat_interval.is_zero() {
            anyhow::bail!("streaming.heartbeat_interval must be greater than 0");
        }

        Ok(())
    }
}
