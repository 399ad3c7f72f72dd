use indexmap::IndexMap;
use serde::Deserialize;

use crate::backend::BackendType;

/// Model catalogue used to build the capability registry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    /// Backend type assumed for ids that match nothing else
    #[serde(default)]
    pub default_backend: BackendType,
    /// Reject unknown model ids instead of falling back
    #[serde(default)]
    pub strict: bool,
    /// Explicit per-model entries, overriding the built-in table
    #[serde(default)]
    pub entries: IndexMap<String, ModelEntry>,
}

/// Capability overrides for one model id
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntry {
    /// Backend family serving this model
    pub backend: BackendType,
    /// Whether the backend accepts OpenAI-shaped bodies for this model
    #[serde(default)]
    pub openai_compatible: Option<bool>,
    /// Whether incremental backend streaming is available
    #[serde(default = "default_streaming")]
    pub streaming: bool,
    /// Output token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

#[allow(clippy::missing_const_for_fn)]
fn default_streaming() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_tokens() -> u32 {
    4096
}
