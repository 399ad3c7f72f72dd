//! Model capability registry
//!
//! Resolves a client-supplied model id to the backend family and limits
//! used to serve it. Lookup order: configured entries, the built-in table,
//! family inference from the id, then the configured default backend.

use indexmap::IndexMap;
use prism_config::{BackendType, ModelsConfig};

use crate::error::LlmError;

/// What the gateway knows about one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCapability {
    /// Model identifier
    pub model_id: String,
    /// Backend family serving the model
    pub backend_type: BackendType,
    /// Whether the backend accepts `OpenAI`-shaped bodies
    pub openai_compatible: bool,
    /// Whether incremental backend streaming is available
    pub supports_streaming: bool,
    /// Output token cap
    pub max_tokens: u32,
}

impl ModelCapability {
    fn for_family(model_id: &str, backend_type: BackendType) -> Self {
        let (supports_streaming, max_tokens) = match backend_type {
            BackendType::Native => (true, 16_384),
            BackendType::BedrockAnthropic | BackendType::VertexGemini => (true, 8192),
            BackendType::Generic => (false, 4096),
        };

        Self {
            model_id: model_id.to_owned(),
            backend_type,
            openai_compatible: backend_type == BackendType::Native,
            supports_streaming,
            max_tokens,
        }
    }

    /// Clamp a requested output cap to what the model allows
    pub fn clamp_max_tokens(&self, requested: Option<u32>) -> u32 {
        requested.map_or(self.max_tokens, |r| r.min(self.max_tokens)).max(1)
    }
}

const BUILTIN_MODELS: &[(&str, BackendType, u32)] = &[
    ("gpt-4o", BackendType::Native, 16_384),
    ("gpt-4o-mini", BackendType::Native, 16_384),
    ("gpt-4.1", BackendType::Native, 32_768),
    ("o3-mini", BackendType::Native, 100_000),
    ("claude-3-5-sonnet", BackendType::BedrockAnthropic, 8192),
    ("claude-3-7-sonnet", BackendType::BedrockAnthropic, 64_000),
    ("claude-sonnet-4", BackendType::BedrockAnthropic, 64_000),
    ("claude-opus-4", BackendType::BedrockAnthropic, 32_000),
    ("gemini-1.5-pro", BackendType::VertexGemini, 8192),
    ("gemini-2.0-flash", BackendType::VertexGemini, 8192),
    ("gemini-2.5-pro", BackendType::VertexGemini, 65_536),
    ("llama3.1-70b", BackendType::Generic, 4096),
    ("llama3.1-405b", BackendType::Generic, 4096),
    ("mistral-large2", BackendType::Generic, 8192),
];

/// Capability lookup for every model the gateway serves
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    models: IndexMap<String, ModelCapability>,
    default_backend: BackendType,
    strict: bool,
}

impl CapabilityRegistry {
    /// Build the registry from the built-in table overlaid with configured entries
    pub fn from_config(config: &ModelsConfig) -> Self {
        let mut models: IndexMap<String, ModelCapability> = BUILTIN_MODELS
            .iter()
            .map(|&(id, backend_type, max_tokens)| {
                let capability = ModelCapability {
                    max_tokens,
                    ..ModelCapability::for_family(id, backend_type)
                };
                (id.to_owned(), capability)
            })
            .collect();

        for (id, entry) in &config.entries {
            let base = ModelCapability::for_family(id, entry.backend);
            let capability = ModelCapability {
                openai_compatible: entry.openai_compatible.unwrap_or(base.openai_compatible),
                supports_streaming: entry.streaming,
                max_tokens: entry.max_tokens,
                ..base
            };
            models.insert(id.clone(), capability);
        }

        Self {
            models,
            default_backend: config.default_backend,
            strict: config.strict,
        }
    }

    /// Resolve a model id
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ModelNotFound`] in strict mode when the id is not
    /// a known entry, and [`LlmError::InvalidRequest`] for an empty id
    pub fn resolve(&self, model: &str) -> Result<ModelCapability, LlmError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(LlmError::InvalidRequest("model must not be empty".to_owned()));
        }

        if let Some(capability) = self.models.get(model) {
            return Ok(capability.clone());
        }

        if self.strict {
            return Err(LlmError::ModelNotFound {
                model: model.to_owned(),
            });
        }

        let family = infer_family(model).unwrap_or(self.default_backend);
        tracing::debug!(model, backend = %family, "resolved model by inference");

        Ok(ModelCapability::for_family(model, family))
    }

    /// Known models, in registration order
    pub fn models(&self) -> impl Iterator<Item = &ModelCapability> {
        self.models.values()
    }
}

/// Guess the backend family from a model id
fn infer_family(model: &str) -> Option<BackendType> {
    let lower = model.to_ascii_lowercase();
    let name = lower.rsplit(['/', ':']).next().unwrap_or(&lower);

    if lower.contains("claude") {
        Some(BackendType::BedrockAnthropic)
    } else if lower.contains("gemini") {
        Some(BackendType::VertexGemini)
    } else if ["gpt-", "chatgpt", "o1", "o3", "o4"].iter().any(|p| name.starts_with(p)) {
        Some(BackendType::Native)
    } else {
        None
    }
}
