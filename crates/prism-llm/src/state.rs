//! Engine state shared by every route handler

use std::sync::Arc;

use prism_config::Config;
use prism_telemetry::EngineMetrics;

use crate::backend::{Backend, HttpBackend, StaticTokenProvider};
use crate::capability::{CapabilityRegistry, ModelCapability};
use crate::error::LlmError;
use crate::ids::ResponseIds;
use crate::orchestrator::{Orchestrator, Outcome};
use crate::stream::{EventStream, StreamGenerator};
use crate::tokens::TokenCounter;
use crate::tools::ToolExecutor;
use crate::types::ChatRequest;

/// Shared state for LLM route handlers
#[derive(Clone)]
pub struct LlmState {
    pub(crate) inner: Arc<LlmStateInner>,
}

pub(crate) struct LlmStateInner {
    pub(crate) registry: CapabilityRegistry,
    pub(crate) orchestrator: Arc<Orchestrator>,
    pub(crate) generator: StreamGenerator,
    pub(crate) ids: ResponseIds,
    pub(crate) tokens: TokenCounter,
    pub(crate) metrics: EngineMetrics,
    pub(crate) started: jiff::Timestamp,
}

impl LlmState {
    /// Build the engine against the configured HTTP backend
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built, for example
    /// when `backend.base_url` is missing
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let tokens = Arc::new(StaticTokenProvider::new(config.backend.api_token.clone()));
        let backend = HttpBackend::new(&config.backend, tokens)?;

        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Build the engine against any backend implementation
    pub fn with_backend(config: &Config, backend: Arc<dyn Backend>) -> Self {
        let metrics = EngineMetrics::new();
        let executor = ToolExecutor::from_config(&config.tools);
        let orchestrator = Orchestrator::new(backend, executor, config, metrics.clone());

        tracing::info!(
            builtin_tools = orchestrator.builtin_active(),
            tools = orchestrator.executor().definitions().len(),
            max_turns = config.engine.max_turns,
            "engine ready"
        );

        Self {
            inner: Arc::new(LlmStateInner {
                registry: CapabilityRegistry::from_config(&config.models),
                orchestrator: Arc::new(orchestrator),
                generator: StreamGenerator::new(&config.streaming),
                ids: ResponseIds::new(),
                tokens: TokenCounter::new(),
                metrics,
                started: jiff::Timestamp::now(),
            }),
        }
    }

    /// Resolve the model named by a request
    ///
    /// # Errors
    ///
    /// Returns an error if the model id is empty or unknown in strict mode
    pub fn resolve(&self, model: &str) -> Result<ModelCapability, LlmError> {
        self.inner.registry.resolve(model)
    }

    /// Answer a request with one finished result
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the tool loop does not finish
    pub async fn complete(&self, request: &ChatRequest, capability: &ModelCapability) -> Result<Outcome, LlmError> {
        self.inner.orchestrator.run(request, capability).await
    }

    /// Answer a request as a canonical event stream
    ///
    /// Streams straight from the backend when the model supports it and no
    /// tool loop can run. Otherwise the full result is computed behind
    /// heartbeats and then replayed as events.
    pub fn stream(&self, request: ChatRequest, capability: ModelCapability) -> EventStream {
        let orchestrator = Arc::clone(&self.inner.orchestrator);
        let generator = &self.inner.generator;

        if capability.supports_streaming && request.tools.is_empty() && !orchestrator.builtin_active() {
            let backend_request = orchestrator.stream_request(&request, &capability);
            tracing::debug!(model = %capability.model_id, "streaming directly from backend");

            return generator.from_deltas(backend_request.prompt_chars(), async move {
                orchestrator.open_stream(backend_request).await
            });
        }

        let prompt_tokens = u32::try_from(self.count_tokens(&request)).unwrap_or(u32::MAX);
        generator.from_pending(prompt_tokens, async move {
            orchestrator.run(&request, &capability).await.map(|outcome| outcome.result)
        })
    }

    /// Input tokens `request` would consume
    pub fn count_tokens(&self, request: &ChatRequest) -> usize {
        self.inner.tokens.count_request(request)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelCapability> {
        self.inner.registry.models()
    }
}
