//! Tool orchestrator
//!
//! Drives one request through `build prompt -> call backend -> extract ->
//! repair`, and for built-in tools `execute -> append results` before
//! calling the backend again. The loop is bounded by the configured turn
//! limit.

mod conversation;
mod placeholder;
pub mod prompt;

use std::sync::Arc;
use std::time::{Duration, Instant};

use prism_config::Config;
use prism_telemetry::EngineMetrics;
use serde_json::Value;

pub use conversation::ConversationState;
pub use placeholder::{Placeholder, PlaceholderRewriter};

use crate::backend::{Backend, BackendRequest, DeltaStream};
use crate::capability::ModelCapability;
use crate::error::{BackendError, LlmError};
use crate::extract::Extractor;
use crate::repair::ToolCallRepair;
use crate::tools::{self, ToolError, ToolExecutor};
use crate::types::{ChatRequest, Message, NormalizedResult, Role, ToolDefinition, Usage};

/// Final answer of one orchestrated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub result: NormalizedResult,
    /// Backend calls made
    pub turns: u32,
    /// Tool calls dropped as unrepairable, over all turns
    pub dropped_tool_calls: usize,
}

/// Who runs the tools of a request
enum ToolMode {
    /// No tools advertised
    None,
    /// Declared by the client, which executes them
    Client(Vec<ToolDefinition>),
    /// The built-in registry, executed here
    Builtin(Vec<ToolDefinition>),
}

impl ToolMode {
    fn definitions(&self) -> &[ToolDefinition] {
        match self {
            Self::None => &[],
            Self::Client(defs) | Self::Builtin(defs) => defs,
        }
    }
}

/// Runs the tool-calling conversation loop
pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    executor: ToolExecutor,
    extractor: Extractor,
    repair: ToolCallRepair,
    placeholders: PlaceholderRewriter,
    builtin_tools: bool,
    max_turns: u32,
    max_history: usize,
    backend_timeout: Duration,
    metrics: EngineMetrics,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn Backend>, executor: ToolExecutor, config: &Config, metrics: EngineMetrics) -> Self {
        Self {
            backend,
            executor,
            extractor: Extractor::new(),
            repair: ToolCallRepair::new(),
            placeholders: PlaceholderRewriter::new(),
            builtin_tools: config.tools.builtin,
            max_turns: config.engine.max_turns.max(1),
            max_history: config.engine.max_history,
            backend_timeout: config.backend.timeout,
            metrics,
        }
    }

    pub const fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    /// Whether requests without client tools get the built-in registry
    pub fn builtin_active(&self) -> bool {
        self.builtin_tools && !self.executor.is_empty()
    }

    /// Answer a request, running built-in tools until the model is done
    pub async fn run(&self, request: &ChatRequest, capability: &ModelCapability) -> Result<Outcome, LlmError> {
        let mode = self.tool_mode(request)?;
        let (mut conversation, system) = self.prepare(request);

        let mut usage = Usage::default();
        let mut dropped = 0;

        for turn in 1..=self.max_turns {
            let backend_request = self.backend_request(
                request,
                capability,
                prompt::render(mode.definitions(), &conversation),
                system.clone(),
            );

            let raw = self.call_backend(&backend_request, turn).await?;
            let extraction = self.extractor.extract(&raw, backend_request.prompt_chars());

            if let Some(failure) = &extraction.failure {
                tracing::warn!(
                    model = %capability.model_id,
                    backend = capability.backend_type.as_str(),
                    shape = ?failure.shape,
                    "backend response had no usable content"
                );
                self.metrics.record_extraction_failure(capability.backend_type.as_str());
            }
            usage += extraction.usage;

            let calls = match &mode {
                ToolMode::None => {
                    if !extraction.tool_calls.is_empty() {
                        tracing::warn!(
                            count = extraction.tool_calls.len(),
                            "discarding tool calls, no tools were advertised"
                        );
                    }
                    Vec::new()
                }
                ToolMode::Client(defs) | ToolMode::Builtin(defs) => {
                    let report = self.repair.repair(extraction.tool_calls, defs);
                    dropped += report.dropped;
                    self.metrics.record_repair_dropped(report.dropped);
                    if !report.diagnostics.is_empty() {
                        tracing::debug!(turn, diagnostics = ?report.diagnostics, "repaired tool calls");
                    }
                    report.calls
                }
            };

            if calls.is_empty() || matches!(mode, ToolMode::Client(_)) {
                self.metrics.record_turns(turn);
                tracing::info!(
                    model = %capability.model_id,
                    turns = turn,
                    tool_calls = calls.len(),
                    "request answered"
                );

                return Ok(Outcome {
                    result: NormalizedResult::new(extraction.text, usage, calls, extraction.signal),
                    turns: turn,
                    dropped_tool_calls: dropped,
                });
            }

            // Results from the last allowed turn could never reach the model
            if turn == self.max_turns {
                tracing::debug!(turn, calls = calls.len(), "not executing tool calls past the turn limit");
                break;
            }

            tracing::debug!(turn, calls = calls.len(), "executing built-in tool calls");
            let results = self.executor.execute_batch(&calls).await;

            for (call, result) in calls.iter().zip(&results) {
                let outcome = result.as_ref().err().map_or("success", ToolError::outcome);
                self.metrics.record_tool_call(&call.name, outcome);
            }

            conversation.push(Message::assistant_tool_calls(extraction.text, calls.clone()));
            for (call, result) in calls.into_iter().zip(results) {
                conversation.push(Message::tool_result(
                    call.id,
                    Some(call.name),
                    tools::result_text(&result),
                ));
            }
        }

        self.metrics.record_turns(self.max_turns);
        tracing::warn!(max_turns = self.max_turns, "tool orchestration hit the turn limit");

        Err(LlmError::OrchestrationLimitExceeded {
            max_turns: self.max_turns,
        })
    }

    /// Single backend request for a request streamed straight through
    ///
    /// Only used when no tools are in play.
    pub fn stream_request(&self, request: &ChatRequest, capability: &ModelCapability) -> BackendRequest {
        let (conversation, system) = self.prepare(request);
        self.backend_request(request, capability, prompt::render(&[], &conversation), system)
    }

    /// Open a backend stream, bounded by the backend timeout
    pub async fn open_stream(&self, request: BackendRequest) -> Result<DeltaStream, LlmError> {
        let start = Instant::now();
        let backend = request.backend_type.as_str();

        let opened = tokio::time::timeout(self.backend_timeout, self.backend.complete_stream(&request))
            .await
            .unwrap_or(Err(BackendError::Timeout {
                after: self.backend_timeout,
            }));

        match &opened {
            Ok(_) => self.metrics.record_backend_call(backend, start, "success"),
            Err(e) => {
                tracing::error!(backend, error = %e, "backend stream failed to open");
                self.metrics.record_backend_call(backend, start, e.outcome());
            }
        }

        Ok(opened?)
    }

    fn tool_mode(&self, request: &ChatRequest) -> Result<ToolMode, LlmError> {
        if !request.tools.is_empty() {
            for (i, tool) in request.tools.iter().enumerate() {
                if !self.repair.is_valid_name(&tool.name) {
                    return Err(LlmError::InvalidRequest(format!("invalid tool name '{}'", tool.name)));
                }
                if request.tools[..i].iter().any(|t| t.name == tool.name) {
                    return Err(LlmError::InvalidRequest(format!("duplicate tool name '{}'", tool.name)));
                }
            }
            return Ok(ToolMode::Client(request.tools.clone()));
        }

        if self.builtin_active() {
            return Ok(ToolMode::Builtin(self.executor.definitions()));
        }

        Ok(ToolMode::None)
    }

    /// Bounded conversation with placeholders rewritten, and the system prompt
    fn prepare(&self, request: &ChatRequest) -> (ConversationState, Option<String>) {
        let mut found = Vec::new();
        let messages = request.messages.iter().map(|message| {
            if message.role == Role::User {
                Message {
                    content: self.placeholders.rewrite(&message.content, &mut found),
                    ..message.clone()
                }
            } else {
                message.clone()
            }
        });
        let conversation = ConversationState::from_messages(messages.collect::<Vec<_>>(), self.max_history);

        if conversation.evicted() > 0 {
            tracing::debug!(evicted = conversation.evicted(), "trimmed conversation history");
        }

        let system = prompt::system(request.system.as_deref(), placeholder::system_note(&found));
        (conversation, system)
    }

    fn backend_request(
        &self,
        request: &ChatRequest,
        capability: &ModelCapability,
        prompt: String,
        system: Option<String>,
    ) -> BackendRequest {
        BackendRequest {
            model: capability.model_id.clone(),
            backend_type: capability.backend_type,
            prompt,
            system,
            max_tokens: capability.clamp_max_tokens(request.max_tokens),
            temperature: request.temperature,
            stop: request.stop.clone(),
        }
    }

    async fn call_backend(&self, request: &BackendRequest, turn: u32) -> Result<Value, LlmError> {
        let start = Instant::now();
        let backend = request.backend_type.as_str();

        let outcome = tokio::time::timeout(self.backend_timeout, self.backend.complete(request))
            .await
            .unwrap_or(Err(BackendError::Timeout {
                after: self.backend_timeout,
            }));

        match &outcome {
            Ok(_) => {
                self.metrics.record_backend_call(backend, start, "success");
                tracing::debug!(
                    backend,
                    turn,
                    duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "backend call finished"
                );
            }
            Err(e) => {
                self.metrics.record_backend_call(backend, start, e.outcome());
                tracing::error!(backend, turn, error = %e, "backend call failed");
            }
        }

        Ok(outcome?)
    }
}
