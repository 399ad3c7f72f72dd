use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use indexmap::IndexMap;
use prism_config::ToolsConfig;
use serde_json::{Map, Value};

use super::builtin::{Calculate, CurrentTime, HttpGet, Lookup, ReadFile, RunCommand};
use super::{Tool, ToolError, ValidationError, schema};
use crate::types::{ToolCall, ToolDefinition};

/// Registry of named tools with a shared per-call timeout
pub struct ToolExecutor {
    tools: IndexMap<&'static str, Arc<dyn Tool>>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tools: IndexMap::new(),
            timeout,
        }
    }

    /// Build the built-in registry
    ///
    /// Dangerous tools are left out entirely unless `allow_dangerous` is
    /// set, so they cannot be resolved by name.
    pub fn from_config(config: &ToolsConfig) -> Self {
        let mut executor = Self::new(config.timeout);

        executor.register(Arc::new(Calculate));
        executor.register(Arc::new(Lookup::new(config.lookup.clone())));
        executor.register(Arc::new(CurrentTime));

        if config.allow_dangerous {
            if let Some(root) = &config.sandbox_root {
                executor.register(Arc::new(ReadFile::new(root.clone())));
            }
            executor.register(Arc::new(HttpGet::new()));
            executor.register(Arc::new(RunCommand::new(config.allowed_commands.clone())));
        }

        tracing::info!(
            tools = ?executor.tools.keys().collect::<Vec<_>>(),
            allow_dangerous = config.allow_dangerous,
            "tool registry ready"
        );

        executor
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions advertised to the model, in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Run one call
    pub async fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(call.name.as_str())
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        let args = parse_arguments(&call.arguments)?;
        let args = schema::remap_aliases(args, tool.aliases());
        schema::validate(tool.params(), &args)?;

        tokio::time::timeout(self.timeout, tool.execute(args))
            .await
            .map_err(|_| ToolError::Timeout(self.timeout))?
    }

    /// Run a batch concurrently
    ///
    /// Results come back in call order. One call failing does not affect
    /// the others.
    pub async fn execute_batch(&self, calls: &[ToolCall]) -> Vec<Result<Value, ToolError>> {
        join_all(calls.iter().map(|call| async move {
            let start = Instant::now();
            let result = self.dispatch(call).await;
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(_) => tracing::debug!(tool = %call.name, tool_call_id = %call.id, duration_ms, "tool call succeeded"),
                Err(e) => tracing::warn!(
                    tool = %call.name,
                    tool_call_id = %call.id,
                    duration_ms,
                    error = %e,
                    "tool call failed"
                ),
            }

            result
        }))
        .await
    }
}

fn parse_arguments(arguments: &str) -> Result<Map<String, Value>, ToolError> {
    if arguments.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str(arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::NotAnObject.into()),
        Err(e) => Err(ToolError::InvalidArguments(e.to_string())),
    }
}
