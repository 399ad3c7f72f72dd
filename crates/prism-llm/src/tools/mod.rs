//! Tool executor
//!
//! A static registry of named tools with declared parameters. Dispatch
//! remaps parameter aliases, validates the arguments and runs the tool
//! under a per-call timeout. Failures are data: the orchestrator folds
//! them back into the conversation so the model can react.

pub mod builtin;
mod executor;
mod schema;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use executor::ToolExecutor;
pub use schema::{Param, ParamKind, ValidationError};

use crate::types::ToolDefinition;

/// What a tool is allowed to touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    /// Pure computation
    Safe,
    /// Reads the local filesystem
    FileSystem,
    /// Makes outbound network requests
    Network,
    /// Spawns processes
    Process,
}

impl ToolCategory {
    /// Dangerous tools are only registered when explicitly allowed
    pub const fn is_dangerous(self) -> bool {
        !matches!(self, Self::Safe)
    }
}

/// A function the engine can run on the model's behalf
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn category(&self) -> ToolCategory;

    /// Declared parameters
    fn params(&self) -> &'static [Param];

    /// `(alias, canonical)` parameter names accepted from models
    fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Run with validated, alias-remapped arguments
    async fn execute(&self, args: Map<String, Value>) -> Result<Value, ToolError>;

    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_owned(),
            description: Some(self.description().to_owned()),
            parameters: schema::schema(self.params()),
        }
    }
}

/// Why a tool call produced no result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// No tool with that name is registered
    #[error("unknown tool: {0}")]
    NotFound(String),

    /// Arguments were not parseable JSON
    #[error("arguments are not valid JSON: {0}")]
    InvalidArguments(String),

    /// Arguments did not match the declared parameters
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The tool ran and failed
    #[error("{0}")]
    Execution(String),

    /// The tool exceeded the per-call timeout
    #[error("tool timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ToolError {
    /// Short label used in logs and metric attributes
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidArguments(_) | Self::Validation(_) => "invalid_arguments",
            Self::Execution(_) => "error",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Text handed back to the model for one finished call
pub fn result_text(result: &Result<Value, ToolError>) -> String {
    match result {
        Ok(Value::String(text)) => text.clone(),
        Ok(value) => value.to_string(),
        Err(error) => format!("error: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn results_render_for_the_model() {
        assert_eq!(result_text(&Ok(json!("4"))), "4");
        assert_eq!(result_text(&Ok(json!({"a": 1}))), r#"{"a":1}"#);
        assert_eq!(
            result_text(&Err(ToolError::Validation(ValidationError::MissingRequired {
                name: "query"
            }))),
            "error: missing required parameter 'query'"
        );
    }

    #[test]
    fn only_safe_tools_are_harmless() {
        assert!(!ToolCategory::Safe.is_dangerous());
        assert!(ToolCategory::FileSystem.is_dangerous());
        assert!(ToolCategory::Network.is_dangerous());
        assert!(ToolCategory::Process.is_dangerous());
    }
}
