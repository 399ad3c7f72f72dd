use serde::{Deserialize, Serialize};

/// A tool the model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, matching `^[A-Za-z][A-Za-z0-9_-]*$`
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the arguments object
    pub parameters: serde_json::Value,
}

/// A well-formed tool call
///
/// Only produced by the repair pass, so `name` is valid, `id` is unique
/// within its response and `arguments` is a serialized JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// JSON-encoded arguments object
    pub arguments: String,
}
