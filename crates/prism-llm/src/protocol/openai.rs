//! `OpenAI` chat and legacy completion API wire format types

use serde::{Deserialize, Serialize};

// -- Request types --

/// `OpenAI` chat completion request
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OpenAiMessage>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Newer spelling of `max_tokens`
    #[serde(default)]
    pub max_completion_tokens: Option<u32>,
    /// Stop sequences
    #[serde(default)]
    pub stop: Option<OneOrMany>,
    /// Whether to stream the response
    #[serde(default)]
    pub stream: Option<bool>,
    /// Tool definitions
    #[serde(default)]
    pub tools: Option<Vec<OpenAiTool>>,
    /// Stream options (e.g. `include_usage`)
    #[serde(default)]
    pub stream_options: Option<OpenAiStreamOptions>,
}

/// `OpenAI` legacy text completion request
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Prompt text, or several prompts joined in order
    pub prompt: OneOrMany,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Stop sequences
    #[serde(default)]
    pub stop: Option<OneOrMany>,
    /// Whether to stream the response
    #[serde(default)]
    pub stream: Option<bool>,
    /// Stream options (e.g. `include_usage`)
    #[serde(default)]
    pub stream_options: Option<OpenAiStreamOptions>,
}

/// A string or an array of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// `OpenAI` stream options
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiStreamOptions {
    /// Include usage statistics in stream
    #[serde(default)]
    pub include_usage: bool,
}

/// `OpenAI` message within a request
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiMessage {
    /// Message role
    pub role: String,
    /// Content (string or array of content parts)
    #[serde(default)]
    pub content: Option<OpenAiContent>,
    /// Participant name
    #[serde(default)]
    pub name: Option<String>,
    /// Tool calls made by the assistant
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
    /// Tool call ID this message responds to
    #[serde(default)]
    pub tool_call_id: Option<String>,
}

/// `OpenAI` content can be a string or array of content parts
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OpenAiContent {
    /// Plain text content
    Text(String),
    /// Array of content parts; only `text` parts are kept
    Parts(Vec<OpenAiContentPart>),
}

impl OpenAiContent {
    /// Text content, joining text parts
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Parts(parts) => parts.into_iter().filter_map(|p| p.text).collect(),
        }
    }
}

/// Individual content part in an `OpenAI` message
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiContentPart {
    /// Part type (e.g. `text`, `image_url`)
    #[serde(rename = "type")]
    pub part_type: String,
    /// Text, on `text` parts
    #[serde(default)]
    pub text: Option<String>,
}

/// `OpenAI` tool definition
///
/// Accepts the wrapped `{type, function: {...}}` form as well as a flat
/// `{name, description, parameters}` record.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiTool {
    /// Tool type (always "function")
    #[serde(rename = "type", default)]
    pub tool_type: Option<String>,
    /// Function specification
    #[serde(default)]
    pub function: Option<OpenAiFunction>,
    /// Flat-form function name
    #[serde(default)]
    pub name: Option<String>,
    /// Flat-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Flat-form parameter schema
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

/// `OpenAI` function specification
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiFunction {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema for parameters
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

/// `OpenAI` tool call within a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiToolCall {
    /// Unique tool call identifier
    pub id: String,
    /// Tool type (always "function")
    #[serde(rename = "type", default = "function_type")]
    pub tool_type: String,
    /// Function call details
    pub function: OpenAiFunctionCall,
}

/// Function call details within an `OpenAI` tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiFunctionCall {
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_owned()
}

// -- Response types --

/// `OpenAI` chat completion response
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiResponse {
    /// Response identifier
    pub id: String,
    /// Object type
    pub object: &'static str,
    /// Creation timestamp
    pub created: u64,
    /// Model used
    pub model: String,
    /// Generated choices
    pub choices: Vec<OpenAiChoice>,
    /// Token usage
    pub usage: OpenAiUsage,
}

/// Choice within an `OpenAI` response
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiChoice {
    /// Choice index
    pub index: u32,
    /// Generated message
    pub message: OpenAiChoiceMessage,
    /// Why generation stopped
    pub finish_reason: &'static str,
}

/// Message within an `OpenAI` response choice
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiChoiceMessage {
    /// Role (always "assistant")
    pub role: &'static str,
    /// Text content, `null` on pure tool-call turns
    pub content: Option<String>,
    /// Tool calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
}

/// `OpenAI` legacy text completion response
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiCompletionResponse {
    /// Response identifier
    pub id: String,
    /// Object type (always "`text_completion`")
    pub object: &'static str,
    /// Creation timestamp
    pub created: u64,
    /// Model used
    pub model: String,
    /// Generated choices
    pub choices: Vec<OpenAiCompletionChoice>,
    /// Token usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAiUsage>,
}

/// Choice within a legacy completion response or chunk
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiCompletionChoice {
    /// Generated text
    pub text: String,
    /// Choice index
    pub index: u32,
    /// Why generation stopped, `null` until the final chunk
    pub finish_reason: Option<&'static str>,
}

/// Token usage in an `OpenAI` response
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

// -- Streaming types --

/// `OpenAI` streaming chunk
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiStreamChunk {
    /// Chunk identifier
    pub id: String,
    /// Object type (always "chat.completion.chunk")
    pub object: &'static str,
    /// Creation timestamp
    pub created: u64,
    /// Model used
    pub model: String,
    /// Delta choices
    pub choices: Vec<OpenAiStreamChoice>,
    /// Usage (trailing chunk only, when `stream_options.include_usage` is true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAiUsage>,
}

/// Choice within a streaming chunk
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiStreamChoice {
    /// Choice index
    pub index: u32,
    /// Incremental delta
    pub delta: OpenAiStreamDelta,
    /// Finish reason (present on final chunk)
    pub finish_reason: Option<&'static str>,
}

/// Delta content within a streaming choice
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpenAiStreamDelta {
    /// Role (present on first chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    /// Incremental text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Incremental tool calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiStreamToolCall>>,
}

/// Tool call within a streaming delta
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiStreamToolCall {
    /// Index within the `tool_calls` array
    pub index: u32,
    /// Tool call ID (first chunk only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool type (first chunk only)
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub tool_type: Option<&'static str>,
    /// Partial function call
    pub function: OpenAiStreamFunctionCall,
}

/// Partial function call within a streaming tool call
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiStreamFunctionCall {
    /// Function name (first chunk only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Incremental arguments fragment
    pub arguments: String,
}

/// `OpenAI` legacy completion streaming chunk
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiCompletionChunk {
    /// Chunk identifier
    pub id: String,
    /// Object type (always "`text_completion`")
    pub object: &'static str,
    /// Creation timestamp
    pub created: u64,
    /// Model used
    pub model: String,
    /// Delta choices
    pub choices: Vec<OpenAiCompletionChoice>,
    /// Usage (trailing chunk only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAiUsage>,
}

// -- Models list types --

/// `OpenAI` models list response
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiModelList {
    /// Object type
    pub object: &'static str,
    /// List of models
    pub data: Vec<OpenAiModel>,
}

/// `OpenAI` model entry
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiModel {
    /// Model identifier
    pub id: String,
    /// Object type (always "model")
    pub object: &'static str,
    /// Creation timestamp
    pub created: u64,
    /// Owner, the backend family serving the model
    pub owned_by: &'static str,
}
