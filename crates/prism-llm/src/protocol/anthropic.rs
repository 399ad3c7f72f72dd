//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};

// -- Request types --

/// Anthropic messages API request
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicRequest {
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate (required by Anthropic)
    pub max_tokens: u32,
    /// System prompt (top-level, not in messages)
    #[serde(default)]
    pub system: Option<AnthropicSystem>,
    /// Conversation messages
    pub messages: Vec<AnthropicMessage>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Option<Vec<String>>,
    /// Whether to stream the response
    #[serde(default)]
    pub stream: Option<bool>,
    /// Tool definitions
    #[serde(default)]
    pub tools: Option<Vec<AnthropicTool>>,
}

/// Anthropic token counting request
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicCountTokensRequest {
    /// Model identifier
    pub model: String,
    /// System prompt
    #[serde(default)]
    pub system: Option<AnthropicSystem>,
    /// Conversation messages
    pub messages: Vec<AnthropicMessage>,
    /// Tool definitions
    #[serde(default)]
    pub tools: Option<Vec<AnthropicTool>>,
}

/// System prompt as a string or an array of text blocks
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnthropicSystem {
    /// Plain text
    Text(String),
    /// Text blocks, joined with blank lines
    Blocks(Vec<AnthropicContentBlock>),
}

/// Anthropic message
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicMessage {
    /// Role ("user" or "assistant")
    pub role: String,
    /// Content blocks
    pub content: AnthropicContent,
}

/// Anthropic content can be a string or array of content blocks
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    /// Plain text (shorthand)
    Text(String),
    /// Array of content blocks
    Blocks(Vec<AnthropicContentBlock>),
}

/// Content block in an Anthropic message
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    /// Text content
    Text {
        /// The text string
        text: String,
    },
    /// Tool use request from the assistant
    ToolUse {
        /// Tool use identifier
        id: String,
        /// Tool name
        name: String,
        /// Tool input as JSON
        input: serde_json::Value,
    },
    /// Tool result from the user
    ToolResult {
        /// Tool use ID this result responds to
        tool_use_id: String,
        /// Result content
        #[serde(default)]
        content: Option<AnthropicToolResultContent>,
        /// Whether the tool call errored
        #[serde(default)]
        is_error: Option<bool>,
    },
    /// Images, documents and anything else without text
    #[serde(other)]
    Other,
}

/// Tool result content as a string or nested text blocks
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnthropicToolResultContent {
    /// Plain text
    Text(String),
    /// Content blocks
    Blocks(Vec<AnthropicContentBlock>),
}

/// Anthropic tool definition
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicTool {
    /// Tool name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema for input parameters
    #[serde(default)]
    pub input_schema: Option<serde_json::Value>,
}

// -- Response types --

/// Anthropic messages API response
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicResponse {
    /// Response identifier
    pub id: String,
    /// Object type (always "message")
    #[serde(rename = "type")]
    pub response_type: &'static str,
    /// Role (always "assistant")
    pub role: &'static str,
    /// Response content blocks
    pub content: Vec<AnthropicResponseBlock>,
    /// Model used
    pub model: String,
    /// Stop reason
    pub stop_reason: &'static str,
    /// Stop sequence that triggered the stop
    pub stop_sequence: Option<String>,
    /// Token usage
    pub usage: AnthropicUsage,
}

/// Content block in an Anthropic response
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    /// Text response
    Text {
        /// The text string
        text: String,
    },
    /// Tool use request
    ToolUse {
        /// Tool use identifier
        id: String,
        /// Tool name
        name: String,
        /// Tool input as JSON
        input: serde_json::Value,
    },
}

/// Anthropic token usage
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicUsage {
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
}

/// Anthropic token counting response
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicCountTokensResponse {
    /// Tokens the request would consume as input
    pub input_tokens: u32,
}

// -- Streaming types --

/// Anthropic SSE event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamEvent {
    /// Stream started
    MessageStart {
        /// Partial message with metadata
        message: AnthropicStreamMessage,
    },
    /// New content block started
    ContentBlockStart {
        /// Block index
        index: u32,
        /// Initial block content
        content_block: AnthropicResponseBlock,
    },
    /// Incremental content within a block
    ContentBlockDelta {
        /// Block index
        index: u32,
        /// Delta content
        delta: AnthropicStreamDelta,
    },
    /// Content block finished
    ContentBlockStop {
        /// Block index
        index: u32,
    },
    /// Message metadata delta (stop reason, usage)
    MessageDelta {
        /// Delta with stop reason
        delta: AnthropicMessageDelta,
        /// Final usage
        usage: AnthropicUsage,
    },
    /// Stream completed
    MessageStop,
}

/// Partial message in a `message_start` event
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicStreamMessage {
    /// Response identifier
    pub id: String,
    /// Object type
    #[serde(rename = "type")]
    pub message_type: &'static str,
    /// Role
    pub role: &'static str,
    /// Always empty at start
    pub content: Vec<AnthropicResponseBlock>,
    /// Model
    pub model: String,
    /// Always `null` at start
    pub stop_reason: Option<&'static str>,
    /// Always `null` at start
    pub stop_sequence: Option<String>,
    /// Initial usage
    pub usage: AnthropicUsage,
}

/// Delta content in a `content_block_delta` event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicStreamDelta {
    /// Incremental text
    TextDelta {
        /// Text fragment
        text: String,
    },
    /// Incremental tool input JSON
    InputJsonDelta {
        /// JSON fragment
        partial_json: String,
    },
}

/// Delta in a `message_delta` event
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessageDelta {
    /// Stop reason
    pub stop_reason: &'static str,
    /// Stop sequence
    pub stop_sequence: Option<String>,
}

// -- Models list types --

/// Anthropic models list response
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicModelList {
    /// Models, in registration order
    pub data: Vec<AnthropicModel>,
    /// Always false, the list is not paginated
    pub has_more: bool,
    /// First model id
    pub first_id: Option<String>,
    /// Last model id
    pub last_id: Option<String>,
}

/// Anthropic model entry
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicModel {
    /// Object type (always "model")
    #[serde(rename = "type")]
    pub model_type: &'static str,
    /// Model identifier
    pub id: String,
    /// Display name
    pub display_name: String,
    /// RFC 3339 creation time
    pub created_at: String,
}
