use super::message::Message;
use super::tool::ToolDefinition;

/// Canonical chat request, independent of the client protocol
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Model identifier as sent by the client
    pub model: String,
    /// System instructions, kept outside the bounded history
    pub system: Option<String>,
    /// Conversation messages, oldest first
    pub messages: Vec<Message>,
    /// Tools declared by the client
    pub tools: Vec<ToolDefinition>,
    /// Requested output token cap
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// Stop sequences
    pub stop: Vec<String>,
    /// Whether the client asked for a streamed response
    pub stream: bool,
    /// Whether the client asked for a trailing usage chunk
    pub include_usage: bool,
}
