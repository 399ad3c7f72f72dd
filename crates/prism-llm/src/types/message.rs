use super::tool::ToolCall;

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
    /// Tool result
    Tool,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Text content, with non-text parts already dropped
    pub content: String,
    /// Tool calls made by the assistant
    pub tool_calls: Vec<ToolCall>,
    /// ID of the tool call this message answers
    pub tool_call_id: Option<String>,
    /// Tool name, on tool results
    pub name: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Assistant turn that requested tool calls
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content.unwrap_or_default())
        }
    }

    /// Result of one tool call
    pub fn tool_result(call_id: impl Into<String>, name: Option<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            name,
            ..Self::new(Role::Tool, content)
        }
    }
}
