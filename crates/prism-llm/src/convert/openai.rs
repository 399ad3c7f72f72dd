//! Conversion from `OpenAI` wire requests to the canonical request

use crate::error::LlmError;
use crate::protocol::openai::{OpenAiCompletionRequest, OpenAiMessage, OpenAiRequest, OpenAiTool};
use crate::types::{ChatRequest, Message, Role, ToolCall, ToolDefinition};

impl TryFrom<OpenAiRequest> for ChatRequest {
    type Error = LlmError;

    fn try_from(req: OpenAiRequest) -> Result<Self, Self::Error> {
        if req.messages.is_empty() {
            return Err(LlmError::InvalidRequest("messages must not be empty".to_owned()));
        }

        let mut system = Vec::new();
        let mut messages = Vec::with_capacity(req.messages.len());

        for msg in req.messages {
            match msg.role.as_str() {
                "system" | "developer" => {
                    system.push(msg.content.map(|c| c.into_text()).unwrap_or_default());
                }
                _ => messages.push(openai_message_to_internal(msg)?),
            }
        }

        let tools = req
            .tools
            .unwrap_or_default()
            .into_iter()
            .map(ToolDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model: req.model,
            system: super::join_system(system),
            messages,
            tools,
            max_tokens: req.max_completion_tokens.or(req.max_tokens),
            temperature: req.temperature,
            stop: req.stop.map(|s| s.into_vec()).unwrap_or_default(),
            stream: req.stream.unwrap_or(false),
            include_usage: req.stream_options.is_some_and(|o| o.include_usage),
        })
    }
}

impl TryFrom<OpenAiCompletionRequest> for ChatRequest {
    type Error = LlmError;

    fn try_from(req: OpenAiCompletionRequest) -> Result<Self, Self::Error> {
        let prompt = req.prompt.into_vec().join("\n");
        if prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest("prompt must not be empty".to_owned()));
        }

        Ok(Self {
            model: req.model,
            system: None,
            messages: vec![Message::user(prompt)],
            tools: Vec::new(),
            max_tokens: req.max_tokens,
            temperature: req.temperature,
            stop: req.stop.map(|s| s.into_vec()).unwrap_or_default(),
            stream: req.stream.unwrap_or(false),
            include_usage: req.stream_options.is_some_and(|o| o.include_usage),
        })
    }
}

impl TryFrom<OpenAiTool> for ToolDefinition {
    type Error = LlmError;

    fn try_from(tool: OpenAiTool) -> Result<Self, Self::Error> {
        let (name, description, parameters) = match tool.function {
            Some(function) => (Some(function.name), function.description, function.parameters),
            None => (tool.name, tool.description, tool.parameters),
        };

        let name = name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidRequest("every tool needs a name".to_owned()))?;

        Ok(Self {
            name,
            description,
            parameters: super::schema_or_empty(parameters),
        })
    }
}

fn openai_message_to_internal(msg: OpenAiMessage) -> Result<Message, LlmError> {
    let role = match msg.role.as_str() {
        "user" => Role::User,
        "assistant" => Role::Assistant,
        "tool" | "function" => Role::Tool,
        other => return Err(LlmError::InvalidRequest(format!("unsupported message role: {other}"))),
    };

    let tool_calls = msg
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();

    Ok(Message {
        role,
        content: msg.content.map(|c| c.into_text()).unwrap_or_default(),
        tool_calls,
        tool_call_id: msg.tool_call_id,
        name: msg.name,
    })
}
