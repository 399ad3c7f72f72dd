//! Conversion from Anthropic wire requests to the canonical request

use crate::error::LlmError;
use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicCountTokensRequest, AnthropicMessage, AnthropicRequest,
    AnthropicSystem, AnthropicTool, AnthropicToolResultContent,
};
use crate::types::{ChatRequest, Message, Role, ToolCall, ToolDefinition};

impl TryFrom<AnthropicRequest> for ChatRequest {
    type Error = LlmError;

    fn try_from(req: AnthropicRequest) -> Result<Self, Self::Error> {
        if req.messages.is_empty() {
            return Err(LlmError::InvalidRequest("messages must not be empty".to_owned()));
        }

        Ok(Self {
            model: req.model,
            system: req.system.and_then(system_text),
            messages: req.messages.into_iter().flat_map(anthropic_message_to_internal).collect(),
            tools: req.tools.unwrap_or_default().into_iter().map(Into::into).collect(),
            max_tokens: Some(req.max_tokens),
            temperature: req.temperature,
            stop: req.stop_sequences.unwrap_or_default(),
            stream: req.stream.unwrap_or(false),
            include_usage: false,
        })
    }
}

impl From<AnthropicCountTokensRequest> for ChatRequest {
    fn from(req: AnthropicCountTokensRequest) -> Self {
        Self {
            model: req.model,
            system: req.system.and_then(system_text),
            messages: req.messages.into_iter().flat_map(anthropic_message_to_internal).collect(),
            tools: req.tools.unwrap_or_default().into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl From<AnthropicTool> for ToolDefinition {
    fn from(tool: AnthropicTool) -> Self {
        Self {
            name: tool.name,
            description: tool.description,
            parameters: super::schema_or_empty(tool.input_schema),
        }
    }
}

fn system_text(system: AnthropicSystem) -> Option<String> {
    match system {
        AnthropicSystem::Text(text) => super::join_system(vec![text]),
        AnthropicSystem::Blocks(blocks) => super::join_system(blocks.into_iter().filter_map(block_text).collect()),
    }
}

fn block_text(block: AnthropicContentBlock) -> Option<String> {
    match block {
        AnthropicContentBlock::Text { text } => Some(text),
        _ => None,
    }
}

/// Convert one Anthropic message
///
/// A user message carrying `tool_result` blocks becomes one tool message
/// per result, followed by a user message for any remaining text.
fn anthropic_message_to_internal(msg: AnthropicMessage) -> Vec<Message> {
    let role = match msg.role.as_str() {
        "assistant" => Role::Assistant,
        _ => Role::User,
    };

    let blocks = match msg.content {
        AnthropicContent::Text(text) => {
            return vec![Message {
                role,
                ..Message::user(text)
            }];
        }
        AnthropicContent::Blocks(blocks) => blocks,
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    let mut results = Vec::new();

    for block in blocks {
        match block {
            AnthropicContentBlock::Text { text: t } => text.push_str(&t),
            AnthropicContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id,
                name,
                arguments: input.to_string(),
            }),
            AnthropicContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                let mut content = content.map(tool_result_text).unwrap_or_default();
                if is_error == Some(true) {
                    content = format!("error: {content}");
                }
                results.push(Message::tool_result(tool_use_id, None, content));
            }
            AnthropicContentBlock::Other => {}
        }
    }

    if !tool_calls.is_empty() {
        results.push(Message::assistant_tool_calls(Some(text), tool_calls));
    } else if !text.is_empty() || results.is_empty() {
        results.push(Message {
            role,
            ..Message::user(text)
        });
    }

    results
}

fn tool_result_text(content: AnthropicToolResultContent) -> String {
    match content {
        AnthropicToolResultContent::Text(text) => text,
        AnthropicToolResultContent::Blocks(blocks) => blocks.into_iter().filter_map(block_text).collect(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(body: serde_json::Value) -> ChatRequest {
        ChatRequest::try_from(serde_json::from_value::<AnthropicRequest>(body).unwrap()).unwrap()
    }

    #[test]
    fn system_blocks_are_joined() {
        let req = request(json!({
            "model": "claude-3-5-sonnet",
            "max_tokens": 100,
            "system": [{"type": "text", "text": "One."}, {"type": "text", "text": "Two."}],
            "messages": [{"role": "user", "content": "hi"}]
        }));

        assert_eq!(req.system.as_deref(), Some("One.\n\nTwo."));
        assert_eq!(req.max_tokens, Some(100));
    }

    #[test]
    fn tool_round_trip_messages() {
        let req = request(json!({
            "model": "m",
            "max_tokens": 100,
            "messages": [
                {"role": "user", "content": "what is rust?"},
                {"role": "assistant", "content": [
                    {"type": "text", "text": "Looking it up."},
                    {"type": "tool_use", "id": "toolu_1", "name": "lookup", "input": {"query": "rust"}}
                ]},
                {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "toolu_1", "content": [{"type": "text", "text": "a language"}]}
                ]}
            ]
        }));

        assert_eq!(req.messages.len(), 3);
        assert_eq!(req.messages[1].tool_calls[0].arguments, r#"{"query":"rust"}"#);
        assert_eq!(req.messages[2], Message::tool_result("toolu_1", None, "a language"));
    }

    #[test]
    fn unknown_blocks_are_skipped() {
        let req = request(json!({
            "model": "m",
            "max_tokens": 10,
            "messages": [{"role": "user", "content": [
                {"type": "image", "source": {"type": "base64", "data": "AAAA"}},
                {"type": "text", "text": "describe"}
            ]}]
        }));

        assert_eq!(req.messages, vec![Message::user("describe")]);
    }

    #[test]
    fn tools_default_to_empty_schema() {
        let req = request(json!({
            "model": "m",
            "max_tokens": 10,
            "messages": [{"role": "user", "content": "x"}],
            "tools": [{"name": "calculate"}]
        }));

        assert_eq!(req.tools[0].parameters["type"], "object");
    }
}
