use super::arguments_value;
use crate::ids::ResponseMeta;
use crate::protocol::anthropic::{AnthropicResponse, AnthropicResponseBlock, AnthropicUsage};
use crate::types::{NormalizedResult, Usage};

/// Anthropic message envelope
pub fn message(result: &NormalizedResult, meta: &ResponseMeta) -> AnthropicResponse {
    let text = result
        .visible_text()
        .map(|text| AnthropicResponseBlock::Text { text: text.to_owned() });

    let tool_uses = result.tool_calls.iter().map(|call| AnthropicResponseBlock::ToolUse {
        id: call.id.clone(),
        name: call.name.clone(),
        input: arguments_value(call),
    });

    AnthropicResponse {
        id: meta.id.clone(),
        response_type: "message",
        role: "assistant",
        content: text.into_iter().chain(tool_uses).collect(),
        model: meta.model.clone(),
        stop_reason: result.stop_reason.anthropic(result.stop_sequence.is_some()),
        stop_sequence: result.stop_sequence.clone(),
        usage: usage(&result.usage),
    }
}

pub const fn usage(usage: &Usage) -> AnthropicUsage {
    AnthropicUsage {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{FinishSignal, ToolCall};

    fn meta() -> ResponseMeta {
        ResponseMeta {
            id: "msg_1".to_owned(),
            created: 0,
            model: "claude-3-5-sonnet".to_owned(),
        }
    }

    #[test]
    fn text_message() {
        let result = NormalizedResult::new(
            Some("hello".to_owned()),
            Usage::reported(5, 2),
            Vec::new(),
            FinishSignal::default(),
        );

        let json = serde_json::to_value(message(&result, &meta())).unwrap();
        assert_eq!(
            json,
            json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "hello"}],
                "model": "claude-3-5-sonnet",
                "stop_reason": "end_turn",
                "stop_sequence": null,
                "usage": {"input_tokens": 5, "output_tokens": 2}
            })
        );
    }

    #[test]
    fn text_and_tool_use_blocks() {
        let call = ToolCall {
            id: "toolu_1".to_owned(),
            name: "lookup".to_owned(),
            arguments: r#"{"query":"rust"}"#.to_owned(),
        };
        let result = NormalizedResult::new(
            Some("Checking.".to_owned()),
            Usage::default(),
            vec![call],
            FinishSignal::default(),
        );

        let json = serde_json::to_value(message(&result, &meta())).unwrap();

        assert_eq!(json["stop_reason"], "tool_use");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1], json!({"type": "tool_use", "id": "toolu_1", "name": "lookup", "input": {"query": "rust"}}));
    }

    #[test]
    fn stop_sequence_is_reported() {
        let result = NormalizedResult::new(
            Some("done".to_owned()),
            Usage::default(),
            Vec::new(),
            FinishSignal {
                stop_sequence: Some("###".to_owned()),
                ..FinishSignal::default()
            },
        );

        let response = message(&result, &meta());
        assert_eq!(response.stop_reason, "stop_sequence");
        assert_eq!(response.stop_sequence.as_deref(), Some("###"));
    }
}
