use crate::ids::ResponseMeta;
use crate::protocol::openai::{
    OpenAiChoice, OpenAiChoiceMessage, OpenAiCompletionChoice, OpenAiCompletionResponse, OpenAiFunctionCall,
    OpenAiResponse, OpenAiToolCall, OpenAiUsage,
};
use crate::types::{NormalizedResult, ToolCall, Usage};

/// `OpenAI` chat completion envelope
pub fn chat_completion(result: &NormalizedResult, meta: &ResponseMeta) -> OpenAiResponse {
    let tool_calls = (!result.tool_calls.is_empty()).then(|| result.tool_calls.iter().map(tool_call).collect());

    OpenAiResponse {
        id: meta.id.clone(),
        object: "chat.completion",
        created: meta.created,
        model: meta.model.clone(),
        choices: vec![OpenAiChoice {
            index: 0,
            message: OpenAiChoiceMessage {
                role: "assistant",
                content: result.visible_text().map(str::to_owned),
                tool_calls,
            },
            finish_reason: result.stop_reason.openai(),
        }],
        usage: usage(&result.usage),
    }
}

/// `OpenAI` legacy text completion envelope
pub fn text_completion(result: &NormalizedResult, meta: &ResponseMeta) -> OpenAiCompletionResponse {
    OpenAiCompletionResponse {
        id: meta.id.clone(),
        object: "text_completion",
        created: meta.created,
        model: meta.model.clone(),
        choices: vec![OpenAiCompletionChoice {
            text: result.visible_text().unwrap_or_default().to_owned(),
            index: 0,
            finish_reason: Some(result.stop_reason.openai()),
        }],
        usage: Some(usage(&result.usage)),
    }
}

pub fn tool_call(call: &ToolCall) -> OpenAiToolCall {
    OpenAiToolCall {
        id: call.id.clone(),
        tool_type: "function".to_owned(),
        function: OpenAiFunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    }
}

pub const fn usage(usage: &Usage) -> OpenAiUsage {
    OpenAiUsage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    }
}
