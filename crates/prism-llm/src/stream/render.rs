//! Per-protocol rendering of canonical stream events into SSE frames

use serde::Serialize;

use crate::format;
use crate::ids::ResponseMeta;
use crate::protocol::Protocol;
use crate::protocol::anthropic::{
    AnthropicMessageDelta, AnthropicResponseBlock, AnthropicStreamDelta, AnthropicStreamEvent, AnthropicStreamMessage,
    AnthropicUsage,
};
use crate::protocol::openai::{
    OpenAiCompletionChoice, OpenAiCompletionChunk, OpenAiStreamChoice, OpenAiStreamChunk, OpenAiStreamDelta,
    OpenAiStreamFunctionCall, OpenAiStreamToolCall,
};
use crate::types::{BlockDelta, BlockKind, StreamEvent};

/// One server-sent event, independent of the HTTP framework
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A data event, optionally named
    Data { event: Option<&'static str>, data: String },
    /// An empty comment line, used for heartbeats
    Comment,
}

impl SseFrame {
    fn json(event: Option<&'static str>, payload: &impl Serialize) -> Self {
        Self::Data {
            event,
            data: serde_json::to_string(payload).unwrap_or_default(),
        }
    }
}

/// Renders canonical events for one client protocol
pub trait EventRenderer: Send {
    fn render(&mut self, event: StreamEvent) -> Vec<SseFrame>;
}

impl Protocol {
    /// Renderer for a stream answering `meta`
    pub fn renderer(self, meta: ResponseMeta, include_usage: bool) -> Box<dyn EventRenderer> {
        match self {
            Self::OpenAiChat => Box::new(OpenAiChatRenderer::new(meta, include_usage)),
            Self::OpenAiCompletion => Box::new(OpenAiCompletionRenderer { meta, include_usage }),
            Self::Anthropic => Box::new(AnthropicRenderer { meta }),
        }
    }
}

/// `chat.completion.chunk` frames terminated by `[DONE]`
pub struct OpenAiChatRenderer {
    meta: ResponseMeta,
    include_usage: bool,
    text_block: Option<u32>,
    tool_blocks: Vec<u32>,
}

impl OpenAiChatRenderer {
    pub const fn new(meta: ResponseMeta, include_usage: bool) -> Self {
        Self {
            meta,
            include_usage,
            text_block: None,
            tool_blocks: Vec::new(),
        }
    }

    fn chunk(&self, delta: OpenAiStreamDelta, finish_reason: Option<&'static str>) -> SseFrame {
        SseFrame::json(
            None,
            &OpenAiStreamChunk {
                id: self.meta.id.clone(),
                object: "chat.completion.chunk",
                created: self.meta.created,
                model: self.meta.model.clone(),
                choices: vec![OpenAiStreamChoice {
                    index: 0,
                    delta,
                    finish_reason,
                }],
                usage: None,
            },
        )
    }

    fn tool_index(&self, block: u32) -> u32 {
        let position = self.tool_blocks.iter().position(|b| *b == block).unwrap_or_default();
        u32::try_from(position).unwrap_or(u32::MAX)
    }
}

impl EventRenderer for OpenAiChatRenderer {
    fn render(&mut self, event: StreamEvent) -> Vec<SseFrame> {
        match event {
            StreamEvent::MessageStart { .. } => vec![self.chunk(
                OpenAiStreamDelta {
                    role: Some("assistant"),
                    ..OpenAiStreamDelta::default()
                },
                None,
            )],
            StreamEvent::BlockStart {
                index,
                kind: BlockKind::Text,
            } => {
                self.text_block = Some(index);
                Vec::new()
            }
            StreamEvent::BlockStart {
                index,
                kind: BlockKind::ToolUse { id, name },
            } => {
                self.tool_blocks.push(index);
                let call = OpenAiStreamToolCall {
                    index: self.tool_index(index),
                    id: Some(id),
                    tool_type: Some("function"),
                    function: OpenAiStreamFunctionCall {
                        name: Some(name),
                        arguments: String::new(),
                    },
                };
                vec![self.chunk(
                    OpenAiStreamDelta {
                        tool_calls: Some(vec![call]),
                        ..OpenAiStreamDelta::default()
                    },
                    None,
                )]
            }
            StreamEvent::BlockDelta {
                delta: BlockDelta::Text(text),
                ..
            } => vec![self.chunk(
                OpenAiStreamDelta {
                    content: Some(text),
                    ..OpenAiStreamDelta::default()
                },
                None,
            )],
            StreamEvent::BlockDelta {
                index,
                delta: BlockDelta::ToolArguments(arguments),
            } => {
                let call = OpenAiStreamToolCall {
                    index: self.tool_index(index),
                    id: None,
                    tool_type: None,
                    function: OpenAiStreamFunctionCall { name: None, arguments },
                };
                vec![self.chunk(
                    OpenAiStreamDelta {
                        tool_calls: Some(vec![call]),
                        ..OpenAiStreamDelta::default()
                    },
                    None,
                )]
            }
            StreamEvent::MessageDelta { stop_reason, usage, .. } => {
                let mut frames = vec![self.chunk(OpenAiStreamDelta::default(), Some(stop_reason.openai()))];
                if self.include_usage {
                    frames.push(SseFrame::json(
                        None,
                        &OpenAiStreamChunk {
                            id: self.meta.id.clone(),
                            object: "chat.completion.chunk",
                            created: self.meta.created,
                            model: self.meta.model.clone(),
                            choices: Vec::new(),
                            usage: Some(format::openai::usage(&usage)),
                        },
                    ));
                }
                frames
            }
            StreamEvent::BlockStop { .. } | StreamEvent::MessageStop => Vec::new(),
            StreamEvent::Heartbeat => vec![SseFrame::Comment],
            StreamEvent::DoneMarker => vec![done()],
            StreamEvent::Error(envelope) => vec![SseFrame::json(None, &envelope), done()],
        }
    }
}

/// `text_completion` frames terminated by `[DONE]`
pub struct OpenAiCompletionRenderer {
    meta: ResponseMeta,
    include_usage: bool,
}

impl OpenAiCompletionRenderer {
    fn chunk(&self, text: String, finish_reason: Option<&'static str>) -> OpenAiCompletionChunk {
        OpenAiCompletionChunk {
            id: self.meta.id.clone(),
            object: "text_completion",
            created: self.meta.created,
            model: self.meta.model.clone(),
            choices: vec![OpenAiCompletionChoice {
                text,
                index: 0,
                finish_reason,
            }],
            usage: None,
        }
    }
}

impl EventRenderer for OpenAiCompletionRenderer {
    fn render(&mut self, event: StreamEvent) -> Vec<SseFrame> {
        match event {
            StreamEvent::BlockDelta {
                delta: BlockDelta::Text(text),
                ..
            } => vec![SseFrame::json(None, &self.chunk(text, None))],
            StreamEvent::MessageDelta { stop_reason, usage, .. } => {
                let mut last = self.chunk(String::new(), Some(stop_reason.openai()));
                if self.include_usage {
                    last.usage = Some(format::openai::usage(&usage));
                }
                vec![SseFrame::json(None, &last)]
            }
            StreamEvent::Heartbeat => vec![SseFrame::Comment],
            StreamEvent::DoneMarker => vec![done()],
            StreamEvent::Error(envelope) => vec![SseFrame::json(None, &envelope), done()],
            _ => Vec::new(),
        }
    }
}

/// Named Anthropic events, one per canonical event
pub struct AnthropicRenderer {
    meta: ResponseMeta,
}

impl EventRenderer for AnthropicRenderer {
    fn render(&mut self, event: StreamEvent) -> Vec<SseFrame> {
        let event = match event {
            StreamEvent::MessageStart { prompt_tokens } => AnthropicStreamEvent::MessageStart {
                message: AnthropicStreamMessage {
                    id: self.meta.id.clone(),
                    message_type: "message",
                    role: "assistant",
                    content: Vec::new(),
                    model: self.meta.model.clone(),
                    stop_reason: None,
                    stop_sequence: None,
                    usage: AnthropicUsage {
                        input_tokens: prompt_tokens,
                        output_tokens: 0,
                    },
                },
            },
            StreamEvent::BlockStart { index, kind } => AnthropicStreamEvent::ContentBlockStart {
                index,
                content_block: match kind {
                    BlockKind::Text => AnthropicResponseBlock::Text { text: String::new() },
                    BlockKind::ToolUse { id, name } => AnthropicResponseBlock::ToolUse {
                        id,
                        name,
                        input: serde_json::Value::Object(serde_json::Map::new()),
                    },
                },
            },
            StreamEvent::BlockDelta { index, delta } => AnthropicStreamEvent::ContentBlockDelta {
                index,
                delta: match delta {
                    BlockDelta::Text(text) => AnthropicStreamDelta::TextDelta { text },
                    BlockDelta::ToolArguments(partial_json) => AnthropicStreamDelta::InputJsonDelta { partial_json },
                },
            },
            StreamEvent::BlockStop { index } => AnthropicStreamEvent::ContentBlockStop { index },
            StreamEvent::MessageDelta {
                stop_reason,
                stop_sequence,
                usage,
            } => AnthropicStreamEvent::MessageDelta {
                delta: AnthropicMessageDelta {
                    stop_reason: stop_reason.anthropic(stop_sequence.is_some()),
                    stop_sequence,
                },
                usage: format::anthropic::usage(&usage),
            },
            StreamEvent::MessageStop => AnthropicStreamEvent::MessageStop,
            StreamEvent::Heartbeat => return vec![SseFrame::Comment],
            StreamEvent::DoneMarker => return Vec::new(),
            StreamEvent::Error(envelope) => return vec![SseFrame::json(Some("error"), &envelope)],
        };

        vec![SseFrame::json(Some(anthropic_event_type(&event)), &event)]
    }
}

/// SSE event name for an Anthropic stream event
const fn anthropic_event_type(event: &AnthropicStreamEvent) -> &'static str {
    match event {
        AnthropicStreamEvent::MessageStart { .. } => "message_start",
        AnthropicStreamEvent::ContentBlockStart { .. } => "content_block_start",
        AnthropicStreamEvent::ContentBlockDelta { .. } => "content_block_delta",
        AnthropicStreamEvent::ContentBlockStop { .. } => "content_block_stop",
        AnthropicStreamEvent::MessageDelta { .. } => "message_delta",
        AnthropicStreamEvent::MessageStop => "message_stop",
    }
}

fn done() -> SseFrame {
    SseFrame::Data {
        event: None,
        data: "[DONE]".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::types::{StopReason, Usage};

    fn meta() -> ResponseMeta {
        ResponseMeta {
            id: "id-1".to_owned(),
            created: 7,
            model: "m".to_owned(),
        }
    }

    fn data(frame: &SseFrame) -> Value {
        match frame {
            SseFrame::Data { data, .. } => serde_json::from_str(data).unwrap(),
            SseFrame::Comment => panic!("expected data frame"),
        }
    }

    fn text_events() -> Vec<StreamEvent> {
        vec![
            StreamEvent::MessageStart { prompt_tokens: 3 },
            StreamEvent::BlockStart {
                index: 0,
                kind: BlockKind::Text,
            },
            StreamEvent::BlockDelta {
                index: 0,
                delta: BlockDelta::Text("hi".to_owned()),
            },
            StreamEvent::BlockStop { index: 0 },
            StreamEvent::MessageDelta {
                stop_reason: StopReason::Stop,
                stop_sequence: None,
                usage: Usage::reported(3, 1),
            },
            StreamEvent::MessageStop,
            StreamEvent::DoneMarker,
        ]
    }

    #[test]
    fn openai_chat_frames() {
        let mut renderer = OpenAiChatRenderer::new(meta(), true);
        let frames: Vec<SseFrame> = text_events().into_iter().flat_map(|e| renderer.render(e)).collect();

        assert_eq!(frames.len(), 5);
        assert_eq!(data(&frames[0])["choices"][0]["delta"], json!({"role": "assistant"}));
        assert_eq!(data(&frames[1])["choices"][0]["delta"], json!({"content": "hi"}));
        assert_eq!(data(&frames[2])["choices"][0]["delta"], json!({}));
        assert_eq!(data(&frames[2])["choices"][0]["finish_reason"], "stop");
        assert_eq!(data(&frames[3])["usage"]["total_tokens"], 4);
        assert_eq!(
            frames[4],
            SseFrame::Data {
                event: None,
                data: "[DONE]".to_owned()
            }
        );
    }

    #[test]
    fn anthropic_event_names_follow_sequence() {
        let mut renderer = AnthropicRenderer { meta: meta() };
        let names: Vec<&str> = text_events()
            .into_iter()
            .flat_map(|e| renderer.render(e))
            .filter_map(|f| match f {
                SseFrame::Data { event, .. } => event,
                SseFrame::Comment => None,
            })
            .collect();

        assert_eq!(
            names,
            vec![
                "message_start",
                "content_block_start",
                "content_block_delta",
                "content_block_stop",
                "message_delta",
                "message_stop"
            ]
        );
    }

    #[test]
    fn heartbeats_render_as_comments() {
        let mut anthropic = AnthropicRenderer { meta: meta() };
        let mut openai = OpenAiChatRenderer::new(meta(), false);

        assert_eq!(anthropic.render(StreamEvent::Heartbeat), vec![SseFrame::Comment]);
        assert_eq!(openai.render(StreamEvent::Heartbeat), vec![SseFrame::Comment]);
    }

    #[test]
    fn openai_errors_are_terminal() {
        let envelope = prism_core::ErrorEnvelope {
            envelope_type: "error",
            error: prism_core::ErrorBody {
                error_type: "timeout_error".to_owned(),
                code: "backend_timeout".to_owned(),
                message: "slow".to_owned(),
                suggestion: None,
            },
        };

        let frames = OpenAiChatRenderer::new(meta(), false).render(StreamEvent::Error(envelope));

        assert_eq!(data(&frames[0])["error"]["code"], "backend_timeout");
        assert!(matches!(&frames[1], SseFrame::Data { data, .. } if data == "[DONE]"));
    }

    #[test]
    fn tool_calls_render_atomically() {
        let mut renderer = OpenAiChatRenderer::new(meta(), false);
        renderer.render(StreamEvent::MessageStart { prompt_tokens: 0 });

        let start = renderer.render(StreamEvent::BlockStart {
            index: 0,
            kind: BlockKind::ToolUse {
                id: "call_1".to_owned(),
                name: "lookup".to_owned(),
            },
        });
        let args = renderer.render(StreamEvent::BlockDelta {
            index: 0,
            delta: BlockDelta::ToolArguments(r#"{"query":"x"}"#.to_owned()),
        });

        let call = &data(&start[0])["choices"][0]["delta"]["tool_calls"][0];
        assert_eq!(call["id"], "call_1");
        assert_eq!(call["function"]["name"], "lookup");

        let fragment = &data(&args[0])["choices"][0]["delta"]["tool_calls"][0];
        assert_eq!(fragment["index"], 0);
        assert_eq!(fragment["function"]["arguments"], r#"{"query":"x"}"#);
    }

    #[test]
    fn completion_frames() {
        let mut renderer = OpenAiCompletionRenderer {
            meta: meta(),
            include_usage: false,
        };
        let frames: Vec<SseFrame> = text_events().into_iter().flat_map(|e| renderer.render(e)).collect();

        assert_eq!(frames.len(), 3);
        assert_eq!(data(&frames[0])["choices"][0]["text"], "hi");
        assert_eq!(data(&frames[1])["choices"][0]["finish_reason"], "stop");
    }
}
