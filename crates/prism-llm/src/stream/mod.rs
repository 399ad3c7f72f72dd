//! Streaming protocol generator
//!
//! Turns a finished [`NormalizedResult`], a pending one, or a live backend
//! delta stream into the canonical [`StreamEvent`] sequence. Every stream
//! leaving this module is interleaved with heartbeats and passed through a
//! [`Sequencer`], so renderers can rely on the event order.

mod chunk;
mod heartbeat;
pub mod render;
mod state;

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use futures_util::stream::{self, BoxStream};
use futures_util::{StreamExt, future};
use prism_config::StreamingConfig;
use prism_core::HttpError;

pub use chunk::{chunk_text, window_end};
pub use heartbeat::with_heartbeats;
pub use render::{EventRenderer, SseFrame};
pub use state::{Sequencer, StreamState};

use crate::backend::{BackendDelta, DeltaStream};
use crate::error::LlmError;
use crate::types::{BlockDelta, BlockKind, FALLBACK_TEXT, FinishSignal, NormalizedResult, StopReason, StreamEvent, Usage};

/// Boxed stream of canonical events
pub type EventStream = BoxStream<'static, StreamEvent>;

/// How a request is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// One JSON body
    Single,
    /// Server-sent events
    Stream,
    /// Streaming was requested alongside tools; answered with one JSON body
    Downgraded,
}

impl ResponseMode {
    /// Pick the mode for a request
    ///
    /// Tool-call arguments must reach the client as one valid JSON
    /// document, so declared tools always turn a stream into a single
    /// response.
    pub const fn select(stream_requested: bool, has_tools: bool) -> Self {
        match (stream_requested, has_tools) {
            (false, _) => Self::Single,
            (true, true) => Self::Downgraded,
            (true, false) => Self::Stream,
        }
    }

    pub const fn is_downgraded(self) -> bool {
        matches!(self, Self::Downgraded)
    }
}

/// Produces canonical event streams
#[derive(Debug, Clone)]
pub struct StreamGenerator {
    chunk_words: usize,
    heartbeat_interval: Duration,
}

impl StreamGenerator {
    pub fn new(config: &StreamingConfig) -> Self {
        Self {
            chunk_words: config.chunk_words.max(1),
            heartbeat_interval: config.heartbeat_interval,
        }
    }

    /// Everything after `MessageStart` for a finished result
    pub fn body_events(&self, result: &NormalizedResult) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let mut index = 0;

        let text = result
            .visible_text()
            .filter(|t| !t.is_empty())
            .or_else(|| result.tool_calls.is_empty().then_some(FALLBACK_TEXT));

        if let Some(text) = text {
            events.push(StreamEvent::BlockStart {
                index,
                kind: BlockKind::Text,
            });
            events.extend(chunk_text(text, self.chunk_words).into_iter().map(|chunk| {
                StreamEvent::BlockDelta {
                    index,
                    delta: BlockDelta::Text(chunk),
                }
            }));
            events.push(StreamEvent::BlockStop { index });
            index += 1;
        }

        // Arguments travel as one fragment so they are valid JSON on arrival
        for call in &result.tool_calls {
            events.push(StreamEvent::BlockStart {
                index,
                kind: BlockKind::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                },
            });
            events.push(StreamEvent::BlockDelta {
                index,
                delta: BlockDelta::ToolArguments(call.arguments.clone()),
            });
            events.push(StreamEvent::BlockStop { index });
            index += 1;
        }

        events.push(StreamEvent::MessageDelta {
            stop_reason: result.stop_reason,
            stop_sequence: result.stop_sequence.clone(),
            usage: result.usage,
        });
        events.push(StreamEvent::MessageStop);
        events.push(StreamEvent::DoneMarker);

        events
    }

    /// Complete event sequence for a finished result
    pub fn events(&self, result: &NormalizedResult) -> Vec<StreamEvent> {
        let mut events = vec![StreamEvent::MessageStart {
            prompt_tokens: result.usage.prompt_tokens,
        }];
        events.extend(self.body_events(result));
        events
    }

    /// Stream a result that is still being computed
    ///
    /// The message opens immediately; heartbeats cover the wait and a
    /// failure becomes a terminal error event.
    pub fn from_pending<F>(&self, prompt_tokens: u32, pending: F) -> EventStream
    where
        F: Future<Output = Result<NormalizedResult, LlmError>> + Send + 'static,
    {
        let generator = self.clone();

        let events = stream::once(future::ready(StreamEvent::MessageStart { prompt_tokens }))
            .chain(stream::once(pending).flat_map(move |outcome| {
                let events = match outcome {
                    Ok(result) => generator.body_events(&result),
                    Err(error) => vec![error_event(&error)],
                };
                stream::iter(events)
            }))
            .boxed();

        self.finish(events)
    }

    /// Stream a live backend delta stream
    ///
    /// Text is re-chunked to the configured word window. Usage comes from
    /// the backend when it reports any, otherwise it is estimated from
    /// `prompt_chars` and the streamed text.
    pub fn from_deltas<F>(&self, prompt_chars: usize, opening: F) -> EventStream
    where
        F: Future<Output = Result<DeltaStream, LlmError>> + Send + 'static,
    {
        let chunk_words = self.chunk_words;
        let prompt_tokens = Usage::estimate(prompt_chars, 0).prompt_tokens;

        let events = stream::once(future::ready(StreamEvent::MessageStart { prompt_tokens }))
            .chain(stream::once(opening).flat_map(move |opened| match opened {
                Ok(deltas) => DeltaAssembler::new(deltas, chunk_words, prompt_chars).into_events(),
                Err(error) => stream::iter([error_event(&error)]).boxed(),
            }))
            .boxed();

        self.finish(events)
    }

    fn finish(&self, events: EventStream) -> EventStream {
        let mut sequencer = Sequencer::default();

        with_heartbeats(events, self.heartbeat_interval)
            .filter(move |event| future::ready(sequencer.accept(event)))
            .boxed()
    }
}

fn error_event(error: &LlmError) -> StreamEvent {
    tracing::error!(error = %error, "stream terminated with error");
    StreamEvent::Error(error.envelope())
}

/// Folds backend deltas into canonical events
struct DeltaAssembler {
    deltas: DeltaStream,
    pending: VecDeque<StreamEvent>,
    buffer: String,
    chunk_words: usize,
    prompt_chars: usize,
    streamed_chars: usize,
    text_open: bool,
    visible: bool,
    signal: FinishSignal,
    usage: Option<Usage>,
    finished: bool,
}

impl DeltaAssembler {
    fn new(deltas: DeltaStream, chunk_words: usize, prompt_chars: usize) -> Self {
        Self {
            deltas,
            pending: VecDeque::new(),
            buffer: String::new(),
            chunk_words,
            prompt_chars,
            streamed_chars: 0,
            text_open: false,
            visible: false,
            signal: FinishSignal::default(),
            usage: None,
            finished: false,
        }
    }

    fn into_events(self) -> EventStream {
        stream::unfold(self, |mut assembler| async move {
            loop {
                if let Some(event) = assembler.pending.pop_front() {
                    return Some((event, assembler));
                }
                if assembler.finished {
                    return None;
                }

                match assembler.deltas.next().await {
                    Some(Ok(delta)) => assembler.absorb(delta),
                    Some(Err(error)) => {
                        assembler.pending.push_back(error_event(&LlmError::Backend(error)));
                        assembler.finished = true;
                    }
                    None => assembler.close(),
                }
            }
        })
        .boxed()
    }

    fn absorb(&mut self, delta: BackendDelta) {
        if let Some(text) = delta.text {
            self.buffer.push_str(&text);
            while let Some(end) = window_end(&self.buffer, self.chunk_words) {
                let chunk: String = self.buffer.drain(..end).collect();
                self.emit(chunk);
            }
        }

        if let Some(signal) = delta.signal {
            self.signal.truncated |= signal.truncated;
            self.signal.content_filtered |= signal.content_filtered;
            if signal.stop_sequence.is_some() {
                self.signal.stop_sequence = signal.stop_sequence;
            }
        }

        // Anthropic reports input tokens up front and output tokens at the end
        if let Some(usage) = delta.usage {
            let previous = self.usage.unwrap_or_default();
            self.usage = Some(Usage::reported(
                previous.prompt_tokens.max(usage.prompt_tokens),
                previous.completion_tokens.max(usage.completion_tokens),
            ));
        }
    }

    fn emit(&mut self, chunk: String) {
        if !self.text_open {
            self.pending.push_back(StreamEvent::BlockStart {
                index: 0,
                kind: BlockKind::Text,
            });
            self.text_open = true;
        }

        self.streamed_chars += chunk.chars().count();
        self.visible |= !chunk.trim().is_empty();
        self.pending.push_back(StreamEvent::BlockDelta {
            index: 0,
            delta: BlockDelta::Text(chunk),
        });
    }

    fn close(&mut self) {
        let rest = std::mem::take(&mut self.buffer);
        if !rest.is_empty() {
            self.emit(rest);
        }

        if !self.visible {
            tracing::warn!("backend stream carried no text, sending fallback");
            self.emit(FALLBACK_TEXT.to_owned());
        }

        let usage = self
            .usage
            .unwrap_or_else(|| Usage::estimate(self.prompt_chars, self.streamed_chars));

        self.pending.push_back(StreamEvent::BlockStop { index: 0 });
        self.pending.push_back(StreamEvent::MessageDelta {
            stop_reason: StopReason::derive(false, &self.signal),
            stop_sequence: self.signal.stop_sequence.take(),
            usage,
        });
        self.pending.push_back(StreamEvent::MessageStop);
        self.pending.push_back(StreamEvent::DoneMarker);
        self.finished = true;
    }
}
