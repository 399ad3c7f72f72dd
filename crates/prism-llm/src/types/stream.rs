use prism_core::ErrorEnvelope;

use super::result::{StopReason, Usage};

/// Canonical streaming event
///
/// Produced once by the stream generator and rendered per client protocol.
/// A well-formed sequence is `MessageStart`, one or more blocks each made
/// of `BlockStart`, `BlockDelta`+ and `BlockStop`, then `MessageDelta`,
/// `MessageStop` and `DoneMarker`. `Heartbeat` may appear anywhere before
/// the end and `Error` terminates the sequence early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Opens the message
    MessageStart {
        /// Prompt-side usage, when known up front
        prompt_tokens: u32,
    },
    /// Opens a content block
    BlockStart { index: u32, kind: BlockKind },
    /// Adds content to the open block
    BlockDelta { index: u32, delta: BlockDelta },
    /// Closes the open block
    BlockStop { index: u32 },
    /// Final stop reason and usage
    MessageDelta {
        stop_reason: StopReason,
        stop_sequence: Option<String>,
        usage: Usage,
    },
    /// Closes the message
    MessageStop,
    /// Keepalive with no payload
    Heartbeat,
    /// End of stream
    DoneMarker,
    /// Terminal error
    Error(ErrorEnvelope),
}

/// Kind of content block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Visible text
    Text,
    /// A tool call
    ToolUse { id: String, name: String },
}

/// Content added to a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockDelta {
    /// Text fragment
    Text(String),
    /// Serialized arguments of a tool call
    ToolArguments(String),
}
