//! Internal canonical types
//!
//! Every client protocol converts into these on the way in and is rendered
//! from them on the way out. Nothing here knows about a wire format.

pub mod message;
pub mod request;
pub mod result;
pub mod stream;
pub mod tool;

pub use message::{Message, Role};
pub use request::ChatRequest;
pub use result::{FALLBACK_TEXT, FinishSignal, NormalizedResult, StopReason, Usage};
pub use stream::{BlockDelta, BlockKind, StreamEvent};
pub use tool::{ToolCall, ToolDefinition};
