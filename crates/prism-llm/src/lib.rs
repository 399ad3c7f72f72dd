//! Prism engine
//!
//! Accepts OpenAI- and Anthropic-shaped requests, drives a hosted model
//! backend through the tool orchestration loop, and answers in the
//! client's protocol, streamed or not.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
pub mod capability;
mod convert;
pub mod error;
pub mod extract;
pub mod format;
mod handler;
pub mod ids;
pub mod orchestrator;
pub mod protocol;
pub mod repair;
pub mod state;
pub mod stream;
pub mod tokens;
pub mod tools;
pub mod types;

pub use error::{BackendError, LlmError};
pub use handler::llm_router;
pub use state::LlmState;
