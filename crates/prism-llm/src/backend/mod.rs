//! Backend collaborator
//!
//! The engine sends one request per orchestration turn through the
//! [`Backend`] trait and gets the raw JSON payload back. The production
//! implementation is [`HttpBackend`]; tests substitute scripted backends.

mod body;
mod client;
#[cfg(test)]
pub(crate) mod scripted;
mod token;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use prism_config::BackendType;
use serde_json::Value;

pub use client::{HttpBackend, backoff_delay};
pub use token::{StaticTokenProvider, TokenProvider};

use crate::error::BackendError;
use crate::types::{FinishSignal, Usage};

/// One outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    /// Model id as resolved by the capability registry
    pub model: String,
    /// Decides the body shape
    pub backend_type: BackendType,
    /// Prompt with tool schemas and conversation history folded in
    pub prompt: String,
    /// System message
    pub system: Option<String>,
    /// Output cap, already clamped to the model's limit
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    pub stop: Vec<String>,
}

impl BackendRequest {
    /// Characters sent to the backend, used for usage estimates
    pub fn prompt_chars(&self) -> usize {
        self.prompt.chars().count() + self.system.as_deref().map_or(0, |s| s.chars().count())
    }
}

/// One incremental event read from a backend stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendDelta {
    /// Text fragment
    pub text: Option<String>,
    /// Present on the event that ends generation
    pub signal: Option<FinishSignal>,
    /// Usage, when the event reports any
    pub usage: Option<Usage>,
}

/// Incremental backend output
pub type DeltaStream = BoxStream<'static, Result<BackendDelta, BackendError>>;

/// Hosted model backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send one request and return the raw payload
    async fn complete(&self, request: &BackendRequest) -> Result<Value, BackendError>;

    /// Send one request and stream the reply
    async fn complete_stream(&self, request: &BackendRequest) -> Result<DeltaStream, BackendError>;
}
