//! Scripted backend for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use serde_json::Value;

use super::{Backend, BackendDelta, BackendRequest, DeltaStream};
use crate::error::BackendError;

/// Replays scripted payloads and records every request
#[derive(Default)]
pub struct ScriptedBackend {
    pub replies: Mutex<VecDeque<Value>>,
    /// Returned once `replies` runs out
    pub repeat: Option<Value>,
    /// Deltas for the streaming call; absent means streaming fails
    pub deltas: Option<Vec<BackendDelta>>,
    pub delay: Option<Duration>,
    pub requests: Mutex<Vec<BackendRequest>>,
}

impl ScriptedBackend {
    pub fn replying(replies: impl IntoIterator<Item = Value>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn complete(&self, request: &BackendRequest) -> Result<Value, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.or_else(|| self.repeat.clone()).unwrap_or(Value::Null))
    }

    async fn complete_stream(&self, request: &BackendRequest) -> Result<DeltaStream, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        let deltas = self
            .deltas
            .clone()
            .ok_or_else(|| BackendError::Transport("no stream scripted".to_owned()))?;

        Ok(stream::iter(deltas.into_iter().map(Ok)).boxed())
    }
}
