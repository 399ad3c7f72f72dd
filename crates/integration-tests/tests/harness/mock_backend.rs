//! Mock hosted model backend for integration tests
//!
//! Serves one completion endpoint that replays scripted replies in order
//! and records every request body it receives.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// One scripted backend reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a JSON body
    Json(Value),
    /// A non-success status, optionally with `Retry-After` seconds
    Status { status: u16, retry_after: Option<u64> },
    /// 200 with an SSE body, one `data:` line per event
    Sse(Vec<Value>),
}

/// Mock backend that answers from a script
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<MockRequest>>,
}

/// A request as seen by the backend
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

impl MockBackend {
    /// Start a mock that answers with `replies` in order
    ///
    /// Once the script runs out every call gets `{"text": "done"}`.
    pub async fn start(replies: impl IntoIterator<Item = MockReply>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/complete", routing::post(handle_complete))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Start a mock answering every call with the same JSON payload
    pub async fn replying(payload: Value) -> anyhow::Result<Self> {
        Self::start([MockReply::Json(payload)]).await
    }

    /// Completion endpoint to configure as `backend.base_url`
    pub fn url(&self) -> String {
        format!("http://{}/complete", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_complete(
    State(state): State<Arc<MockState>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state.requests.lock().unwrap().push(MockRequest { authorization, body });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| MockReply::Json(serde_json::json!({"text": "done"})));

    match reply {
        MockReply::Json(payload) => Json(payload).into_response(),
        MockReply::Status { status, retry_after } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut response = (status, "scripted failure").into_response();
            if let Some(seconds) = retry_after {
                response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(seconds));
            }
            response
        }
        MockReply::Sse(events) => {
            let mut body = String::new();
            for event in events {
                body.push_str(&format!("data: {event}\n\n"));
            }
            body.push_str("data: [DONE]\n\n");

            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        }
    }
}
