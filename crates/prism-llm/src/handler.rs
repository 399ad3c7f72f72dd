//! Axum route handlers for OpenAI-compatible and Anthropic-compatible endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::{Stream, StreamExt, stream};
use prism_core::headers::{FLAG_TRUE, STREAM_DOWNGRADED, USAGE_ESTIMATED};
use prism_core::{HttpError, RequestContext};

use crate::error::LlmError;
use crate::format;
use crate::protocol::Protocol;
use crate::protocol::anthropic::{
    AnthropicCountTokensRequest, AnthropicCountTokensResponse, AnthropicModel, AnthropicModelList, AnthropicRequest,
};
use crate::protocol::openai::{OpenAiCompletionRequest, OpenAiModel, OpenAiModelList, OpenAiRequest};
use crate::state::LlmState;
use crate::stream::{EventRenderer, EventStream, ResponseMode, SseFrame};
use crate::types::ChatRequest;

/// Build the LLM router with all endpoints
pub fn llm_router(state: LlmState) -> Router {
    Router::new()
        // OpenAI-compatible endpoints
        .route("/v1/chat/completions", routing::post(openai_chat_completions))
        .route("/v1/completions", routing::post(openai_completions))
        .route("/v1/models", routing::get(openai_list_models))
        // Anthropic-compatible endpoints, with and without the version prefix
        .route("/messages", routing::post(anthropic_messages))
        .route("/v1/messages", routing::post(anthropic_messages))
        .route("/messages/count_tokens", routing::post(anthropic_count_tokens))
        .route("/v1/messages/count_tokens", routing::post(anthropic_count_tokens))
        .route("/models", routing::get(anthropic_list_models))
        .with_state(state)
}

// -- OpenAI-compatible handlers --

/// Handle `POST /v1/chat/completions`
async fn openai_chat_completions(
    State(state): State<LlmState>,
    axum::Extension(context): axum::Extension<RequestContext>,
    payload: Result<Json<OpenAiRequest>, JsonRejection>,
) -> Response {
    match parse(payload) {
        Ok(request) => respond(&state, &context, Protocol::OpenAiChat, request).await,
        Err(e) => error_response(&e),
    }
}

/// Handle `POST /v1/completions`
async fn openai_completions(
    State(state): State<LlmState>,
    axum::Extension(context): axum::Extension<RequestContext>,
    payload: Result<Json<OpenAiCompletionRequest>, JsonRejection>,
) -> Response {
    match parse(payload) {
        Ok(request) => respond(&state, &context, Protocol::OpenAiCompletion, request).await,
        Err(e) => error_response(&e),
    }
}

/// Handle `GET /v1/models`
async fn openai_list_models(State(state): State<LlmState>) -> Response {
    let created = u64::try_from(state.inner.started.as_second()).unwrap_or(0);

    let data = state
        .models()
        .map(|model| OpenAiModel {
            id: model.model_id.clone(),
            object: "model",
            created,
            owned_by: model.backend_type.as_str(),
        })
        .collect();

    Json(OpenAiModelList { object: "list", data }).into_response()
}

// -- Anthropic-compatible handlers --

/// Handle `POST /v1/messages`
async fn anthropic_messages(
    State(state): State<LlmState>,
    axum::Extension(context): axum::Extension<RequestContext>,
    payload: Result<Json<AnthropicRequest>, JsonRejection>,
) -> Response {
    match parse(payload) {
        Ok(request) => respond(&state, &context, Protocol::Anthropic, request).await,
        Err(e) => error_response(&e),
    }
}

/// Handle `POST /v1/messages/count_tokens`
async fn anthropic_count_tokens(
    State(state): State<LlmState>,
    payload: Result<Json<AnthropicCountTokensRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(wire)) => ChatRequest::from(wire),
        Err(rejection) => return error_response(&rejected(&rejection)),
    };

    if let Err(e) = state.resolve(&request.model) {
        return error_response(&e);
    }

    let input_tokens = u32::try_from(state.count_tokens(&request)).unwrap_or(u32::MAX);
    Json(AnthropicCountTokensResponse { input_tokens }).into_response()
}

/// Handle `GET /models`
async fn anthropic_list_models(State(state): State<LlmState>) -> Response {
    let created_at = state.inner.started.to_string();

    let data: Vec<AnthropicModel> = state
        .models()
        .map(|model| AnthropicModel {
            model_type: "model",
            id: model.model_id.clone(),
            display_name: model.model_id.clone(),
            created_at: created_at.clone(),
        })
        .collect();

    Json(AnthropicModelList {
        has_more: false,
        first_id: data.first().map(|m| m.id.clone()),
        last_id: data.last().map(|m| m.id.clone()),
        data,
    })
    .into_response()
}

// -- Shared request flow --

fn parse<W>(payload: Result<Json<W>, JsonRejection>) -> Result<ChatRequest, LlmError>
where
    ChatRequest: TryFrom<W, Error = LlmError>,
{
    let Json(wire) = payload.map_err(|rejection| rejected(&rejection))?;
    ChatRequest::try_from(wire)
}

fn rejected(rejection: &JsonRejection) -> LlmError {
    LlmError::InvalidRequest(rejection.body_text())
}

/// Resolve, run and render one request in the client's protocol
async fn respond(state: &LlmState, context: &RequestContext, protocol: Protocol, request: ChatRequest) -> Response {
    let capability = match state.resolve(&request.model) {
        Ok(capability) => capability,
        Err(e) => return error_response(&e),
    };
    let mode = ResponseMode::select(request.stream, !request.tools.is_empty());

    tracing::info!(
        request_id = %context.request_id,
        protocol = protocol.as_str(),
        model = %capability.model_id,
        backend = capability.backend_type.as_str(),
        stream = request.stream,
        tools = request.tools.len(),
        "handling request"
    );

    let meta = state.inner.ids.next(protocol.id_prefix(), &capability.model_id);

    if mode == ResponseMode::Stream {
        let renderer = protocol.renderer(meta, request.include_usage);
        return sse_response(state.stream(request, capability), renderer).into_response();
    }

    if mode.is_downgraded() {
        tracing::info!(request_id = %context.request_id, "stream downgraded, request declares tools");
        state.inner.metrics.record_downgrade(protocol.as_str());
    }

    let outcome = match state.complete(&request, &capability).await {
        Ok(outcome) => outcome,
        Err(e) => return error_response(&e),
    };

    let mut response = match protocol {
        Protocol::OpenAiChat => Json(format::openai::chat_completion(&outcome.result, &meta)).into_response(),
        Protocol::OpenAiCompletion => Json(format::openai::text_completion(&outcome.result, &meta)).into_response(),
        Protocol::Anthropic => Json(format::anthropic::message(&outcome.result, &meta)).into_response(),
    };

    let headers = response.headers_mut();
    if mode.is_downgraded() {
        headers.insert(STREAM_DOWNGRADED, FLAG_TRUE);
    }
    if outcome.result.usage.estimated {
        headers.insert(USAGE_ESTIMATED, FLAG_TRUE);
    }

    tracing::info!(
        request_id = %context.request_id,
        turns = outcome.turns,
        dropped_tool_calls = outcome.dropped_tool_calls,
        stop_reason = outcome.result.stop_reason.openai(),
        duration_ms = u64::try_from(context.elapsed_ms()).unwrap_or(u64::MAX),
        "request completed"
    );

    response
}

/// Build a streaming SSE response from canonical events
fn sse_response(
    events: EventStream,
    mut renderer: Box<dyn EventRenderer>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let frames = events.flat_map(move |event| stream::iter(renderer.render(event)));

    Sse::new(frames.map(|frame| Ok(sse_event(frame))))
}

fn sse_event(frame: SseFrame) -> Event {
    match frame {
        SseFrame::Data { event: Some(name), data } => Event::default().event(name).data(data),
        SseFrame::Data { event: None, data } => Event::default().data(data),
        SseFrame::Comment => Event::default().comment(""),
    }
}

/// Render an error as the shared envelope with its HTTP status
fn error_response(error: &LlmError) -> Response {
    let status = error.status_code();

    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "request failed");
    } else {
        tracing::warn!(error = %error, status = status.as_u16(), "request rejected");
    }

    (status, Json(error.envelope())).into_response()
}
