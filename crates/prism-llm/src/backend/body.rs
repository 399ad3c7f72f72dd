use prism_config::BackendType;
use serde_json::{Map, Value, json};

use super::BackendRequest;

/// Outbound body for the request's backend family
pub(super) fn request_body(request: &BackendRequest, stream: bool) -> Value {
    let mut body = match request.backend_type {
        BackendType::Native => native(request),
        BackendType::BedrockAnthropic => bedrock_anthropic(request),
        BackendType::VertexGemini => vertex_gemini(request),
        BackendType::Generic => generic(request),
    };

    if stream {
        body.insert("stream".to_owned(), Value::Bool(true));
    }

    Value::Object(body)
}

fn native(request: &BackendRequest) -> Map<String, Value> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": request.prompt}));

    let mut body = Map::new();
    body.insert("model".to_owned(), json!(request.model));
    body.insert("messages".to_owned(), Value::Array(messages));
    body.insert("max_tokens".to_owned(), json!(request.max_tokens));
    insert_sampling(&mut body, request, "stop");
    body
}

fn bedrock_anthropic(request: &BackendRequest) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("anthropic_version".to_owned(), json!("bedrock-2023-05-31"));
    body.insert("model".to_owned(), json!(request.model));
    body.insert("max_tokens".to_owned(), json!(request.max_tokens));
    if let Some(system) = &request.system {
        body.insert("system".to_owned(), json!(system));
    }
    body.insert(
        "messages".to_owned(),
        json!([{"role": "user", "content": [{"type": "text", "text": request.prompt}]}]),
    );
    insert_sampling(&mut body, request, "stop_sequences");
    body
}

fn vertex_gemini(request: &BackendRequest) -> Map<String, Value> {
    let mut generation = Map::new();
    generation.insert("maxOutputTokens".to_owned(), json!(request.max_tokens));
    insert_sampling(&mut generation, request, "stopSequences");

    let mut body = Map::new();
    body.insert("model".to_owned(), json!(request.model));
    body.insert(
        "contents".to_owned(),
        json!([{"role": "user", "parts": [{"text": request.prompt}]}]),
    );
    if let Some(system) = &request.system {
        body.insert("systemInstruction".to_owned(), json!({"parts": [{"text": system}]}));
    }
    body.insert("generationConfig".to_owned(), Value::Object(generation));
    body
}

fn generic(request: &BackendRequest) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("model".to_owned(), json!(request.model));
    body.insert("prompt".to_owned(), json!(request.prompt));
    if let Some(system) = &request.system {
        body.insert("system".to_owned(), json!(system));
    }
    body.insert("max_tokens".to_owned(), json!(request.max_tokens));
    insert_sampling(&mut body, request, "stop");
    body
}

fn insert_sampling(body: &mut Map<String, Value>, request: &BackendRequest, stop_key: &str) {
    if let Some(temperature) = request.temperature {
        body.insert("temperature".to_owned(), json!(temperature));
    }
    if !request.stop.is_empty() {
        body.insert(stop_key.to_owned(), json!(request.stop));
    }
}
