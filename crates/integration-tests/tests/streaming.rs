mod harness;

use harness::config::ConfigBuilder;
use harness::mock_backend::{MockBackend, MockReply};
use harness::server::TestServer;
use serde_json::{Value, json};

/// `data:` payloads of an SSE body, in order
fn data_lines(body: &str) -> Vec<&str> {
    body.lines().filter_map(|line| line.strip_prefix("data: ")).collect()
}

fn event_names(body: &str) -> Vec<&str> {
    body.lines().filter_map(|line| line.strip_prefix("event: ")).collect()
}

#[tokio::test]
async fn anthropic_stream_relays_backend_deltas() {
    let mock = MockBackend::start([MockReply::Sse(vec![
        json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "Hello "}}),
        json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": "from the stream"}}),
        json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}}),
    ])])
    .await
    .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server
        .post(
            "/messages",
            &json!({
                "model": "claude-3-5-sonnet",
                "max_tokens": 100,
                "stream": true,
                "messages": [{"role": "user", "content": "hi"}]
            }),
        )
        .await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");
    let body = resp.text().await.unwrap();

    assert_eq!(
        event_names(&body),
        vec![
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop",
        ]
    );
    assert!(body.contains("Hello from the stream"));
    assert_eq!(mock.requests()[0].body["stream"], true);
}

#[tokio::test]
async fn anthropic_stream_reports_split_usage_and_stop_sequence() {
    let mock = MockBackend::start([MockReply::Sse(vec![
        json!({
            "type": "message_start",
            "message": {
                "id": "msg_backend",
                "type": "message",
                "role": "assistant",
                "content": [],
                "usage": {"input_tokens": 25, "output_tokens": 1}
            }
        }),
        json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "three, two, one"}}),
        json!({"type": "content_block_stop", "index": 0}),
        json!({
            "type": "message_delta",
            "delta": {"stop_reason": "stop_sequence", "stop_sequence": "LIFTOFF"},
            "usage": {"output_tokens": 15}
        }),
        json!({"type": "message_stop"}),
    ])])
    .await
    .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let body = server
        .post(
            "/v1/messages",
            &json!({
                "model": "claude-3-5-sonnet",
                "max_tokens": 100,
                "stream": true,
                "messages": [{"role": "user", "content": "count down"}]
            }),
        )
        .await
        .text()
        .await
        .unwrap();

    let message_delta: Value = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter_map(|data| serde_json::from_str::<Value>(data).ok())
        .find(|event| event["type"] == "message_delta")
        .unwrap();

    assert_eq!(message_delta["delta"]["stop_reason"], "stop_sequence");
    assert_eq!(message_delta["delta"]["stop_sequence"], "LIFTOFF");
    assert_eq!(message_delta["usage"]["input_tokens"], 25);
    assert_eq!(message_delta["usage"]["output_tokens"], 15);
    assert!(body.contains("three, two, one"));
}

#[tokio::test]
async fn openai_stream_from_single_backend_call() {
    let mock = MockBackend::replying(json!({"generation": {"generatedText": "one two three four five six seven"}}))
        .await
        .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let body = server
        .post(
            "/v1/chat/completions",
            &json!({
                "model": "llama3.1-70b",
                "stream": true,
                "stream_options": {"include_usage": true},
                "messages": [{"role": "user", "content": "count"}]
            }),
        )
        .await
        .text()
        .await
        .unwrap();

    let data = data_lines(&body);
    assert_eq!(data.last(), Some(&"[DONE]"));

    let chunks: Vec<Value> = data[..data.len() - 1]
        .iter()
        .map(|d| serde_json::from_str(d).unwrap())
        .collect();

    assert_eq!(chunks[0]["choices"][0]["delta"]["role"], "assistant");

    let text: String = chunks
        .iter()
        .filter_map(|c| c["choices"][0]["delta"]["content"].as_str())
        .collect();
    assert_eq!(text, "one two three four five six seven");

    let finish = chunks.iter().find_map(|c| c["choices"][0]["finish_reason"].as_str());
    assert_eq!(finish, Some("stop"));

    let usage = chunks.last().unwrap();
    assert_eq!(usage["choices"], json!([]));
    assert!(usage["usage"]["total_tokens"].as_u64().unwrap() > 0);

    // The generic backend has no streaming; one plain call serves the stream
    assert!(mock.requests()[0].body.get("stream").is_none());
}

#[tokio::test]
async fn backend_failure_mid_request_becomes_error_event() {
    let mock = MockBackend::start([MockReply::Status {
        status: 500,
        retry_after: None,
    }])
    .await
    .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server
        .post(
            "/v1/chat/completions",
            &json!({"model": "llama3.1-70b", "stream": true, "messages": [{"role": "user", "content": "hi"}]}),
        )
        .await;

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    let data = data_lines(&body);

    assert_eq!(data.last(), Some(&"[DONE]"));
    let error: Value = serde_json::from_str(data[data.len() - 2]).unwrap();
    assert_eq!(error["type"], "error");
    assert_eq!(error["error"]["code"], "backend_error");
}

#[tokio::test]
async fn streaming_with_tools_is_downgraded() {
    let mock = MockBackend::replying(json!({
        "choices": [{"message": {"content": null, "tool_calls": [
            {"id": "call_9", "type": "function", "function": {"name": "get_weather", "arguments": "{\"city\":\"Oslo\"}"}}
        ]}}]
    }))
    .await
    .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server
        .post(
            "/v1/chat/completions",
            &json!({
                "model": "gpt-4o",
                "stream": true,
                "messages": [{"role": "user", "content": "Weather in Oslo?"}],
                "tools": [{"type": "function", "function": {
                    "name": "get_weather",
                    "parameters": {"type": "object", "properties": {"city": {"type": "string"}}}
                }}]
            }),
        )
        .await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-stream-downgraded"], "true");
    assert!(resp.headers()["content-type"].to_str().unwrap().starts_with("application/json"));

    let json: Value = resp.json().await.unwrap();
    let call = &json["choices"][0]["message"]["tool_calls"][0];
    assert_eq!(call["id"], "call_9");
    assert_eq!(call["function"]["arguments"], "{\"city\":\"Oslo\"}");
    assert_eq!(json["choices"][0]["finish_reason"], "tool_calls");
}
