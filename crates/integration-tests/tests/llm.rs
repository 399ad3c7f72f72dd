mod harness;

use harness::config::ConfigBuilder;
use harness::mock_backend::{MockBackend, MockReply};
use harness::server::TestServer;
use serde_json::{Value, json};

fn chat(model: &str, content: &str) -> Value {
    json!({"model": model, "messages": [{"role": "user", "content": content}]})
}

#[tokio::test]
async fn generated_text_becomes_chat_completion() {
    let mock = MockBackend::replying(json!({"generation": {"generatedText": "hi"}})).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server.post("/v1/chat/completions", &chat("llama3.1-70b", "hello")).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-usage-estimated"], "true");
    assert!(resp.headers().get("x-stream-downgraded").is_none());

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["object"], "chat.completion");
    assert_eq!(json["choices"][0]["message"]["role"], "assistant");
    assert_eq!(json["choices"][0]["message"]["content"], "hi");
    assert_eq!(json["choices"][0]["finish_reason"], "stop");
}

#[tokio::test]
async fn backend_receives_generic_body_with_token() {
    let mock = MockBackend::replying(json!({"text": "ok"})).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let body = json!({
        "model": "llama3.1-70b",
        "max_tokens": 99_999,
        "messages": [
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "hello"}
        ]
    });
    server.post("/v1/chat/completions", &body).await;

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-token"));

    let sent = &requests[0].body;
    assert_eq!(sent["model"], "llama3.1-70b");
    assert_eq!(sent["system"], "Be brief.");
    assert_eq!(sent["max_tokens"], 4096);
    assert_eq!(sent["prompt"], "User: hello\n\nAssistant:");
}

#[tokio::test]
async fn empty_backend_payload_gets_fallback_text() {
    let mock = MockBackend::replying(json!({"status": "ok"})).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let json: Value = server
        .post("/v1/chat/completions", &chat("llama3.1-70b", "hello"))
        .await
        .json()
        .await
        .unwrap();

    let content = json["choices"][0]["message"]["content"].as_str().unwrap();
    assert!(content.starts_with("The model returned an empty response."));
}

#[tokio::test]
async fn anthropic_message_shape() {
    let mock = MockBackend::replying(json!({
        "content": [{"type": "text", "text": "Bonjour"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 7, "output_tokens": 2}
    }))
    .await
    .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let body = json!({
        "model": "claude-3-5-sonnet",
        "max_tokens": 64,
        "messages": [{"role": "user", "content": "Say hello in French"}]
    });
    let resp = server.post("/v1/messages", &body).await;

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("x-usage-estimated").is_none());

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["type"], "message");
    assert_eq!(json["content"][0], json!({"type": "text", "text": "Bonjour"}));
    assert_eq!(json["stop_reason"], "end_turn");
    assert_eq!(json["usage"], json!({"input_tokens": 7, "output_tokens": 2}));
    assert!(json["id"].as_str().unwrap().starts_with("msg_"));
}

#[tokio::test]
async fn legacy_completion() {
    let mock = MockBackend::replying(json!({"text": "42"})).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let json: Value = server
        .post("/v1/completions", &json!({"model": "llama3.1-70b", "prompt": "6*7="}))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(json["object"], "text_completion");
    assert_eq!(json["choices"][0]["text"], "42");
}

#[tokio::test]
async fn strict_mode_rejects_unknown_model() {
    let mock = MockBackend::start([]).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).strict_models().build())
        .await
        .unwrap();

    let resp = server.post("/v1/chat/completions", &chat("no-such-model", "hi")).await;

    assert_eq!(resp.status(), 404);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["error"]["code"], "model_not_found");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let mock = MockBackend::start([
        MockReply::Status {
            status: 429,
            retry_after: None,
        },
        MockReply::Json(json!({"text": "after retry"})),
    ])
    .await
    .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let json: Value = server
        .post("/v1/chat/completions", &chat("llama3.1-70b", "hi"))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(json["choices"][0]["message"]["content"], "after retry");
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn persistent_rate_limit_surfaces_429() {
    let limited = MockReply::Status {
        status: 429,
        retry_after: Some(0),
    };
    let mock = MockBackend::start([limited.clone(), limited.clone(), limited]).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server.post("/v1/chat/completions", &chat("llama3.1-70b", "hi")).await;

    assert_eq!(resp.status(), 429);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["code"], "backend_rate_limited");
}

#[tokio::test]
async fn backend_auth_failure_is_bad_gateway() {
    let mock = MockBackend::start([MockReply::Status {
        status: 401,
        retry_after: None,
    }])
    .await
    .unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server.post("/v1/messages", &json!({
        "model": "claude-3-5-sonnet",
        "max_tokens": 10,
        "messages": [{"role": "user", "content": "hi"}]
    }))
    .await;

    assert_eq!(resp.status(), 502);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"]["type"], "authentication_error");
    assert_eq!(json["error"]["code"], "backend_auth_failed");
}

#[tokio::test]
async fn models_in_both_shapes() {
    let mock = MockBackend::start([]).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let openai: Value = server.client().get(server.url("/v1/models")).send().await.unwrap().json().await.unwrap();
    let anthropic: Value = server.client().get(server.url("/models")).send().await.unwrap().json().await.unwrap();

    assert_eq!(openai["object"], "list");
    assert!(openai["data"].as_array().unwrap().iter().any(|m| m["id"] == "claude-3-5-sonnet"));
    assert_eq!(anthropic["has_more"], false);
    assert!(anthropic["data"].as_array().unwrap().iter().all(|m| m["type"] == "model"));
}

#[tokio::test]
async fn count_tokens_counts_input() {
    let mock = MockBackend::start([]).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let json: Value = server
        .post(
            "/messages/count_tokens",
            &json!({"model": "claude-3-5-sonnet", "messages": [{"role": "user", "content": "Hello, world"}]}),
        )
        .await
        .json()
        .await
        .unwrap();

    assert!(json["input_tokens"].as_u64().unwrap() > 0);
    assert!(mock.requests().is_empty());
}
