mod harness;

use harness::config::ConfigBuilder;
use harness::mock_backend::MockBackend;
use harness::server::TestServer;

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let mock = MockBackend::start([]).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.headers().contains_key("x-processing-time-ms"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn health_endpoint_disabled() {
    let mock = MockBackend::start([]).await.unwrap();
    let config = ConfigBuilder::new(&mock.url()).without_health().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let mock = MockBackend::start([]).await.unwrap();
    let server = TestServer::start(ConfigBuilder::new(&mock.url()).build()).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/health"))
        .header("x-request-id", "trace-42")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.headers()["x-request-id"], "trace-42");
}
