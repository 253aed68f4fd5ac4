mod common;

use common::spawn_server;
use laponia::build_state;
use laponia_testsupport::{test_config, test_metrics};

#[tokio::test(flavor = "multi_thread")]
async fn smoke_test_without_api_key() -> anyhow::Result<()> {
    let mut config = test_config();
    config.completions.api_key = None;
    let server = spawn_server(build_state(config, test_metrics()).await).await?;
    let client = &server.client;

    let home = client.get("/").await?;
    assert!(home.status.is_success());
    assert_eq!(home.body["message"], "API Chatbot Laponia está funcionando!");
    assert_eq!(home.body["chatbot_initialized"], false);

    let health = client.get("/api/health").await?;
    assert!(health.status.is_success());
    assert_eq!(health.body["status"], "healthy");
    assert_eq!(health.body["chatbot_initialized"], false);

    let chat = client
        .post_json("/api/chat", serde_json::json!({"message": "Oi"}))
        .await?;
    assert_eq!(chat.status.as_u16(), 500);
    assert_eq!(chat.body["error"], "Chatbot não inicializado corretamente");

    let metrics_text = client.metrics_text().await?;
    assert!(metrics_text.contains("laponia_messages_total"));

    server.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_api_key_counts_as_missing() -> anyhow::Result<()> {
    let mut config = test_config();
    config.completions.api_key = Some("   ".to_string());
    let state = build_state(config, test_metrics()).await;
    assert!(!state.chatbot_initialized());
    Ok(())
}
