use laponia_control::{ChatStore, Chatbot};
use laponia_metrics::MetricsService;
use laponia_models::{Config, DataConfig};
use laponia_testsupport::StubBackend;
use std::sync::Arc;

#[allow(dead_code)]
pub fn memory_config() -> DataConfig {
    DataConfig {
        db_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        busy_timeout_ms: 1_000,
    }
}

#[allow(dead_code)]
pub async fn memory_store() -> ChatStore {
    ChatStore::connect(&memory_config()).await.unwrap()
}

#[allow(dead_code)]
pub async fn chatbot_with(backend: Arc<StubBackend>) -> (Chatbot, Arc<MetricsService>) {
    let config = Config::default();
    let metrics = Arc::new(MetricsService::new().unwrap());
    let chatbot = Chatbot::new(
        memory_store().await,
        backend,
        metrics.clone(),
        &config.completions,
        &config.chat,
    );
    (chatbot, metrics)
}
