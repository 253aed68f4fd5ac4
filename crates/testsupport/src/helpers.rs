use anyhow::Result;
use laponia_completions::CompletionBackend;
use laponia_control::{ChatStore, Chatbot};
use laponia_metrics::MetricsService;
use laponia_models::Config;
use std::sync::Arc;
use tempfile::TempDir;

/// Defaults with an in-memory database and a loopback bind.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = 0;
    config.data.db_url = "sqlite::memory:".to_string();
    config.data.max_connections = 1;
    config.data.busy_timeout_ms = 1_000;
    config
}

/// Same as [`test_config`] but backed by a file inside a fresh temp dir.
/// Keep the `TempDir` alive for as long as the database is used.
pub fn file_backed_config() -> Result<(Config, TempDir)> {
    let dir = tempfile::tempdir()?;
    let mut config = test_config();
    config.data.db_url = format!("sqlite://{}/chatbot.db", dir.path().display());
    config.data.max_connections = 2;
    Ok((config, dir))
}

pub async fn build_chatbot(
    config: &Config,
    backend: Arc<dyn CompletionBackend>,
    metrics: Arc<MetricsService>,
) -> Result<Arc<Chatbot>> {
    let store = ChatStore::connect(&config.data).await?;
    Ok(Arc::new(Chatbot::new(
        store,
        backend,
        metrics,
        &config.completions,
        &config.chat,
    )))
}

pub fn test_metrics() -> Arc<MetricsService> {
    Arc::new(MetricsService::new().expect("metrics registry"))
}
