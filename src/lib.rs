use laponia_api::AppState;
use laponia_completions::GroqClient;
use laponia_control::store::database_path;
use laponia_control::{ChatStore, Chatbot};
use laponia_metrics::MetricsService;
use laponia_models::{ChatError, Config};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the application state. A missing API key or an unusable database
/// leaves the service running without a chatbot.
pub async fn build_state(config: Config, metrics: Arc<MetricsService>) -> AppState {
    let chatbot = match init_chatbot(&config, metrics.clone()).await {
        Ok(chatbot) => {
            info!("Chatbot inicializado com sucesso!");
            Some(Arc::new(chatbot))
        }
        Err(e) => {
            warn!("Erro ao inicializar o chatbot: {}", e);
            None
        }
    };

    AppState::new(config, chatbot, metrics)
}

pub async fn init_chatbot(config: &Config, metrics: Arc<MetricsService>) -> Result<Chatbot, ChatError> {
    let api_key = config
        .completions
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ChatError::Config {
            reason: "Nenhuma chave de API da Groq encontrada. Verifique as variáveis de ambiente"
                .to_string(),
        })?;

    ensure_database_dir(&config.data.db_url);
    let store = ChatStore::connect(&config.data).await?;
    let backend = Arc::new(GroqClient::new(api_key, &config.completions)?);

    Ok(Chatbot::new(
        store,
        backend,
        metrics,
        &config.completions,
        &config.chat,
    ))
}

fn ensure_database_dir(db_url: &str) {
    let Some(parent) = database_path(db_url).and_then(Path::parent) else {
        return;
    };
    if parent.as_os_str().is_empty() {
        return;
    }
    if let Err(e) = std::fs::create_dir_all(parent) {
        warn!("Failed to create DB parent directory {:?}: {}", parent, e);
    }
}
