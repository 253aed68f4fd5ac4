use laponia_control::Chatbot;
use laponia_metrics::MetricsService;
use laponia_models::{ChatError, Config};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when the service started without a provider key or store.
    pub chatbot: Option<Arc<Chatbot>>,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(config: Config, chatbot: Option<Arc<Chatbot>>, metrics: Arc<MetricsService>) -> Self {
        Self {
            config,
            chatbot,
            metrics,
        }
    }

    pub fn chatbot_initialized(&self) -> bool {
        self.chatbot.is_some()
    }

    pub fn chatbot(&self) -> Result<&Chatbot, ChatError> {
        self.chatbot.as_deref().ok_or(ChatError::ChatbotUnavailable)
    }
}
