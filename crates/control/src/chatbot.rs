use crate::commands::Command;
use crate::store::ChatStore;
use laponia_completions::{ChatMessage, CompletionBackend, CompletionRequest};
use laponia_metrics::{MetricsService, TracingService};
use laponia_models::{ChatConfig, ChatError, CompletionsConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

pub struct Chatbot {
    store: ChatStore,
    backend: Arc<dyn CompletionBackend>,
    metrics: Arc<MetricsService>,
    model: String,
    system_prompt: String,
    context_turns: u32,
}

impl Chatbot {
    pub fn new(
        store: ChatStore,
        backend: Arc<dyn CompletionBackend>,
        metrics: Arc<MetricsService>,
        completions: &CompletionsConfig,
        chat: &ChatConfig,
    ) -> Self {
        Self {
            store,
            backend,
            metrics,
            model: completions.model.clone(),
            system_prompt: chat.system_prompt.clone(),
            context_turns: chat.context_turns,
        }
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Answer one user message. Knowledge commands are served from the
    /// store; everything else goes to the model. Never fails: errors become
    /// the reply text.
    #[instrument(skip(self, message))]
    pub async fn handle(&self, message: &str) -> String {
        let request_id = Uuid::new_v4().to_string();
        TracingService::log_message_received(&request_id, message.len());
        self.metrics.record_message();

        let command = Command::parse(message);
        let name = command.name();
        match command {
            Command::Save {
                category,
                key,
                value,
            } => {
                TracingService::log_command(&request_id, name, &category, &key);
                match self.store.save_knowledge(&category, &key, &value).await {
                    Ok(()) => {
                        self.metrics.record_knowledge_save();
                        format!("Conhecimento salvo: {category}:{key}")
                    }
                    Err(e) => {
                        TracingService::log_error(Some(&request_id), &e);
                        "Erro ao salvar conhecimento".to_string()
                    }
                }
            }
            Command::Recall { category, key } => {
                TracingService::log_command(&request_id, name, &category, &key);
                self.metrics.record_knowledge_lookup();
                let value = self
                    .store
                    .get_knowledge(&category, &key)
                    .await
                    .unwrap_or_else(|e| {
                        TracingService::log_degraded("get_knowledge", &e);
                        None
                    });
                match value {
                    Some(v) if !v.is_empty() => format!("Valor recuperado: {v}"),
                    _ => "Conhecimento não encontrado".to_string(),
                }
            }
            Command::Message(text) => self.process_message(&request_id, &text).await,
        }
    }

    /// Generate a reply with the latest exchanges as context and persist the
    /// exchange.
    pub async fn process_message(&self, request_id: &str, message: &str) -> String {
        match self.try_process_message(request_id, message).await {
            Ok(reply) => reply,
            Err(e) => {
                TracingService::log_error(Some(request_id), &e);
                format!("Desculpe, ocorreu um erro: {e}")
            }
        }
    }

    async fn try_process_message(
        &self,
        request_id: &str,
        message: &str,
    ) -> Result<String, ChatError> {
        let history = self
            .store
            .conversation_history(i64::from(self.context_turns))
            .await
            .unwrap_or_else(|e| {
                TracingService::log_degraded("conversation_history", &e);
                Vec::new()
            });
        let context = history
            .iter()
            .map(|(user, ai)| format!("{user} -> {ai}"))
            .collect::<Vec<_>>()
            .join(" ");

        let started = Instant::now();
        let reply = self.generate_response(message, &context).await?;
        TracingService::log_completion(
            request_id,
            &self.model,
            started.elapsed().as_millis() as u64,
            history.len(),
        );

        if let Err(e) = self.store.save_conversation(message, &reply).await {
            TracingService::log_degraded("save_conversation", &e);
        }

        Ok(reply)
    }

    /// Ask the backend for a reply to `prompt`. A non-empty `context` is sent
    /// as a second system message.
    pub async fn generate_response(&self, prompt: &str, context: &str) -> Result<String, ChatError> {
        let request = self.build_request(prompt, context);

        let started = Instant::now();
        let result = self.backend.complete(&request).await;
        self.metrics
            .record_completion_duration(started.elapsed().as_secs_f64() * 1000.0);

        if let Err(e) = &result {
            self.metrics.record_completion_error(e.error_type());
        }
        result
    }

    pub fn build_request(&self, prompt: &str, context: &str) -> CompletionRequest {
        let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];
        if !context.is_empty() {
            messages.push(ChatMessage::system(format!("Contexto adicional: {context}")));
        }
        messages.push(ChatMessage::user(prompt));

        CompletionRequest {
            model: self.model.clone(),
            messages,
        }
    }
}
