use async_trait::async_trait;
use laponia_completions::{CompletionBackend, CompletionRequest};
use laponia_models::ChatError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// In-process completion backend. Replies are consumed in order; once the
/// script runs out it echoes the last user message.
#[derive(Default)]
pub struct StubBackend {
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_replies(replies: &[&str]) -> Arc<Self> {
        let stub = Self::default();
        for reply in replies {
            stub.reply(reply);
        }
        Arc::new(stub)
    }

    pub fn reply(&self, text: &str) {
        self.script.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn fail(&self, reason: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(ChatError::Completion { reason }),
            None => Ok(format!(
                "echo: {}",
                request
                    .messages
                    .last()
                    .map(|m| m.content.as_str())
                    .unwrap_or_default()
            )),
        }
    }
}
