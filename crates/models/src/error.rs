use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body returned for every failed request. `error` is the human-readable
/// message clients display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorShape {
    pub error: String,
    pub error_type: String,
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Chatbot não inicializado corretamente")]
    ChatbotUnavailable,

    #[error("{reason}")]
    InvalidRequest { reason: String },

    #[error("Completion failed: {reason}")]
    Completion { reason: String },

    #[error("Database error: {reason}")]
    Database { reason: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

impl ChatError {
    /// The request body did not carry a string `message` field.
    pub fn malformed_chat_request() -> Self {
        ChatError::InvalidRequest {
            reason: "Formato de requisição inválido. Envie um JSON com o campo 'message'"
                .to_string(),
        }
    }

    pub fn to_error_shape(&self) -> ErrorShape {
        ErrorShape {
            error: self.to_string(),
            error_type: self.error_type().to_string(),
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ChatError::ChatbotUnavailable => "ServiceUnavailable",
            ChatError::InvalidRequest { .. } => "InvalidRequest",
            ChatError::Completion { .. } => "CompletionError",
            ChatError::Database { .. } => "DatabaseError",
            ChatError::Sqlx(_) => "DatabaseError",
            ChatError::Config { .. } => "ConfigError",
            ChatError::Internal { .. } => "InternalError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ChatError::ChatbotUnavailable => 500,
            ChatError::InvalidRequest { .. } => 400,
            ChatError::Completion { .. } => 502,
            ChatError::Database { .. } => 500,
            ChatError::Sqlx(_) => 500,
            ChatError::Config { .. } => 500,
            ChatError::Internal { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_chatbot_is_a_server_error() {
        let e = ChatError::ChatbotUnavailable;
        assert_eq!(e.http_status(), 500);
        assert_eq!(
            e.to_error_shape().error,
            "Chatbot não inicializado corretamente"
        );
    }

    #[test]
    fn malformed_request_message_is_verbatim() {
        let shape = ChatError::malformed_chat_request().to_error_shape();
        assert_eq!(
            shape.error,
            "Formato de requisição inválido. Envie um JSON com o campo 'message'"
        );
        assert_eq!(shape.error_type, "InvalidRequest");
    }

    #[test]
    fn completion_failures_map_to_bad_gateway() {
        let e = ChatError::Completion {
            reason: "provider error (401)".into(),
        };
        assert_eq!(e.http_status(), 502);
        assert_eq!(e.error_type(), "CompletionError");
    }
}
