use ::tracing::{error, info, warn};
use laponia_models::{ChatError, LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub struct TracingService;

impl TracingService {
    /// Install the global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter.
    pub fn init(config: &LoggingConfig) -> Result<(), ChatError> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .map_err(|e| ChatError::Config {
                reason: format!("invalid log filter '{}': {e}", config.filter),
            })?;

        let registry = tracing_subscriber::registry().with(filter);
        let result = match config.format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .try_init(),
            LogFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer().with_target(false).compact())
                .try_init(),
        };

        result.map_err(|e| ChatError::Internal {
            reason: e.to_string(),
        })
    }

    pub fn log_message_received(request_id: &str, message_len: usize) {
        info!(
            request_id = %request_id,
            message_len = message_len,
            "Message received"
        );
    }

    pub fn log_command(request_id: &str, command: &str, category: &str, key: &str) {
        info!(
            request_id = %request_id,
            command = %command,
            category = %category,
            key = %key,
            "Knowledge command"
        );
    }

    pub fn log_completion(request_id: &str, model: &str, duration_ms: u64, context_turns: usize) {
        info!(
            request_id = %request_id,
            model = %model,
            duration_ms = duration_ms,
            context_turns = context_turns,
            "Completion generated"
        );
    }

    pub fn log_error(request_id: Option<&str>, error: &ChatError) {
        error!(
            request_id = %request_id.unwrap_or("none"),
            error_type = %error.error_type(),
            error_message = %error,
            "Error occurred"
        );
    }

    pub fn log_degraded(operation: &str, error: &ChatError) {
        warn!(
            operation = %operation,
            error_type = %error.error_type(),
            error_message = %error,
            "Store operation failed, continuing"
        );
    }
}
