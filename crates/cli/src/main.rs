use anyhow::Result;
use clap::{Parser, Subcommand};
use laponia_models::{ChatRequest, ChatResponse, ErrorShape, HealthResponse, HistoryResponse};
use reqwest::Client;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "laponia-cli")]
#[command(about = "CLI client for the Laponia chatbot API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "LAPONIA_ENDPOINT", default_value = "http://localhost:5000")]
    endpoint: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to the chatbot
    Chat {
        /// Message text
        message: String,
    },
    /// Store a knowledge entry
    Save {
        category: String,
        key: String,
        value: String,
    },
    /// Read a knowledge entry back
    Recall { category: String, key: String },
    /// Show recent conversations
    History {
        /// Number of entries; negative for all
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Chat { message } => {
            let reply = send_message(&client, &cli.endpoint, &message).await?;
            println!("{reply}");
        }
        Commands::Save {
            category,
            key,
            value,
        } => {
            let reply =
                send_message(&client, &cli.endpoint, &save_command(&category, &key, &value)).await?;
            println!("{reply}");
        }
        Commands::Recall { category, key } => {
            let reply = send_message(&client, &cli.endpoint, &recall_command(&category, &key)).await?;
            println!("{reply}");
        }
        Commands::History { limit } => {
            let history = get_history(&client, &cli.endpoint, limit).await?;
            println!("📋 History ({} entries):", history.history.len());
            for entry in history.history {
                println!("   > {}", entry.user_message);
                println!("   < {}", entry.ai_response);
            }
        }
        Commands::Health => {
            let health = get_health(&client, &cli.endpoint).await?;
            println!("Status: {}", health.status);
            println!("Chatbot initialized: {}", health.chatbot_initialized);
            println!("Timestamp: {}", health.timestamp);
        }
    }

    Ok(())
}

fn save_command(category: &str, key: &str, value: &str) -> String {
    format!("/salvar {category}:{key}:{value}")
}

fn recall_command(category: &str, key: &str) -> String {
    format!("/recuperar {category}:{key}")
}

async fn failure(response: reqwest::Response, what: &str) -> anyhow::Error {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorShape>(&text)
        .map(|shape| shape.error)
        .unwrap_or(text);
    error!("{} failed ({}): {}", what, status, message);
    anyhow::anyhow!("{what} failed ({status}): {message}")
}

async fn send_message(client: &Client, endpoint: &str, message: &str) -> Result<String> {
    info!("Sending message to {}", endpoint);

    let response = client
        .post(format!("{endpoint}/api/chat"))
        .json(&ChatRequest {
            message: message.to_string(),
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(failure(response, "Chat").await);
    }
    let body: ChatResponse = response.json().await?;
    Ok(body.response)
}

async fn get_history(client: &Client, endpoint: &str, limit: Option<i64>) -> Result<HistoryResponse> {
    let mut request = client.get(format!("{endpoint}/api/history"));
    if let Some(limit) = limit {
        request = request.query(&[("limit", limit)]);
    }
    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(failure(response, "History").await);
    }
    Ok(response.json().await?)
}

async fn get_health(client: &Client, endpoint: &str) -> Result<HealthResponse> {
    let response = client.get(format!("{endpoint}/api/health")).send().await?;
    if !response.status().is_success() {
        return Err(failure(response, "Health check").await);
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn commands_use_colon_syntax() {
        assert_eq!(save_command("pessoal", "cor", "azul"), "/salvar pessoal:cor:azul");
        assert_eq!(recall_command("pessoal", "cor"), "/recuperar pessoal:cor");
    }

    #[test]
    fn cli_parses_history_limit() {
        let cli = Cli::try_parse_from(["laponia-cli", "history", "--limit", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::History { limit: Some(3) }));

        let cli = Cli::try_parse_from(["laponia-cli", "history", "--limit", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::History { limit: Some(-1) }));
    }

    #[tokio::test]
    async fn send_message_posts_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat")
                    .json_body(json!({"message": "/recuperar a:b"}));
                then.status(200).json_body(json!({"response": "Valor recuperado: c"}));
            })
            .await;

        let reply = send_message(&Client::new(), &server.base_url(), "/recuperar a:b")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Valor recuperado: c");
    }

    #[tokio::test]
    async fn server_errors_surface_error_field() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(500).json_body(json!({
                    "error": "Chatbot não inicializado corretamente",
                    "error_type": "ServiceUnavailable"
                }));
            })
            .await;

        let err = send_message(&Client::new(), &server.base_url(), "oi")
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Chatbot não inicializado corretamente"));
    }

    #[tokio::test]
    async fn history_sends_limit_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/history")
                    .query_param("limit", "2");
                then.status(200).json_body(json!({"history": [
                    {"user_message": "oi", "ai_response": "olá"}
                ]}));
            })
            .await;

        let history = get_history(&Client::new(), &server.base_url(), Some(2))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(history.history[0].ai_response, "olá");
    }

    #[tokio::test]
    async fn health_failure_surfaces_error_field() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/health");
                then.status(503).json_body(json!({
                    "error": "database locked",
                    "error_type": "DatabaseError"
                }));
            })
            .await;

        let err = get_health(&Client::new(), &server.base_url())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("503"), "{err}");
        assert!(err.contains("database locked"), "{err}");
    }
}
