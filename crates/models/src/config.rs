use crate::ChatError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Files probed, in order, when `LAPONIA_CONFIG` is not set.
const CONFIG_PATHS: [&str; 2] = ["configs/default.toml", "config/config.toml"];

/// `LAPONIA_*` variables that belong to other consumers: the config file
/// selector and the CLI's `LAPONIA_ENDPOINT`.
const NON_CONFIG_ENV: [&str; 2] = ["config", "endpoint"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub completions: CompletionsConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_request_body_size_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub db_url: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CompletionsConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    pub system_prompt: String,
    pub context_turns: u32,
    pub default_history_limit: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 5000,
                max_request_body_size_mb: 1,
            },
            data: DataConfig {
                db_url: "sqlite://chatbot.db".to_string(),
                max_connections: 5,
                busy_timeout_ms: 20_000,
            },
            completions: CompletionsConfig {
                api_key: None,
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "llama3-8b-8192".to_string(),
                timeout_ms: 60_000,
            },
            chat: ChatConfig {
                system_prompt: "Você é um assistente de IA. Seu nome é Laponia. \
                                Responda às perguntas do usuário da melhor forma possível."
                    .to_string(),
                context_turns: 2,
                default_history_limit: 10,
            },
            logging: LoggingConfig {
                format: LogFormat::Pretty,
                filter: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load `.env`, then layer defaults, the config file, `LAPONIA_*`
    /// variables and the bare `PORT` / `GROQ_API_KEY` variables.
    pub fn load() -> Result<Self, ChatError> {
        dotenvy::dotenv().ok();
        Self::figment()
            .extract()
            .map_err(|e| ChatError::Config {
                reason: e.to_string(),
            })
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_file() {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("LAPONIA_").ignore(&NON_CONFIG_ENV).split("__"))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(
                Env::raw()
                    .only(&["GROQ_API_KEY"])
                    .map(|_| "completions.api_key".into()),
            )
    }

    /// Address the API listens on, e.g. `0.0.0.0:5000`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

fn config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("LAPONIA_CONFIG") {
        return Some(PathBuf::from(path));
    }
    CONFIG_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_bind_public_port_5000() {
        Jail::expect_with(|_| {
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.bind_addr(), "0.0.0.0:5000");
            assert_eq!(config.completions.model, "llama3-8b-8192");
            assert_eq!(config.completions.api_key, None);
            assert_eq!(config.chat.context_turns, 2);
            Ok(())
        });
    }

    #[test]
    fn toml_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_dir("configs")?;
            jail.create_file(
                "configs/default.toml",
                r#"
                [server]
                bind = "127.0.0.1"
                port = 7000
                max_request_body_size_mb = 2

                [chat]
                system_prompt = "be brief"
                context_turns = 4
                default_history_limit = 20
                "#,
            )?;
            jail.set_env("LAPONIA_SERVER__PORT", "7100");
            jail.set_env("LAPONIA_LOGGING__FORMAT", "json");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.server.bind, "127.0.0.1");
            assert_eq!(config.server.port, 7100);
            assert_eq!(config.chat.system_prompt, "be brief");
            assert_eq!(config.chat.context_turns, 4);
            assert_eq!(config.logging.format, LogFormat::Json);
            // untouched sections keep their defaults
            assert_eq!(config.data.db_url, "sqlite://chatbot.db");
            Ok(())
        });
    }

    #[test]
    fn bare_port_and_groq_key_are_honoured() {
        Jail::expect_with(|jail| {
            jail.set_env("PORT", "8080");
            jail.set_env("GROQ_API_KEY", "gsk_test");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.completions.api_key.as_deref(), Some("gsk_test"));
            Ok(())
        });
    }

    #[test]
    fn explicit_config_path_wins_over_probing() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[data]\ndb_url = \"sqlite://custom.db\"\nmax_connections = 1\nbusy_timeout_ms = 10")?;
            jail.set_env("LAPONIA_CONFIG", "custom.toml");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.data.db_url, "sqlite://custom.db");
            assert_eq!(config.data.max_connections, 1);
            Ok(())
        });
    }

    #[test]
    fn cli_endpoint_variable_is_not_config() {
        Jail::expect_with(|jail| {
            jail.set_env("LAPONIA_ENDPOINT", "http://localhost:5000");
            jail.set_env("LAPONIA_SERVER__PORT", "7200");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.server.port, 7200);
            assert_eq!(config.data, Config::default().data);
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("LAPONIA_SERVER__PROT", "1");
            assert!(Config::figment().extract::<Config>().is_err());
            Ok(())
        });
    }
}
