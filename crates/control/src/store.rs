use crate::migrations;
use laponia_models::{ChatError, Conversation, DataConfig, KnowledgeEntry};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// SQLite-backed storage for conversations and the knowledge base.
#[derive(Clone)]
pub struct ChatStore {
    pool: SqlitePool,
}

impl ChatStore {
    /// Open (creating if needed) the database at `config.db_url` and apply
    /// migrations.
    pub async fn connect(config: &DataConfig) -> Result<Self, ChatError> {
        let options = SqliteConnectOptions::from_str(&config.db_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        // An in-memory database lives and dies with its single connection.
        let pool = if is_in_memory(&config.db_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections.max(1))
                .connect_with(options)
                .await?
        };

        info!("Database connected: {}", config.db_url);
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, ChatError> {
        migrations::run_migrations(&pool)
            .await
            .map_err(|e| ChatError::Database {
                reason: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[instrument(skip(self, user_message, ai_response))]
    pub async fn save_conversation(
        &self,
        user_message: &str,
        ai_response: &str,
    ) -> Result<(), ChatError> {
        sqlx::query("INSERT INTO conversations (user_message, ai_response) VALUES (?, ?)")
            .bind(user_message)
            .bind(ai_response)
            .execute(&self.pool)
            .await?;
        debug!("Conversation saved");
        Ok(())
    }

    /// Insert or replace the value stored under `(category, key)`.
    #[instrument(skip(self, value))]
    pub async fn save_knowledge(
        &self,
        category: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ChatError> {
        sqlx::query("INSERT OR REPLACE INTO knowledge (category, key, value) VALUES (?, ?, ?)")
            .bind(category)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_knowledge_entry(
        &self,
        category: &str,
        key: &str,
    ) -> Result<Option<KnowledgeEntry>, ChatError> {
        let entry = sqlx::query_as::<_, KnowledgeEntry>(
            "SELECT category, key, value FROM knowledge WHERE category = ? AND key = ?",
        )
        .bind(category)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    pub async fn get_knowledge(&self, category: &str, key: &str) -> Result<Option<String>, ChatError> {
        Ok(self
            .get_knowledge_entry(category, key)
            .await?
            .map(|entry| entry.value))
    }

    /// Most recent conversations first. A negative `limit` returns every row.
    #[instrument(skip(self))]
    pub async fn recent_conversations(&self, limit: i64) -> Result<Vec<Conversation>, ChatError> {
        let rows = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_message, ai_response, timestamp FROM conversations \
             ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// `(user_message, ai_response)` pairs, newest first.
    pub async fn conversation_history(&self, limit: i64) -> Result<Vec<(String, String)>, ChatError> {
        Ok(self
            .recent_conversations(limit)
            .await?
            .into_iter()
            .map(|c| (c.user_message, c.ai_response))
            .collect())
    }

    pub async fn conversation_count(&self) -> Result<i64, ChatError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM conversations")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }
}

fn is_in_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

/// Filesystem path of a `sqlite:` URL, or `None` for in-memory databases.
pub fn database_path(db_url: &str) -> Option<&Path> {
    if is_in_memory(db_url) {
        return None;
    }
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        None
    } else {
        Some(Path::new(path))
    }
}
