use sqlx::{Pool, Sqlite};
use tracing::info;

/// Embedded migration scripts
const MIGRATION_001_CONVERSATIONS: &str = include_str!("../migrations/001_conversations.sql");
const MIGRATION_002_KNOWLEDGE: &str = include_str!("../migrations/002_knowledge.sql");

/// Run all embedded migrations. Every script is idempotent.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    info!("Running migration 001: Conversations");
    sqlx::query(MIGRATION_001_CONVERSATIONS)
        .execute(pool)
        .await?;

    info!("Running migration 002: Knowledge");
    sqlx::query(MIGRATION_002_KNOWLEDGE).execute(pool).await?;

    info!("All migrations completed successfully");
    Ok(())
}
