use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to an in-memory database gets its own empty database,
    // so keep exactly one connection alive for the lifetime of the pool.
    if database_url.contains(":memory:") {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create questions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id BLOB PRIMARY KEY,
            text TEXT NOT NULL,
            description TEXT,
            question_type TEXT NOT NULL,
            audience TEXT NOT NULL,
            options TEXT NOT NULL DEFAULT '[]',
            scale_min INTEGER,
            scale_max INTEGER,
            required BOOLEAN NOT NULL DEFAULT 0,
            allow_audio BOOLEAN NOT NULL DEFAULT 0,
            display_order INTEGER NOT NULL,
            conditions TEXT NOT NULL DEFAULT '[]',
            active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create distribution links table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS links (
            id BLOB PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL,
            label TEXT NOT NULL DEFAULT '',
            expires_at TEXT,
            max_uses INTEGER,
            use_count INTEGER NOT NULL DEFAULT 0,
            active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id BLOB PRIMARY KEY,
            link_id BLOB NOT NULL REFERENCES links(id) ON DELETE CASCADE,
            role TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            status TEXT NOT NULL,
            started_at TEXT NOT NULL,
            last_activity_at TEXT NOT NULL,
            completed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create responses table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            id BLOB PRIMARY KEY,
            session_id BLOB NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            question_id BLOB NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            value TEXT NOT NULL,
            audio_mime_type TEXT,
            audio_size INTEGER,
            audio_data BLOB,
            answered_at TEXT NOT NULL,
            UNIQUE (session_id, question_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_questions_order ON questions(display_order)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sessions_resume ON sessions(link_id, fingerprint, status)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_responses_session ON responses(session_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// In-memory database with the schema applied, for tests
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:")
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}
