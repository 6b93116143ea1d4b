//! Session Repository
//!
//! Handles all database operations related to respondent sessions.

use sqlx::{Executor, Sqlite, SqlitePool};
use survey_core::domain::role::Role;
use survey_core::domain::session::{Session, SessionStatus};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, link_id, role, fingerprint, status, started_at, last_activity_at, completed_at
    FROM sessions
"#;

/// Create a new in-progress session
pub async fn create<'e, E>(
    executor: E,
    link_id: Uuid,
    role: Role,
    fingerprint: &str,
) -> Result<Session, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let session = Session {
        id,
        link_id,
        role,
        fingerprint: fingerprint.to_string(),
        status: SessionStatus::InProgress,
        started_at: now,
        last_activity_at: now,
        completed_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO sessions (id, link_id, role, fingerprint, status, started_at, last_activity_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(link_id)
    .bind(role.as_str())
    .bind(fingerprint)
    .bind(SessionStatus::InProgress.as_str())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(session)
}

/// Find a session by ID
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.into()))
}

/// Most recent in-progress session for a link and fingerprint
pub async fn find_in_progress(
    pool: &SqlitePool,
    link_id: Uuid,
    fingerprint: &str,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "{SELECT_COLUMNS} WHERE link_id = ? AND fingerprint = ? AND status = ? \
         ORDER BY last_activity_at DESC LIMIT 1"
    ))
    .bind(link_id)
    .bind(fingerprint)
    .bind(SessionStatus::InProgress.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all sessions, newest first
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Session>, sqlx::Error> {
    let query = format!("{SELECT_COLUMNS} ORDER BY started_at DESC");
    let rows = sqlx::query_as::<_, SessionRow>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// List sessions started from one link, newest first
pub async fn find_by_link(pool: &SqlitePool, link_id: Uuid) -> Result<Vec<Session>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SessionRow>(&format!(
        "{SELECT_COLUMNS} WHERE link_id = ? ORDER BY started_at DESC"
    ))
    .bind(link_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Record respondent activity
pub async fn touch(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE sessions SET last_activity_at = ? WHERE id = ?")
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Mark a session completed; returns false if it was not in progress
pub async fn mark_completed(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET status = ?, completed_at = ?, last_activity_at = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(SessionStatus::Completed.as_str())
    .bind(now)
    .bind(now)
    .bind(id)
    .bind(SessionStatus::InProgress.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn string_to_status(s: &str) -> SessionStatus {
    match s {
        "Completed" => SessionStatus::Completed,
        _ => SessionStatus::InProgress,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    link_id: Uuid,
    role: String,
    fingerprint: String,
    status: String,
    started_at: chrono::DateTime<chrono::Utc>,
    last_activity_at: chrono::DateTime<chrono::Utc>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            link_id: row.link_id,
            role: row.role.parse().unwrap_or(Role::Nurse),
            fingerprint: row.fingerprint,
            status: string_to_status(&row.status),
            started_at: row.started_at,
            last_activity_at: row.last_activity_at,
            completed_at: row.completed_at,
        }
    }
}
