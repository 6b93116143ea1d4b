//! Response Repository
//!
//! Handles all database operations related to answers and their audio.

use sqlx::SqlitePool;
use sqlx::types::Json;
use survey_core::domain::response::{AudioAttachment, Response};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, session_id, question_id, value, audio_mime_type, audio_size, answered_at
    FROM responses
"#;

/// Recorded audio to store next to an answer
pub struct AudioBlob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Insert or replace the answer of a session to a question
pub async fn upsert(
    pool: &SqlitePool,
    session_id: Uuid,
    question_id: Uuid,
    value: &serde_json::Value,
    audio: Option<&AudioBlob>,
) -> Result<Response, sqlx::Error> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO responses (
            id, session_id, question_id, value, audio_mime_type, audio_size, audio_data, answered_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (session_id, question_id) DO UPDATE SET
            value = excluded.value,
            audio_mime_type = excluded.audio_mime_type,
            audio_size = excluded.audio_size,
            audio_data = excluded.audio_data,
            answered_at = excluded.answered_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(question_id)
    .bind(Json(value))
    .bind(audio.map(|a| a.mime_type.as_str()))
    .bind(audio.map(|a| a.data.len() as i64))
    .bind(audio.map(|a| a.data.as_slice()))
    .bind(now)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, ResponseRow>(&format!(
        "{SELECT_COLUMNS} WHERE session_id = ? AND question_id = ?"
    ))
    .bind(session_id)
    .bind(question_id)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// All responses of a session, oldest first
pub async fn find_by_session(
    pool: &SqlitePool,
    session_id: Uuid,
) -> Result<Vec<Response>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ResponseRow>(&format!(
        "{SELECT_COLUMNS} WHERE session_id = ? ORDER BY answered_at ASC"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Every response, for aggregation
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Response>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ResponseRow>(SELECT_COLUMNS)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Audio recorded for a session's answer to a question, if any
pub async fn find_audio(
    pool: &SqlitePool,
    session_id: Uuid,
    question_id: Uuid,
) -> Result<Option<AudioBlob>, sqlx::Error> {
    let row: Option<(Option<String>, Option<Vec<u8>>)> = sqlx::query_as(
        r#"
        SELECT audio_mime_type, audio_data
        FROM responses
        WHERE session_id = ? AND question_id = ?
        "#,
    )
    .bind(session_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((Some(mime_type), Some(data))) => Some(AudioBlob { mime_type, data }),
        _ => None,
    })
}

/// Number of stored answers to a question
pub async fn count_for_question(pool: &SqlitePool, question_id: Uuid) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM responses WHERE question_id = ?")
        .bind(question_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ResponseRow {
    id: Uuid,
    session_id: Uuid,
    question_id: Uuid,
    value: Json<serde_json::Value>,
    audio_mime_type: Option<String>,
    audio_size: Option<i64>,
    answered_at: chrono::DateTime<chrono::Utc>,
}

impl From<ResponseRow> for Response {
    fn from(row: ResponseRow) -> Self {
        let audio = match (row.audio_mime_type, row.audio_size) {
            (Some(mime_type), Some(size)) => Some(AudioAttachment {
                mime_type,
                size_bytes: size.max(0) as u64,
            }),
            _ => None,
        };

        Response {
            id: row.id,
            session_id: row.session_id,
            question_id: row.question_id,
            value: row.value.0,
            audio,
            answered_at: row.answered_at,
        }
    }
}
