//! Question Repository
//!
//! Handles all database operations related to questions.

use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool, Transaction};
use survey_core::domain::question::{Question, QuestionCondition, QuestionType, ScaleRange};
use survey_core::domain::role::Audience;
use survey_core::dto::question::CreateQuestion;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, text, description, question_type, audience, options, scale_min, scale_max,
           required, allow_audio, display_order, conditions, active, created_at, updated_at
    FROM questions
"#;

/// Create a new question in the database
pub async fn create(
    pool: &SqlitePool,
    req: &CreateQuestion,
    display_order: i64,
) -> Result<Question, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let question = Question {
        id,
        text: req.text.trim().to_string(),
        description: req.description.clone(),
        question_type: req.question_type,
        audience: req.audience,
        options: req.options.clone(),
        scale: req.scale,
        required: req.required,
        allow_audio: req.allow_audio,
        display_order,
        conditions: req.conditions.clone(),
        active: req.active,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO questions (
            id, text, description, question_type, audience, options, scale_min, scale_max,
            required, allow_audio, display_order, conditions, active, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&question.text)
    .bind(&question.description)
    .bind(question.question_type.as_str())
    .bind(question.audience.as_str())
    .bind(Json(&question.options))
    .bind(question.scale.map(|s| s.min))
    .bind(question.scale.map(|s| s.max))
    .bind(question.required)
    .bind(question.allow_audio)
    .bind(display_order)
    .bind(Json(&question.conditions))
    .bind(question.active)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(question)
}

/// Find a question by ID
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Question>, sqlx::Error> {
    let row = sqlx::query_as::<_, QuestionRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.into()))
}

/// List all questions in display order
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Question>, sqlx::Error> {
    let rows = sqlx::query_as::<_, QuestionRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY display_order ASC, created_at ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Replace a question's definition
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    req: &CreateQuestion,
    display_order: i64,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE questions
        SET text = ?, description = ?, question_type = ?, audience = ?, options = ?,
            scale_min = ?, scale_max = ?, required = ?, allow_audio = ?, display_order = ?,
            conditions = ?, active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(req.text.trim())
    .bind(&req.description)
    .bind(req.question_type.as_str())
    .bind(req.audience.as_str())
    .bind(Json(&req.options))
    .bind(req.scale.map(|s| s.min))
    .bind(req.scale.map(|s| s.max))
    .bind(req.required)
    .bind(req.allow_audio)
    .bind(display_order)
    .bind(Json(&req.conditions))
    .bind(req.active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the display order of one question inside a transaction
pub async fn set_display_order(
    tx: &mut Transaction<'_, Sqlite>,
    id: Uuid,
    display_order: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE questions SET display_order = ?, updated_at = ? WHERE id = ?")
        .bind(display_order)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Delete a question by ID
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    text: String,
    description: Option<String>,
    question_type: String,
    audience: String,
    options: Json<Vec<String>>,
    scale_min: Option<i64>,
    scale_max: Option<i64>,
    required: bool,
    allow_audio: bool,
    display_order: i64,
    conditions: Json<Vec<QuestionCondition>>,
    active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        let scale = match (row.scale_min, row.scale_max) {
            (Some(min), Some(max)) => Some(ScaleRange { min, max }),
            _ => None,
        };

        Question {
            id: row.id,
            text: row.text,
            description: row.description,
            question_type: row.question_type.parse().unwrap_or(QuestionType::Text),
            audience: row.audience.parse().unwrap_or(Audience::All),
            options: row.options.0,
            scale,
            required: row.required,
            allow_audio: row.allow_audio,
            display_order: row.display_order,
            conditions: row.conditions.0,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
