//! Link Repository
//!
//! Handles all database operations related to distribution links.

use sqlx::{Executor, Sqlite, SqlitePool};
use survey_core::domain::link::DistributionLink;
use survey_core::domain::role::Role;
use survey_core::dto::link::CreateLink;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, code, role, label, expires_at, max_uses, use_count, active, created_at
    FROM links
"#;

/// Create a new link with an already generated code
pub async fn create(
    pool: &SqlitePool,
    req: &CreateLink,
    code: &str,
) -> Result<DistributionLink, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let link = DistributionLink {
        id,
        code: code.to_string(),
        role: req.role,
        label: req.label.trim().to_string(),
        expires_at: req.expires_at,
        max_uses: req.max_uses,
        use_count: 0,
        active: true,
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO links (id, code, role, label, expires_at, max_uses, use_count, active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 0, 1, ?)
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(link.role.as_str())
    .bind(&link.label)
    .bind(link.expires_at)
    .bind(link.max_uses.map(i64::from))
    .bind(now)
    .execute(pool)
    .await?;

    Ok(link)
}

/// Find a link by ID
pub async fn find_by_id(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<DistributionLink>, sqlx::Error> {
    let row = sqlx::query_as::<_, LinkRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.into()))
}

/// Find a link by its (normalized) tracking code
pub async fn find_by_code(
    pool: &SqlitePool,
    code: &str,
) -> Result<Option<DistributionLink>, sqlx::Error> {
    let row = sqlx::query_as::<_, LinkRow>(&format!("{SELECT_COLUMNS} WHERE code = ?"))
        .bind(code)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.into()))
}

/// Whether a code is already taken
pub async fn code_exists(pool: &SqlitePool, code: &str) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM links WHERE code = ?")
        .bind(code)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// List all links, newest first
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<DistributionLink>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LinkRow>(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Take one use of a link if it is active and below its cap
///
/// The check and the increment happen in one statement, so two respondents
/// racing for the last use cannot both get it.
pub async fn try_consume_use<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE links
        SET use_count = use_count + 1
        WHERE id = ? AND active = 1 AND (max_uses IS NULL OR use_count < max_uses)
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Mark a link inactive
pub async fn deactivate(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE links SET active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a link by ID (its sessions and responses cascade)
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM links WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    code: String,
    role: String,
    label: String,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    max_uses: Option<i64>,
    use_count: i64,
    active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<LinkRow> for DistributionLink {
    fn from(row: LinkRow) -> Self {
        DistributionLink {
            id: row.id,
            code: row.code,
            role: row.role.parse().unwrap_or(Role::Nurse),
            label: row.label,
            expires_at: row.expires_at,
            max_uses: row.max_uses.map(|m| m.max(0) as u32),
            use_count: row.use_count.max(0) as u32,
            active: row.active,
            created_at: row.created_at,
        }
    }
}
