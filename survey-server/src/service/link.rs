//! Link Service
//!
//! Business logic for distribution links: code generation, usage caps and
//! the shareable URL / placeholder QR rendering.

use chrono::Utc;
use sqlx::SqlitePool;
use survey_core::domain::link::DistributionLink;
use survey_core::dto::link::{CreateLink, LinkSummary};
use survey_core::link_code;
use survey_core::qr::{self, SvgOptions};
use uuid::Uuid;

use crate::repository::link_repository;

/// Attempts at finding an unused code before giving up
const CODE_ATTEMPTS: usize = 5;

/// Service error type
#[derive(Debug)]
pub enum LinkError {
    NotFound(Uuid),
    CodeNotFound(String),
    ValidationError(String),
    CodeGenerationFailed,
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for LinkError {
    fn from(err: sqlx::Error) -> Self {
        LinkError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Create a new link with a fresh tracking code
pub async fn create_link(
    pool: &SqlitePool,
    req: CreateLink,
    code_length: usize,
) -> Result<DistributionLink> {
    validate_link_request(&req)?;

    let mut code = None;
    for _ in 0..CODE_ATTEMPTS {
        let candidate = link_code::generate(code_length);
        if !link_repository::code_exists(pool, &candidate).await? {
            code = Some(candidate);
            break;
        }
        tracing::debug!("Link code collision on {}, retrying", candidate);
    }
    let code = code.ok_or(LinkError::CodeGenerationFailed)?;

    let link = link_repository::create(pool, &req, &code).await?;

    tracing::info!("Link created: {} ({}) for {}", link.code, link.id, link.role);

    Ok(link)
}

/// Get a link by ID
pub async fn get_link(pool: &SqlitePool, id: Uuid) -> Result<DistributionLink> {
    let link = link_repository::find_by_id(pool, id)
        .await?
        .ok_or(LinkError::NotFound(id))?;

    Ok(link)
}

/// Get a link by a user-supplied tracking code
pub async fn get_link_by_code(pool: &SqlitePool, code: &str) -> Result<DistributionLink> {
    let normalized = link_code::normalize(code);

    if !link_code::is_valid(&normalized) {
        return Err(LinkError::CodeNotFound(normalized));
    }

    let link = link_repository::find_by_code(pool, &normalized)
        .await?
        .ok_or_else(|| LinkError::CodeNotFound(normalized.clone()))?;

    Ok(link)
}

/// List all links
pub async fn list_links(pool: &SqlitePool) -> Result<Vec<DistributionLink>> {
    let links = link_repository::list_all(pool).await?;
    Ok(links)
}

/// Stop a link from starting new sessions (existing sessions continue)
pub async fn deactivate_link(pool: &SqlitePool, id: Uuid) -> Result<DistributionLink> {
    let updated = link_repository::deactivate(pool, id).await?;

    if !updated {
        return Err(LinkError::NotFound(id));
    }

    tracing::info!("Link deactivated: {}", id);

    get_link(pool, id).await
}

/// Delete a link together with its sessions and responses
pub async fn delete_link(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let deleted = link_repository::delete(pool, id).await?;

    if !deleted {
        return Err(LinkError::NotFound(id));
    }

    tracing::info!("Link deleted: {}", id);

    Ok(())
}

/// Admin view of a link
pub fn summarize(link: DistributionLink, public_url: &str) -> LinkSummary {
    LinkSummary {
        status: link.status(),
        url: link_code::survey_url(public_url, &link.code),
        link,
    }
}

/// Placeholder QR pattern for the link's survey URL
pub fn qr_svg(link: &DistributionLink, public_url: &str) -> String {
    qr::render_svg(
        &link_code::survey_url(public_url, &link.code),
        &SvgOptions::default(),
    )
}

// =============================================================================
// Validation
// =============================================================================

fn validate_link_request(req: &CreateLink) -> Result<()> {
    if req.label.len() > 255 {
        return Err(LinkError::ValidationError(
            "Link label is too long (max 255 characters)".to_string(),
        ));
    }

    if let Some(expires_at) = req.expires_at {
        if expires_at <= Utc::now() {
            return Err(LinkError::ValidationError(
                "Link expiry must be in the future".to_string(),
            ));
        }
    }

    if req.max_uses == Some(0) {
        return Err(LinkError::ValidationError(
            "Link max uses must be at least 1".to_string(),
        ));
    }

    Ok(())
}
