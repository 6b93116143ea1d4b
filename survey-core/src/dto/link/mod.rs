//! Distribution link DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::link::{DistributionLink, LinkStatus};
use crate::domain::role::Role;

/// Request to create a new distribution link; the code is generated server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLink {
    pub role: Role,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_uses: Option<u32>,
}

/// Admin view of a link with its computed status and shareable URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSummary {
    #[serde(flatten)]
    pub link: DistributionLink,
    pub status: LinkStatus,
    pub url: String,
}

/// What a respondent learns about a link before starting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLinkInfo {
    pub code: String,
    pub role: Role,
    pub status: LinkStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&DistributionLink> for PublicLinkInfo {
    fn from(link: &DistributionLink) -> Self {
        Self {
            code: link.code.clone(),
            role: link.role,
            status: link.status(),
            expires_at: link.expires_at,
        }
    }
}

/// Query filter for session listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFilter {
    pub link_id: Option<Uuid>,
}
