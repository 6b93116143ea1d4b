//! Distribution link domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::role::Role;

/// Shareable tracking code mapping to a survey entry point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionLink {
    pub id: Uuid,
    pub code: String,
    pub role: Role,
    pub label: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<u32>,
    pub use_count: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Whether a link can start new sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Inactive,
    Expired,
    Exhausted,
}

impl LinkStatus {
    pub fn is_usable(&self) -> bool {
        *self == LinkStatus::Active
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Active => "active",
            LinkStatus::Inactive => "inactive",
            LinkStatus::Expired => "expired",
            LinkStatus::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DistributionLink {
    /// Status of the link at `now`, reporting the first failing check
    pub fn status_at(&self, now: DateTime<Utc>) -> LinkStatus {
        if !self.active {
            return LinkStatus::Inactive;
        }

        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return LinkStatus::Expired;
            }
        }

        if let Some(max_uses) = self.max_uses {
            if self.use_count >= max_uses {
                return LinkStatus::Exhausted;
            }
        }

        LinkStatus::Active
    }

    pub fn status(&self) -> LinkStatus {
        self.status_at(Utc::now())
    }

    /// Uses left before the cap is reached, `None` when uncapped
    pub fn remaining_uses(&self) -> Option<u32> {
        self.max_uses.map(|max| max.saturating_sub(self.use_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link() -> DistributionLink {
        DistributionLink {
            id: Uuid::new_v4(),
            code: "ABCD2345".to_string(),
            role: Role::Nurse,
            label: "Ward 3".to_string(),
            expires_at: None,
            max_uses: None,
            use_count: 0,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_uncapped_link_is_active() {
        let link = link();
        assert_eq!(link.status(), LinkStatus::Active);
        assert_eq!(link.remaining_uses(), None);
    }

    #[test]
    fn test_inactive_wins_over_expired() {
        let mut link = link();
        link.active = false;
        link.expires_at = Some(Utc::now() - Duration::hours(1));
        assert_eq!(link.status(), LinkStatus::Inactive);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let mut link = link();
        link.expires_at = Some(now);
        assert_eq!(link.status_at(now), LinkStatus::Expired);
        assert_eq!(
            link.status_at(now - Duration::seconds(1)),
            LinkStatus::Active
        );
    }

    #[test]
    fn test_usage_cap() {
        let mut link = link();
        link.max_uses = Some(2);
        link.use_count = 1;
        assert_eq!(link.status(), LinkStatus::Active);
        assert_eq!(link.remaining_uses(), Some(1));

        link.use_count = 2;
        assert_eq!(link.status(), LinkStatus::Exhausted);
        assert_eq!(link.remaining_uses(), Some(0));
    }
}
