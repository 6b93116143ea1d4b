//! Session DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::question::Question;
use crate::domain::role::Role;
use crate::domain::session::SessionStatus;
use crate::fingerprint::FingerprintComponents;

/// Request to start (or resume) a session from a link code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartSession {
    #[serde(default)]
    pub fingerprint: FingerprintComponents,
}

/// Reconstructed state of a session: what to show and where the respondent is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProgress {
    pub session_id: Uuid,
    pub role: Role,
    pub status: SessionStatus,
    /// Questions currently visible to the respondent, in display order
    pub questions: Vec<Question>,
    pub answered_question_ids: Vec<Uuid>,
    pub current_question_id: Option<Uuid>,
    pub current_index: usize,
    pub total: usize,
    pub progress_percent: u8,
    pub can_complete: bool,
}

/// Result of a start request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedSession {
    /// `true` when an in-progress session was picked up instead of creating one
    pub resumed: bool,
    pub progress: SessionProgress,
}
