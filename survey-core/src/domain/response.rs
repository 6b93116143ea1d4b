//! Response (answer) domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A respondent's answer to one question within a session
///
/// There is at most one response per (session, question); answering again
/// replaces it. A `null` value records an explicit skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub value: serde_json::Value,
    pub audio: Option<AudioAttachment>,
    pub answered_at: DateTime<Utc>,
}

impl Response {
    /// Whether the response carries an actual answer rather than a skip
    pub fn has_content(&self) -> bool {
        !self.value.is_null() || self.audio.is_some()
    }
}

/// Metadata of a recorded audio answer; the bytes are fetched separately
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAttachment {
    pub mime_type: String,
    pub size_bytes: u64,
}
