//! Answer submission DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer submitted by a respondent for one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswer {
    pub question_id: Uuid,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub audio: Option<AudioUpload>,
}

/// Audio recording sent inline with an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioUpload {
    pub mime_type: String,
    /// Standard base64 encoding of the recording
    pub data: String,
}
