//! Survey statistics DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::question::QuestionType;

/// Aggregated results across sessions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyStats {
    pub sessions_started: u64,
    pub sessions_completed: u64,
    pub sessions_in_progress: u64,
    /// Completed sessions as a percentage of started ones
    pub completion_rate: f64,
    pub questions: Vec<QuestionStats>,
}

/// Per-question answer counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub answer_count: u64,
    pub skip_count: u64,
    pub audio_count: u64,
    /// Value counts for categorical questions; empty otherwise
    pub distribution: BTreeMap<String, u64>,
}
