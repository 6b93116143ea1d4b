//! Question DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::question::{QuestionCondition, QuestionType, ScaleRange};
use crate::domain::role::Audience;

/// Request to create (or fully replace) a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestion {
    pub text: String,
    #[serde(default)]
    pub description: Option<String>,
    pub question_type: QuestionType,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub scale: Option<ScaleRange>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allow_audio: bool,
    /// Position in the survey; appended after the last question when absent
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub conditions: Vec<QuestionCondition>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Request to rewrite the display order of questions
///
/// Questions are renumbered in the given order; questions not listed keep
/// their relative order after the listed ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderQuestions {
    pub question_ids: Vec<Uuid>,
}
