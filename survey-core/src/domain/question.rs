//! Question domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::role::Audience;

/// Survey question definition
///
/// Structure shared between server (persists) and client (renders).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub description: Option<String>,
    pub question_type: QuestionType,
    pub audience: Audience,
    pub options: Vec<String>,
    pub scale: Option<ScaleRange>,
    pub required: bool,
    pub allow_audio: bool,
    pub display_order: i64,
    pub conditions: Vec<QuestionCondition>,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Kind of answer a question expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    SingleChoice,
    MultipleChoice,
    YesNo,
    Number,
    Scale,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::YesNo => "yes_no",
            QuestionType::Number => "number",
            QuestionType::Scale => "scale",
        }
    }

    /// Whether the question is answered by picking from `options`
    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }

    /// Whether answers fall into a small set of values worth counting
    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice
                | QuestionType::MultipleChoice
                | QuestionType::YesNo
                | QuestionType::Scale
        )
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "text" => Ok(QuestionType::Text),
            "single_choice" | "single" => Ok(QuestionType::SingleChoice),
            "multiple_choice" | "multiple" => Ok(QuestionType::MultipleChoice),
            "yes_no" | "yesno" => Ok(QuestionType::YesNo),
            "number" => Ok(QuestionType::Number),
            "scale" => Ok(QuestionType::Scale),
            other => Err(format!("unknown question type '{}'", other)),
        }
    }
}

/// Inclusive bounds of a scale question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: i64,
    pub max: i64,
}

impl ScaleRange {
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

/// Rule deciding whether a question is shown, based on a prior answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCondition {
    pub question_id: Uuid,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: String,
}

/// Comparison applied by a [`QuestionCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsAnswered,
    IsNotAnswered,
}

impl ConditionOperator {
    /// Operators that only look at whether an answer exists
    pub fn ignores_value(&self) -> bool {
        matches!(
            self,
            ConditionOperator::IsAnswered | ConditionOperator::IsNotAnswered
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::IsAnswered => "is_answered",
            ConditionOperator::IsNotAnswered => "is_not_answered",
        }
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "equals" | "eq" | "==" => Ok(ConditionOperator::Equals),
            "not_equals" | "ne" | "!=" => Ok(ConditionOperator::NotEquals),
            "contains" => Ok(ConditionOperator::Contains),
            "not_contains" => Ok(ConditionOperator::NotContains),
            "greater_than" | "gt" | ">" => Ok(ConditionOperator::GreaterThan),
            "less_than" | "lt" | "<" => Ok(ConditionOperator::LessThan),
            "is_answered" => Ok(ConditionOperator::IsAnswered),
            "is_not_answered" => Ok(ConditionOperator::IsNotAnswered),
            other => Err(format!("unknown condition operator '{}'", other)),
        }
    }
}
