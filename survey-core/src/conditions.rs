//! Question visibility engine
//!
//! A question is shown when every one of its conditions holds against the
//! answers given so far (conditions are AND-combined, an empty list means
//! always shown). Visibility for a whole survey is decided in a single pass
//! over the questions in display order: answers to questions that are hidden,
//! or that come later in the pass, count as unanswered. Hidden branches
//! therefore cascade, and evaluation never loops.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::question::{ConditionOperator, Question, QuestionCondition};
use crate::domain::response::Response;
use crate::domain::role::Role;

/// Answers keyed by question id
pub type Answers<'a> = HashMap<Uuid, &'a Value>;

/// Index a session's responses by question id
pub fn answers_from_responses(responses: &[Response]) -> Answers<'_> {
    responses
        .iter()
        .map(|r| (r.question_id, &r.value))
        .collect()
}

/// Evaluate one condition against the answer to the question it references
pub fn evaluate(condition: &QuestionCondition, answer: Option<&Value>) -> bool {
    let answer = answer.filter(|v| !is_unanswered(v));

    let Some(answer) = answer else {
        return condition.operator == ConditionOperator::IsNotAnswered;
    };

    let expected = condition.value.trim();

    match condition.operator {
        ConditionOperator::IsAnswered => true,
        ConditionOperator::IsNotAnswered => false,
        ConditionOperator::Equals => matches_value(answer, expected),
        ConditionOperator::NotEquals => !matches_value(answer, expected),
        ConditionOperator::Contains => contains_value(answer, expected),
        ConditionOperator::NotContains => !contains_value(answer, expected),
        ConditionOperator::GreaterThan => {
            compare_numbers(answer, expected).is_some_and(|(a, b)| a > b)
        }
        ConditionOperator::LessThan => {
            compare_numbers(answer, expected).is_some_and(|(a, b)| a < b)
        }
    }
}

/// Whether a question is shown given the answers reached so far
pub fn is_visible(question: &Question, answers: &Answers<'_>) -> bool {
    question
        .conditions
        .iter()
        .all(|c| evaluate(c, answers.get(&c.question_id).copied()))
}

/// Questions shown to a respondent of `role`, in display order
///
/// Inactive questions and questions for another audience are skipped
/// entirely. Only answers of questions already found visible earlier in the
/// pass are considered when evaluating later conditions.
pub fn visible_questions<'q>(
    questions: &'q [Question],
    role: Role,
    answers: &Answers<'_>,
) -> Vec<&'q Question> {
    let mut ordered: Vec<&Question> = questions
        .iter()
        .filter(|q| q.active && q.audience.includes(role))
        .collect();
    ordered.sort_by_key(|q| (q.display_order, q.created_at));

    let mut reached: Answers<'_> = HashMap::new();
    let mut visible = Vec::with_capacity(ordered.len());

    for question in ordered {
        if !is_visible(question, &reached) {
            continue;
        }

        if let Some(&answer) = answers.get(&question.id) {
            reached.insert(question.id, answer);
        }
        visible.push(question);
    }

    visible
}

/// `null`, blank strings and empty arrays are treated as no answer
pub fn is_unanswered(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

// =============================================================================
// Comparisons
// =============================================================================

fn normalize(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_lowercase()),
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn scalar_equals(answer: &Value, expected: &str) -> bool {
    if let (Some(a), Ok(b)) = (as_number(answer), expected.parse::<f64>()) {
        return a == b;
    }

    normalize(answer).is_some_and(|a| a == expected.to_lowercase())
}

fn matches_value(answer: &Value, expected: &str) -> bool {
    match answer {
        Value::Array(items) => items.iter().any(|item| scalar_equals(item, expected)),
        _ => scalar_equals(answer, expected),
    }
}

fn contains_value(answer: &Value, expected: &str) -> bool {
    match answer {
        Value::Array(items) => items.iter().any(|item| scalar_equals(item, expected)),
        _ => normalize(answer).is_some_and(|a| a.contains(&expected.to_lowercase())),
    }
}

fn compare_numbers(answer: &Value, expected: &str) -> Option<(f64, f64)> {
    let a = as_number(answer)?;
    let b = expected.parse::<f64>().ok().filter(|n| n.is_finite())?;
    Some((a, b))
}

// =============================================================================
// Authoring Validation
// =============================================================================

/// Reasons a question's conditions cannot be saved
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("a question cannot depend on its own answer")]
    SelfReference,

    #[error("condition references unknown question {0}")]
    UnknownQuestion(Uuid),

    #[error("condition references question {0}, which is not ordered before this one")]
    NotEarlier(Uuid),

    #[error("operator '{0}' needs a comparison value")]
    MissingValue(&'static str),

    #[error("operator '{0}' needs a numeric comparison value, got '{1}'")]
    NonNumericValue(&'static str, String),
}

/// Check that conditions only point at distinct, existing, earlier questions
///
/// `question_id` is the id of the question being updated (absent on create);
/// `display_order` is its position. `existing` holds every other question.
pub fn validate_conditions(
    question_id: Option<Uuid>,
    display_order: i64,
    conditions: &[QuestionCondition],
    existing: &[Question],
) -> Result<(), ConditionError> {
    for condition in conditions {
        if Some(condition.question_id) == question_id {
            return Err(ConditionError::SelfReference);
        }

        let target = existing
            .iter()
            .find(|q| q.id == condition.question_id)
            .ok_or(ConditionError::UnknownQuestion(condition.question_id))?;

        if target.display_order >= display_order {
            return Err(ConditionError::NotEarlier(target.id));
        }

        let operator = condition.operator;
        let value = condition.value.trim();

        if !operator.ignores_value() && value.is_empty() {
            return Err(ConditionError::MissingValue(operator.as_str()));
        }

        if matches!(
            operator,
            ConditionOperator::GreaterThan | ConditionOperator::LessThan
        ) && value.parse::<f64>().is_err()
        {
            return Err(ConditionError::NonNumericValue(
                operator.as_str(),
                value.to_string(),
            ));
        }
    }

    Ok(())
}
