//! Answer validation
//!
//! Checks a submitted value against its question and returns the normalized
//! value to persist.

use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::conditions::is_unanswered;
use crate::domain::question::{Question, QuestionType};

/// Audio MIME types accepted for recorded answers
pub const ALLOWED_AUDIO_TYPES: &[&str] = &[
    "audio/webm",
    "audio/ogg",
    "audio/mpeg",
    "audio/wav",
    "audio/mp4",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnswerError {
    #[error("an answer is required")]
    Required,

    #[error("this question does not accept audio")]
    AudioNotAllowed,

    #[error("unsupported audio type '{0}'")]
    UnsupportedAudioType(String),

    #[error("expected {expected}, got {got}")]
    WrongType { expected: &'static str, got: String },

    #[error("'{0}' is not one of the options")]
    UnknownOption(String),

    #[error("option '{0}' was selected more than once")]
    DuplicateOption(String),

    #[error("{value} is outside the scale {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },
}

/// Whether `mime_type` is an accepted audio type (parameters like `;codecs=` are ignored)
pub fn is_allowed_audio_type(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_AUDIO_TYPES.contains(&essence.as_str())
}

/// Validate and normalize an answer
///
/// `null`, blank strings and empty arrays are a skip: allowed for optional
/// questions, and for required questions only when audio accompanies an
/// audio-enabled question. Skips are normalized to `null`.
pub fn validate_answer(
    question: &Question,
    value: &Value,
    has_audio: bool,
) -> Result<Value, AnswerError> {
    if has_audio && !question.allow_audio {
        return Err(AnswerError::AudioNotAllowed);
    }

    if is_unanswered(value) {
        if question.required && !has_audio {
            return Err(AnswerError::Required);
        }
        return Ok(Value::Null);
    }

    match question.question_type {
        QuestionType::Text => match value {
            Value::String(s) => Ok(Value::String(s.trim().to_string())),
            other => Err(wrong_type("text", other)),
        },
        QuestionType::SingleChoice => {
            let choice = value.as_str().ok_or_else(|| wrong_type("one option", value))?;
            find_option(question, choice).map(Value::String)
        }
        QuestionType::MultipleChoice => {
            let items = value
                .as_array()
                .ok_or_else(|| wrong_type("a list of options", value))?;

            let mut seen = HashSet::new();
            let mut selected = Vec::with_capacity(items.len());
            for item in items {
                let choice = item.as_str().ok_or_else(|| wrong_type("an option", item))?;
                let option = find_option(question, choice)?;
                if !seen.insert(option.clone()) {
                    return Err(AnswerError::DuplicateOption(option));
                }
                selected.push(Value::String(option));
            }
            Ok(Value::Array(selected))
        }
        QuestionType::YesNo => match value {
            Value::Bool(b) => Ok(yes_no(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" => Ok(yes_no(true)),
                "no" | "false" => Ok(yes_no(false)),
                _ => Err(wrong_type("yes or no", value)),
            },
            other => Err(wrong_type("yes or no", other)),
        },
        QuestionType::Number => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| wrong_type("a number", value))?;

            serde_json::Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(|| wrong_type("a number", value))
        }
        QuestionType::Scale => {
            let point = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| wrong_type("a whole number", value))?;

            let range = question.scale.unwrap_or_default();
            if !range.contains(point) {
                return Err(AnswerError::OutOfRange {
                    value: point,
                    min: range.min,
                    max: range.max,
                });
            }
            Ok(Value::from(point))
        }
    }
}

fn yes_no(answer: bool) -> Value {
    Value::String(if answer { "yes" } else { "no" }.to_string())
}

fn find_option(question: &Question, choice: &str) -> Result<String, AnswerError> {
    let choice = choice.trim();
    question
        .options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(choice))
        .cloned()
        .ok_or_else(|| AnswerError::UnknownOption(choice.to_string()))
}

fn wrong_type(expected: &'static str, got: &Value) -> AnswerError {
    let got = match got {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    };
    AnswerError::WrongType {
        expected,
        got: got.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::question::ScaleRange;
    use crate::domain::role::Audience;
    use serde_json::json;
    use uuid::Uuid;

    fn question(question_type: QuestionType) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "How was your shift?".to_string(),
            description: None,
            question_type,
            audience: Audience::All,
            options: vec!["Calm".to_string(), "Busy".to_string(), "Chaotic".to_string()],
            scale: Some(ScaleRange { min: 1, max: 5 }),
            required: true,
            allow_audio: false,
            display_order: 1,
            conditions: vec![],
            active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_required_and_skip() {
        let mut q = question(QuestionType::Text);
        assert_eq!(validate_answer(&q, &json!(null), false), Err(AnswerError::Required));
        assert_eq!(validate_answer(&q, &json!("   "), false), Err(AnswerError::Required));

        q.required = false;
        assert_eq!(validate_answer(&q, &json!(""), false), Ok(Value::Null));
    }

    #[test]
    fn test_audio_rules() {
        let mut q = question(QuestionType::Text);
        assert_eq!(
            validate_answer(&q, &json!("ok"), true),
            Err(AnswerError::AudioNotAllowed)
        );

        q.allow_audio = true;
        assert_eq!(validate_answer(&q, &json!(null), true), Ok(Value::Null));
    }

    #[test]
    fn test_choice_answers_are_canonicalized() {
        let single = question(QuestionType::SingleChoice);
        assert_eq!(validate_answer(&single, &json!(" busy "), false), Ok(json!("Busy")));
        assert_eq!(
            validate_answer(&single, &json!("Quiet"), false),
            Err(AnswerError::UnknownOption("Quiet".to_string()))
        );

        let multiple = question(QuestionType::MultipleChoice);
        assert_eq!(
            validate_answer(&multiple, &json!(["calm", "Chaotic"]), false),
            Ok(json!(["Calm", "Chaotic"]))
        );
        assert_eq!(
            validate_answer(&multiple, &json!(["Calm", "calm"]), false),
            Err(AnswerError::DuplicateOption("Calm".to_string()))
        );
        assert!(matches!(
            validate_answer(&multiple, &json!("Calm"), false),
            Err(AnswerError::WrongType { .. })
        ));
    }

    #[test]
    fn test_yes_no_and_numbers() {
        let yes_no = question(QuestionType::YesNo);
        assert_eq!(validate_answer(&yes_no, &json!(true), false), Ok(json!("yes")));
        assert_eq!(validate_answer(&yes_no, &json!("No"), false), Ok(json!("no")));
        assert!(validate_answer(&yes_no, &json!("maybe"), false).is_err());

        let number = question(QuestionType::Number);
        assert_eq!(validate_answer(&number, &json!("12.5"), false), Ok(json!(12.5)));
        assert!(validate_answer(&number, &json!("twelve"), false).is_err());
    }

    #[test]
    fn test_scale_range() {
        let scale = question(QuestionType::Scale);
        assert_eq!(validate_answer(&scale, &json!(5), false), Ok(json!(5)));
        assert_eq!(validate_answer(&scale, &json!("2"), false), Ok(json!(2)));
        assert_eq!(
            validate_answer(&scale, &json!(6), false),
            Err(AnswerError::OutOfRange {
                value: 6,
                min: 1,
                max: 5
            })
        );
    }

    #[test]
    fn test_audio_mime_types() {
        assert!(is_allowed_audio_type("audio/webm;codecs=opus"));
        assert!(is_allowed_audio_type("Audio/OGG"));
        assert!(!is_allowed_audio_type("video/mp4"));
        assert!(!is_allowed_audio_type(""));
    }
}
