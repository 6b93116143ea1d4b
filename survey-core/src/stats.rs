//! Results summary

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::conditions::is_unanswered;
use crate::domain::question::Question;
use crate::domain::response::Response;
use crate::domain::session::{Session, SessionStatus};
use crate::dto::stats::{QuestionStats, SurveyStats};

/// Aggregate session totals and per-question counts
///
/// Questions are reported in display order. Responses whose question is not
/// in `questions` are ignored.
pub fn summarize(
    questions: &[Question],
    sessions: &[Session],
    responses: &[Response],
) -> SurveyStats {
    let sessions_started = sessions.len() as u64;
    let sessions_completed = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .count() as u64;

    let completion_rate = if sessions_started == 0 {
        0.0
    } else {
        sessions_completed as f64 * 100.0 / sessions_started as f64
    };

    let mut ordered: Vec<&Question> = questions.iter().collect();
    ordered.sort_by_key(|q| (q.display_order, q.created_at));

    let mut by_question: HashMap<Uuid, Vec<&Response>> = HashMap::new();
    for response in responses {
        by_question.entry(response.question_id).or_default().push(response);
    }

    let questions = ordered
        .into_iter()
        .map(|q| question_stats(q, by_question.get(&q.id).map(Vec::as_slice).unwrap_or(&[])))
        .collect();

    SurveyStats {
        sessions_started,
        sessions_completed,
        sessions_in_progress: sessions_started - sessions_completed,
        completion_rate,
        questions,
    }
}

fn question_stats(question: &Question, responses: &[&Response]) -> QuestionStats {
    let mut stats = QuestionStats {
        question_id: question.id,
        text: question.text.clone(),
        question_type: question.question_type,
        answer_count: 0,
        skip_count: 0,
        audio_count: 0,
        distribution: BTreeMap::new(),
    };

    if question.question_type.has_options() {
        for option in &question.options {
            stats.distribution.insert(option.clone(), 0);
        }
    }

    for response in responses {
        if response.audio.is_some() {
            stats.audio_count += 1;
        }

        if is_unanswered(&response.value) {
            if response.audio.is_none() {
                stats.skip_count += 1;
            }
            continue;
        }

        stats.answer_count += 1;

        if question.question_type.is_categorical() {
            match &response.value {
                Value::Array(items) => {
                    for item in items {
                        *stats.distribution.entry(bucket(item)).or_insert(0) += 1;
                    }
                }
                value => *stats.distribution.entry(bucket(value)).or_insert(0) += 1,
            }
        }
    }

    stats
}

fn bucket(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
