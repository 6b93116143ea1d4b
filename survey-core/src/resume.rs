//! Session resume
//!
//! Rebuilds where a respondent stands from the persisted responses: which
//! questions are visible, which are answered, and the first one still open.

use std::collections::HashMap;
use uuid::Uuid;

use crate::conditions::{answers_from_responses, is_unanswered, visible_questions};
use crate::domain::question::Question;
use crate::domain::response::Response;
use crate::domain::session::Session;
use crate::dto::session::SessionProgress;

/// Reconstruct the progress of `session` from its responses
pub fn resume(
    session: &Session,
    questions: &[Question],
    responses: &[Response],
) -> SessionProgress {
    let answers = answers_from_responses(responses);
    let by_question: HashMap<Uuid, &Response> =
        responses.iter().map(|r| (r.question_id, r)).collect();

    let visible = visible_questions(questions, session.role, &answers);
    let total = visible.len();

    let answered_question_ids: Vec<Uuid> = visible
        .iter()
        .filter(|q| by_question.contains_key(&q.id))
        .map(|q| q.id)
        .collect();

    let current_index = visible
        .iter()
        .position(|q| !by_question.contains_key(&q.id))
        .unwrap_or(total);
    let current_question_id = visible.get(current_index).map(|q| q.id);

    let can_complete = visible
        .iter()
        .filter(|q| q.required)
        .all(|q| by_question.get(&q.id).is_some_and(|r| has_answer(r)));

    let progress_percent = if total == 0 {
        100
    } else {
        (answered_question_ids.len() * 100 / total) as u8
    };

    SessionProgress {
        session_id: session.id,
        role: session.role,
        status: session.status,
        questions: visible.into_iter().cloned().collect(),
        answered_question_ids,
        current_question_id,
        current_index,
        total,
        progress_percent,
        can_complete,
    }
}

fn has_answer(response: &Response) -> bool {
    !is_unanswered(&response.value) || response.audio.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::question::{ConditionOperator, QuestionCondition, QuestionType};
    use crate::domain::response::AudioAttachment;
    use crate::domain::role::{Audience, Role};
    use crate::domain::session::SessionStatus;
    use chrono::Utc;
    use serde_json::{Value, json};

    fn session(role: Role) -> Session {
        Session {
            id: Uuid::new_v4(),
            link_id: Uuid::new_v4(),
            role,
            fingerprint: "abc".to_string(),
            status: SessionStatus::InProgress,
            started_at: Utc::now(),
            last_activity_at: Utc::now(),
            completed_at: None,
        }
    }

    fn question(order: i64, required: bool) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: format!("Q{}", order),
            description: None,
            question_type: QuestionType::Text,
            audience: Audience::All,
            options: vec![],
            scale: None,
            required,
            allow_audio: true,
            display_order: order,
            conditions: vec![],
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn response(session: &Session, question: &Question, value: Value) -> Response {
        Response {
            id: Uuid::new_v4(),
            session_id: session.id,
            question_id: question.id,
            value,
            audio: None,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_session_starts_at_first_question() {
        let s = session(Role::Nurse);
        let questions = vec![question(1, true), question(2, true)];

        let progress = resume(&s, &questions, &[]);

        assert_eq!(progress.total, 2);
        assert_eq!(progress.current_index, 0);
        assert_eq!(progress.current_question_id, Some(questions[0].id));
        assert_eq!(progress.progress_percent, 0);
        assert!(!progress.can_complete);
    }

    #[test]
    fn test_resume_finds_first_gap() {
        let s = session(Role::Nurse);
        let questions = vec![question(1, true), question(2, false), question(3, true)];
        let responses = vec![
            response(&s, &questions[0], json!("fine")),
            response(&s, &questions[2], json!("later")),
        ];

        let progress = resume(&s, &questions, &responses);

        assert_eq!(progress.current_index, 1);
        assert_eq!(progress.current_question_id, Some(questions[1].id));
        assert_eq!(progress.answered_question_ids.len(), 2);
        assert_eq!(progress.progress_percent, 66);
        // The open question is optional, so the survey can already be finished.
        assert!(progress.can_complete);
    }

    #[test]
    fn test_skip_counts_as_answered_but_not_for_required() {
        let s = session(Role::Doctor);
        let questions = vec![question(1, false), question(2, true)];
        let responses = vec![
            response(&s, &questions[0], Value::Null),
            response(&s, &questions[1], Value::Null),
        ];

        let progress = resume(&s, &questions, &responses);

        assert_eq!(progress.current_question_id, None);
        assert_eq!(progress.current_index, 2);
        assert_eq!(progress.progress_percent, 100);
        assert!(!progress.can_complete);
    }

    #[test]
    fn test_audio_satisfies_required_question() {
        let s = session(Role::Doctor);
        let questions = vec![question(1, true)];
        let mut r = response(&s, &questions[0], Value::Null);
        r.audio = Some(AudioAttachment {
            mime_type: "audio/webm".to_string(),
            size_bytes: 128,
        });

        let progress = resume(&s, &questions, &[r]);
        assert!(progress.can_complete);
    }

    #[test]
    fn test_hidden_questions_are_excluded() {
        let s = session(Role::Nurse);
        let gate = question(1, true);
        let mut follow_up = question(2, true);
        follow_up.conditions = vec![QuestionCondition {
            question_id: gate.id,
            operator: ConditionOperator::Equals,
            value: "yes".to_string(),
        }];
        let mut doctors_only = question(3, true);
        doctors_only.audience = Audience::Doctor;

        let questions = vec![gate.clone(), follow_up, doctors_only];
        let responses = vec![response(&s, &gate, json!("no"))];

        let progress = resume(&s, &questions, &responses);

        assert_eq!(progress.total, 1);
        assert_eq!(progress.current_question_id, None);
        assert!(progress.can_complete);
    }

    #[test]
    fn test_empty_survey_is_complete() {
        let s = session(Role::Nurse);
        let progress = resume(&s, &[], &[]);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.progress_percent, 100);
        assert!(progress.can_complete);
    }
}
