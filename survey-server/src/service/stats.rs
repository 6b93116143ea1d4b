//! Stats Service

use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use survey_core::conditions::{answers_from_responses, visible_questions};
use survey_core::domain::question::Question;
use survey_core::domain::response::Response;
use survey_core::domain::role::Role;
use survey_core::domain::session::Session;
use survey_core::dto::stats::SurveyStats;
use survey_core::stats::summarize;
use uuid::Uuid;

use crate::repository::{question_repository, response_repository, session_repository};

/// Results summary across all sessions, or only those of one role
///
/// Only answers to questions that are still visible in their session count;
/// an answer retracted by changing an earlier one stays stored but is left out.
pub async fn get_stats(
    pool: &SqlitePool,
    role: Option<Role>,
) -> Result<SurveyStats, sqlx::Error> {
    let mut questions = question_repository::list_all(pool).await?;
    let mut sessions = session_repository::list_all(pool).await?;
    let responses = response_repository::list_all(pool).await?;

    if let Some(role) = role {
        questions.retain(|q| q.audience.includes(role));
        sessions.retain(|s| s.role == role);
    }

    let responses = visible_responses(&questions, &sessions, responses);

    tracing::debug!(
        "Summarizing {} sessions and {} responses",
        sessions.len(),
        responses.len()
    );

    Ok(summarize(&questions, &sessions, &responses))
}

/// Responses of `sessions` whose question is currently visible in that session
fn visible_responses(
    questions: &[Question],
    sessions: &[Session],
    responses: Vec<Response>,
) -> Vec<Response> {
    let mut by_session: HashMap<Uuid, Vec<Response>> = HashMap::new();
    for response in responses {
        by_session.entry(response.session_id).or_default().push(response);
    }

    let mut kept = Vec::new();
    for session in sessions {
        let Some(session_responses) = by_session.remove(&session.id) else {
            continue;
        };

        let answers = answers_from_responses(&session_responses);
        let visible: HashSet<Uuid> = visible_questions(questions, session.role, &answers)
            .iter()
            .map(|q| q.id)
            .collect();

        kept.extend(
            session_responses
                .iter()
                .filter(|r| visible.contains(&r.question_id))
                .cloned(),
        );
    }

    kept
}
