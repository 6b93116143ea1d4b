//! Session Service
//!
//! Business logic for respondent sessions: starting or resuming from a link
//! code, recording answers (with optional audio) and completing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sqlx::SqlitePool;
use survey_core::answers::{is_allowed_audio_type, validate_answer};
use survey_core::conditions::{answers_from_responses, visible_questions};
use survey_core::domain::link::{DistributionLink, LinkStatus};
use survey_core::domain::response::Response;
use survey_core::domain::session::{Session, SessionStatus};
use survey_core::dto::response::{AudioUpload, SubmitAnswer};
use survey_core::dto::session::{SessionProgress, StartedSession};
use survey_core::fingerprint::{FingerprintComponents, fingerprint};
use survey_core::resume::resume;
use uuid::Uuid;

use crate::repository::response_repository::AudioBlob;
use crate::repository::{
    link_repository, question_repository, response_repository, session_repository,
};
use crate::service::link::{self as link_service, LinkError};

/// Service error type
#[derive(Debug)]
pub enum SessionError {
    LinkNotFound(String),
    LinkUnavailable(LinkStatus),
    NotFound(Uuid),
    QuestionNotFound(Uuid),
    QuestionNotVisible(Uuid),
    AlreadyCompleted(Uuid),
    Incomplete(Uuid),
    InvalidAnswer(String),
    InvalidAudio(String),
    AudioNotFound(Uuid),
    Internal(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        SessionError::DatabaseError(err)
    }
}

impl From<LinkError> for SessionError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::DatabaseError(err) => SessionError::DatabaseError(err),
            LinkError::CodeNotFound(code) => SessionError::LinkNotFound(code),
            LinkError::NotFound(id) => SessionError::LinkNotFound(id.to_string()),
            LinkError::ValidationError(msg) => SessionError::Internal(msg),
            LinkError::CodeGenerationFailed => {
                SessionError::Internal("Could not generate a unique link code".to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Start a session from a link code, or resume the respondent's open one
///
/// A respondent is recognized by the fingerprint of the reported browser
/// properties. Resuming does not consume a use of the link; starting does,
/// and fails once the link is inactive, expired or exhausted.
pub async fn start_session(
    pool: &SqlitePool,
    code: &str,
    components: &FingerprintComponents,
) -> Result<StartedSession> {
    let link = link_service::get_link_by_code(pool, code).await?;
    let fingerprint = respondent_fingerprint(components);

    if let Some(session) =
        session_repository::find_in_progress(pool, link.id, &fingerprint).await?
    {
        session_repository::touch(pool, session.id).await?;
        tracing::info!("Resuming session {} on link {}", session.id, link.code);

        return Ok(StartedSession {
            resumed: true,
            progress: progress_for(pool, &session).await?,
        });
    }

    let session = open_session(pool, &link, &fingerprint).await?;

    tracing::info!(
        "Session {} started on link {} ({})",
        session.id,
        link.code,
        link.role
    );

    Ok(StartedSession {
        resumed: false,
        progress: progress_for(pool, &session).await?,
    })
}

/// Resume a known session through its link
pub async fn resume_session(
    pool: &SqlitePool,
    code: &str,
    session_id: Uuid,
) -> Result<SessionProgress> {
    let link = link_service::get_link_by_code(pool, code).await?;
    let session = get_session(pool, session_id).await?;

    if session.link_id != link.id {
        return Err(SessionError::NotFound(session_id));
    }

    progress_for(pool, &session).await
}

/// Get a session by ID
pub async fn get_session(pool: &SqlitePool, id: Uuid) -> Result<Session> {
    let session = session_repository::find_by_id(pool, id)
        .await?
        .ok_or(SessionError::NotFound(id))?;

    Ok(session)
}

/// Current progress of a session
pub async fn get_progress(pool: &SqlitePool, id: Uuid) -> Result<SessionProgress> {
    let session = get_session(pool, id).await?;
    progress_for(pool, &session).await
}

/// Record (or replace) the answer to a currently visible question
pub async fn submit_answer(
    pool: &SqlitePool,
    session_id: Uuid,
    req: SubmitAnswer,
    max_audio_bytes: usize,
) -> Result<SessionProgress> {
    let session = get_session(pool, session_id).await?;

    if session.status == SessionStatus::Completed {
        return Err(SessionError::AlreadyCompleted(session_id));
    }

    let question = question_repository::find_by_id(pool, req.question_id)
        .await?
        .ok_or(SessionError::QuestionNotFound(req.question_id))?;

    let questions = question_repository::list_all(pool).await?;
    let responses = response_repository::find_by_session(pool, session_id).await?;
    let answers = answers_from_responses(&responses);

    let visible = visible_questions(&questions, session.role, &answers)
        .iter()
        .any(|q| q.id == question.id);
    if !visible {
        return Err(SessionError::QuestionNotVisible(question.id));
    }

    let audio = req
        .audio
        .as_ref()
        .map(|upload| decode_audio(upload, max_audio_bytes))
        .transpose()?;

    let value = validate_answer(&question, &req.value, audio.is_some())
        .map_err(|e| SessionError::InvalidAnswer(e.to_string()))?;

    response_repository::upsert(pool, session_id, question.id, &value, audio.as_ref()).await?;
    session_repository::touch(pool, session_id).await?;

    tracing::debug!(
        "Session {} answered question {}{}",
        session_id,
        question.id,
        if audio.is_some() { " with audio" } else { "" }
    );

    get_progress(pool, session_id).await
}

/// Finish a session once every visible required question is answered
pub async fn complete_session(pool: &SqlitePool, session_id: Uuid) -> Result<SessionProgress> {
    let session = get_session(pool, session_id).await?;

    if session.status == SessionStatus::Completed {
        return Err(SessionError::AlreadyCompleted(session_id));
    }

    let progress = progress_for(pool, &session).await?;
    if !progress.can_complete {
        return Err(SessionError::Incomplete(session_id));
    }

    if !session_repository::mark_completed(pool, session_id).await? {
        return Err(SessionError::AlreadyCompleted(session_id));
    }

    tracing::info!("Session {} completed", session_id);

    get_progress(pool, session_id).await
}

/// List sessions, optionally only those of one link
pub async fn list_sessions(pool: &SqlitePool, link_id: Option<Uuid>) -> Result<Vec<Session>> {
    let sessions = match link_id {
        Some(link_id) => session_repository::find_by_link(pool, link_id).await?,
        None => session_repository::list_all(pool).await?,
    };

    Ok(sessions)
}

/// Responses recorded in a session
pub async fn list_responses(pool: &SqlitePool, session_id: Uuid) -> Result<Vec<Response>> {
    get_session(pool, session_id).await?;
    let responses = response_repository::find_by_session(pool, session_id).await?;
    Ok(responses)
}

/// Audio recorded for a session's answer to a question
pub async fn get_audio(
    pool: &SqlitePool,
    session_id: Uuid,
    question_id: Uuid,
) -> Result<AudioBlob> {
    get_session(pool, session_id).await?;

    response_repository::find_audio(pool, session_id, question_id)
        .await?
        .ok_or(SessionError::AudioNotFound(question_id))
}

// =============================================================================
// Helpers
// =============================================================================

/// Fingerprint used to recognize a returning respondent
///
/// Without any reported properties every respondent would share one
/// fingerprint, so those get a unique value that never matches.
fn respondent_fingerprint(components: &FingerprintComponents) -> String {
    if components.is_empty() {
        format!("anonymous-{}", Uuid::new_v4().simple())
    } else {
        fingerprint(components)
    }
}

/// Take one use of the link and create the session atomically
async fn open_session(
    pool: &SqlitePool,
    link: &DistributionLink,
    fingerprint: &str,
) -> Result<Session> {
    let status = link.status();
    if !status.is_usable() {
        return Err(SessionError::LinkUnavailable(status));
    }

    let mut tx = pool.begin().await?;

    if !link_repository::try_consume_use(&mut *tx, link.id).await? {
        // Someone else took the last use, or the link was just deactivated.
        tx.rollback().await?;
        let status = match link_repository::find_by_id(pool, link.id).await? {
            Some(current) if !current.status().is_usable() => current.status(),
            _ => LinkStatus::Exhausted,
        };
        return Err(SessionError::LinkUnavailable(status));
    }

    let session = session_repository::create(&mut *tx, link.id, link.role, fingerprint).await?;
    tx.commit().await?;

    Ok(session)
}

async fn progress_for(pool: &SqlitePool, session: &Session) -> Result<SessionProgress> {
    let questions = question_repository::list_all(pool).await?;
    let responses = response_repository::find_by_session(pool, session.id).await?;
    Ok(resume(session, &questions, &responses))
}

fn decode_audio(upload: &AudioUpload, max_audio_bytes: usize) -> Result<AudioBlob> {
    if !is_allowed_audio_type(&upload.mime_type) {
        return Err(SessionError::InvalidAudio(format!(
            "Unsupported audio type '{}'",
            upload.mime_type
        )));
    }

    let data = STANDARD
        .decode(upload.data.trim())
        .map_err(|e| SessionError::InvalidAudio(format!("Audio is not valid base64: {}", e)))?;

    if data.is_empty() {
        return Err(SessionError::InvalidAudio("Audio recording is empty".to_string()));
    }

    if data.len() > max_audio_bytes {
        return Err(SessionError::InvalidAudio(format!(
            "Audio recording is too large ({} bytes, max {})",
            data.len(),
            max_audio_bytes
        )));
    }

    Ok(AudioBlob {
        mime_type: upload.mime_type.trim().to_ascii_lowercase(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::service::question_service;
    use serde_json::{Value, json};
    use survey_core::domain::question::{ConditionOperator, QuestionCondition, QuestionType};
    use survey_core::domain::role::{Audience, Role};
    use survey_core::dto::link::CreateLink;
    use survey_core::dto::question::CreateQuestion;

    const MAX_AUDIO: usize = 1024;

    fn components(agent: &str) -> FingerprintComponents {
        FingerprintComponents {
            user_agent: Some(agent.to_string()),
            language: Some("en".to_string()),
            ..FingerprintComponents::default()
        }
    }

    fn question(text: &str, question_type: QuestionType) -> CreateQuestion {
        CreateQuestion {
            text: text.to_string(),
            description: None,
            question_type,
            audience: Audience::All,
            options: vec![],
            scale: None,
            required: true,
            allow_audio: false,
            display_order: None,
            conditions: vec![],
            active: true,
        }
    }

    async fn link(pool: &SqlitePool, role: Role, max_uses: Option<u32>) -> DistributionLink {
        link_service::create_link(
            pool,
            CreateLink {
                role,
                label: "test".to_string(),
                expires_at: None,
                max_uses,
            },
            8,
        )
        .await
        .unwrap()
    }

    fn answer(question_id: Uuid, value: Value) -> SubmitAnswer {
        SubmitAnswer {
            question_id,
            value,
            audio: None,
        }
    }

    #[test]
    fn test_decode_audio() {
        let upload = AudioUpload {
            mime_type: "audio/webm".to_string(),
            data: STANDARD.encode(b"RIFF...."),
        };
        let blob = decode_audio(&upload, MAX_AUDIO).unwrap();
        assert_eq!(blob.data, b"RIFF....");

        let too_big = AudioUpload {
            mime_type: "audio/webm".to_string(),
            data: STANDARD.encode(vec![0u8; MAX_AUDIO + 1]),
        };
        assert!(matches!(
            decode_audio(&too_big, MAX_AUDIO),
            Err(SessionError::InvalidAudio(_))
        ));

        let video = AudioUpload {
            mime_type: "video/mp4".to_string(),
            data: STANDARD.encode(b"x"),
        };
        assert!(decode_audio(&video, MAX_AUDIO).is_err());

        let garbage = AudioUpload {
            mime_type: "audio/ogg".to_string(),
            data: "%%%".to_string(),
        };
        assert!(decode_audio(&garbage, MAX_AUDIO).is_err());
    }

    #[test]
    fn test_anonymous_fingerprints_never_match() {
        let empty = FingerprintComponents::default();
        assert_ne!(respondent_fingerprint(&empty), respondent_fingerprint(&empty));
        assert_eq!(
            respondent_fingerprint(&components("a")),
            respondent_fingerprint(&components("a"))
        );

        let blank = FingerprintComponents {
            user_agent: Some(" ".to_string()),
            ..FingerprintComponents::default()
        };
        assert!(respondent_fingerprint(&blank).starts_with("anonymous-"));
        assert_ne!(respondent_fingerprint(&blank), respondent_fingerprint(&blank));
    }

    #[test]
    fn test_link_errors_do_not_become_not_found() {
        assert!(matches!(
            SessionError::from(LinkError::CodeGenerationFailed),
            SessionError::Internal(_)
        ));
        assert!(matches!(
            SessionError::from(LinkError::ValidationError("bad".to_string())),
            SessionError::Internal(_)
        ));
        assert!(matches!(
            SessionError::from(LinkError::CodeNotFound("ABCD2345".to_string())),
            SessionError::LinkNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_whitespace_fingerprints_do_not_share_sessions() {
        let pool = test_pool().await;
        let link = link(&pool, Role::Nurse, None).await;
        let blank = FingerprintComponents {
            user_agent: Some(" ".to_string()),
            ..FingerprintComponents::default()
        };

        let first = start_session(&pool, &link.code, &blank).await.unwrap();
        let second = start_session(&pool, &link.code, &blank).await.unwrap();
        assert!(!second.resumed);
        assert_ne!(first.progress.session_id, second.progress.session_id);
    }

    #[tokio::test]
    async fn test_stale_link_loses_the_last_use() {
        let pool = test_pool().await;

        // Both respondents loaded the link while one use was left.
        let capped = link(&pool, Role::Doctor, Some(1)).await;
        let stale = capped.clone();

        start_session(&pool, &capped.code, &components("a"))
            .await
            .unwrap();
        let result = open_session(&pool, &stale, "late-respondent").await;
        assert!(matches!(
            result,
            Err(SessionError::LinkUnavailable(LinkStatus::Exhausted))
        ));

        let current = link_service::get_link(&pool, capped.id).await.unwrap();
        assert_eq!(current.use_count, 1);
        assert_eq!(list_sessions(&pool, Some(capped.id)).await.unwrap().len(), 1);

        // Deactivated between loading and starting.
        let open = link(&pool, Role::Doctor, None).await;
        link_service::deactivate_link(&pool, open.id).await.unwrap();
        let result = open_session(&pool, &open, "late-respondent").await;
        assert!(matches!(
            result,
            Err(SessionError::LinkUnavailable(LinkStatus::Inactive))
        ));
        assert!(!link_repository::try_consume_use(&pool, open.id).await.unwrap());
        assert!(!link_repository::try_consume_use(&pool, capped.id).await.unwrap());

        let open = link_service::get_link(&pool, open.id).await.unwrap();
        assert_eq!(open.use_count, 0);
        assert!(list_sessions(&pool, Some(open.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_then_resume_by_fingerprint() {
        let pool = test_pool().await;
        question_service::create_question(&pool, question("Unit?", QuestionType::Text))
            .await
            .unwrap();
        let link = link(&pool, Role::Nurse, None).await;

        let first = start_session(&pool, &link.code, &components("browser-a"))
            .await
            .unwrap();
        assert!(!first.resumed);
        assert_eq!(first.progress.role, Role::Nurse);
        assert_eq!(first.progress.total, 1);

        let again = start_session(&pool, &link.code, &components("browser-a"))
            .await
            .unwrap();
        assert!(again.resumed);
        assert_eq!(again.progress.session_id, first.progress.session_id);

        let other = start_session(&pool, &link.code, &components("browser-b"))
            .await
            .unwrap();
        assert!(!other.resumed);

        // Resuming does not consume a use.
        let link = link_service::get_link(&pool, link.id).await.unwrap();
        assert_eq!(link.use_count, 2);
    }

    #[tokio::test]
    async fn test_usage_cap_and_deactivation() {
        let pool = test_pool().await;
        let capped = link(&pool, Role::Doctor, Some(1)).await;

        start_session(&pool, &capped.code, &components("a"))
            .await
            .unwrap();
        let result = start_session(&pool, &capped.code, &components("b")).await;
        assert!(matches!(
            result,
            Err(SessionError::LinkUnavailable(LinkStatus::Exhausted))
        ));

        // The respondent who got in can still come back.
        let resumed = start_session(&pool, &capped.code, &components("a"))
            .await
            .unwrap();
        assert!(resumed.resumed);

        let open = link(&pool, Role::Doctor, None).await;
        link_service::deactivate_link(&pool, open.id).await.unwrap();
        let result = start_session(&pool, &open.code, &components("a")).await;
        assert!(matches!(
            result,
            Err(SessionError::LinkUnavailable(LinkStatus::Inactive))
        ));

        let result = start_session(&pool, "NOPE2345", &components("a")).await;
        assert!(matches!(result, Err(SessionError::LinkNotFound(_))));
    }

    #[tokio::test]
    async fn test_answer_flow_with_conditions() {
        let pool = test_pool().await;

        let gate = question_service::create_question(
            &pool,
            question("Do you work nights?", QuestionType::YesNo),
        )
        .await
        .unwrap();

        let mut follow_up = question("How many nights per month?", QuestionType::Number);
        follow_up.conditions = vec![QuestionCondition {
            question_id: gate.id,
            operator: ConditionOperator::Equals,
            value: "yes".to_string(),
        }];
        let follow_up = question_service::create_question(&pool, follow_up)
            .await
            .unwrap();

        let mut doctors = question("Doctors only", QuestionType::Text);
        doctors.audience = Audience::Doctor;
        let doctors = question_service::create_question(&pool, doctors)
            .await
            .unwrap();

        let link = link(&pool, Role::Nurse, None).await;
        let started = start_session(&pool, &link.code, &components("a"))
            .await
            .unwrap();
        let session_id = started.progress.session_id;
        assert_eq!(started.progress.total, 1);
        assert_eq!(started.progress.current_question_id, Some(gate.id));

        // Hidden questions cannot be answered yet.
        let result =
            submit_answer(&pool, session_id, answer(follow_up.id, json!(4)), MAX_AUDIO).await;
        assert!(matches!(result, Err(SessionError::QuestionNotVisible(_))));
        let result =
            submit_answer(&pool, session_id, answer(doctors.id, json!("x")), MAX_AUDIO).await;
        assert!(matches!(result, Err(SessionError::QuestionNotVisible(_))));

        let progress = submit_answer(&pool, session_id, answer(gate.id, json!(true)), MAX_AUDIO)
            .await
            .unwrap();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.current_question_id, Some(follow_up.id));
        assert!(!progress.can_complete);

        let result = complete_session(&pool, session_id).await;
        assert!(matches!(result, Err(SessionError::Incomplete(_))));

        let result =
            submit_answer(&pool, session_id, answer(follow_up.id, json!("lots")), MAX_AUDIO).await;
        assert!(matches!(result, Err(SessionError::InvalidAnswer(_))));

        let progress = submit_answer(&pool, session_id, answer(follow_up.id, json!(6)), MAX_AUDIO)
            .await
            .unwrap();
        assert_eq!(progress.current_question_id, None);
        assert!(progress.can_complete);

        // Changing the gate answer hides the follow-up again.
        let progress = submit_answer(&pool, session_id, answer(gate.id, json!("no")), MAX_AUDIO)
            .await
            .unwrap();
        assert_eq!(progress.total, 1);
        assert_eq!(progress.progress_percent, 100);

        let done = complete_session(&pool, session_id).await.unwrap();
        assert_eq!(done.status, SessionStatus::Completed);

        let result =
            submit_answer(&pool, session_id, answer(gate.id, json!("yes")), MAX_AUDIO).await;
        assert!(matches!(result, Err(SessionError::AlreadyCompleted(_))));
        let result = complete_session(&pool, session_id).await;
        assert!(matches!(result, Err(SessionError::AlreadyCompleted(_))));

        let responses = list_responses(&pool, session_id).await.unwrap();
        assert_eq!(responses.len(), 2);
    }

    #[tokio::test]
    async fn test_audio_answer_round_trip() {
        let pool = test_pool().await;

        let mut spoken = question("Describe your last shift", QuestionType::Text);
        spoken.allow_audio = true;
        let spoken = question_service::create_question(&pool, spoken).await.unwrap();

        let link = link(&pool, Role::Doctor, None).await;
        let started = start_session(&pool, &link.code, &components("a"))
            .await
            .unwrap();
        let session_id = started.progress.session_id;

        let req = SubmitAnswer {
            question_id: spoken.id,
            value: Value::Null,
            audio: Some(AudioUpload {
                mime_type: "audio/ogg".to_string(),
                data: STANDARD.encode(b"OggS-recording"),
            }),
        };
        let progress = submit_answer(&pool, session_id, req, MAX_AUDIO).await.unwrap();
        assert!(progress.can_complete);

        let blob = get_audio(&pool, session_id, spoken.id).await.unwrap();
        assert_eq!(blob.mime_type, "audio/ogg");
        assert_eq!(blob.data, b"OggS-recording");

        let responses = list_responses(&pool, session_id).await.unwrap();
        assert_eq!(
            responses[0].audio.as_ref().map(|a| a.size_bytes),
            Some(b"OggS-recording".len() as u64)
        );

        let result = get_audio(&pool, session_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(SessionError::AudioNotFound(_))));
    }

    #[tokio::test]
    async fn test_resume_route_checks_link() {
        let pool = test_pool().await;
        let first = link(&pool, Role::Nurse, None).await;
        let second = link(&pool, Role::Nurse, None).await;

        let started = start_session(&pool, &first.code, &components("a"))
            .await
            .unwrap();
        let session_id = started.progress.session_id;

        let progress = resume_session(&pool, &first.code, session_id).await.unwrap();
        assert_eq!(progress.session_id, session_id);

        let result = resume_session(&pool, &second.code, session_id).await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));

        let sessions = list_sessions(&pool, Some(first.id)).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(list_sessions(&pool, Some(second.id)).await.unwrap().is_empty());
    }
}
