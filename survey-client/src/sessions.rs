//! Respondent session and response API endpoints

use crate::SurveyClient;
use crate::error::Result;
use survey_core::domain::response::Response;
use survey_core::domain::session::Session;
use survey_core::dto::response::SubmitAnswer;
use survey_core::dto::session::{SessionProgress, StartSession, StartedSession};
use survey_core::fingerprint::FingerprintComponents;
use uuid::Uuid;

impl SurveyClient {
    // =============================================================================
    // Respondent Flow
    // =============================================================================

    /// Start a session on a link, or resume the open one with the same fingerprint
    pub async fn start_session(
        &self,
        code: &str,
        fingerprint: FingerprintComponents,
    ) -> Result<StartedSession> {
        let response = self
            .client
            .post(self.url(&format!("/s/{}/start", code)))
            .json(&StartSession { fingerprint })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Progress of a known session reached through its link
    pub async fn resume_session(&self, code: &str, session_id: Uuid) -> Result<SessionProgress> {
        let response = self
            .client
            .get(self.url(&format!("/s/{}/sessions/{}", code, session_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Record or replace an answer
    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        req: SubmitAnswer,
    ) -> Result<SessionProgress> {
        let response = self
            .client
            .post(self.url(&format!("/sessions/{}/answers", session_id)))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Finish a session
    pub async fn complete_session(&self, session_id: Uuid) -> Result<SessionProgress> {
        let response = self
            .client
            .post(self.url(&format!("/sessions/{}/complete", session_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Results
    // =============================================================================

    /// List sessions, optionally only those started from one link
    pub async fn list_sessions(&self, link_id: Option<Uuid>) -> Result<Vec<Session>> {
        let mut request = self.client.get(self.url("/sessions"));
        if let Some(link_id) = link_id {
            request = request.query(&[("link_id", link_id.to_string())]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Get a session by ID
    pub async fn get_session(&self, session_id: Uuid) -> Result<Session> {
        let response = self
            .client
            .get(self.url(&format!("/sessions/{}", session_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Responses recorded in a session
    pub async fn list_responses(&self, session_id: Uuid) -> Result<Vec<Response>> {
        let response = self
            .client
            .get(self.url(&format!("/sessions/{}/responses", session_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Download the audio attached to an answer
    ///
    /// # Returns
    /// The recording's MIME type (when reported) and its bytes
    pub async fn download_audio(
        &self,
        session_id: Uuid,
        question_id: Uuid,
    ) -> Result<(Option<String>, Vec<u8>)> {
        let response = self
            .client
            .get(self.url(&format!(
                "/sessions/{}/answers/{}/audio",
                session_id, question_id
            )))
            .send()
            .await?;

        self.handle_bytes_response(response).await
    }
}
