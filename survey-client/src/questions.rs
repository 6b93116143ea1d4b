//! Question-related API endpoints

use crate::SurveyClient;
use crate::error::Result;
use survey_core::domain::question::Question;
use survey_core::domain::role::Role;
use survey_core::dto::question::{CreateQuestion, ReorderQuestions};
use uuid::Uuid;

impl SurveyClient {
    // =============================================================================
    // Question Management
    // =============================================================================

    /// Create a new question
    pub async fn create_question(&self, req: CreateQuestion) -> Result<Question> {
        let response = self
            .client
            .post(self.url("/questions"))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List questions in display order, optionally only those shown to `role`
    pub async fn list_questions(&self, role: Option<Role>) -> Result<Vec<Question>> {
        let mut request = self.client.get(self.url("/questions"));
        if let Some(role) = role {
            request = request.query(&[("role", role.as_str())]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Get a question by ID
    pub async fn get_question(&self, question_id: Uuid) -> Result<Question> {
        let response = self
            .client
            .get(self.url(&format!("/questions/{}", question_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Replace a question's definition
    pub async fn update_question(
        &self,
        question_id: Uuid,
        req: CreateQuestion,
    ) -> Result<Question> {
        let response = self
            .client
            .put(self.url(&format!("/questions/{}", question_id)))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a question
    ///
    /// Fails with a 409 conflict while other questions' conditions reference it.
    pub async fn delete_question(&self, question_id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/questions/{}", question_id)))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Put the listed questions first, in the given order
    pub async fn reorder_questions(&self, question_ids: Vec<Uuid>) -> Result<Vec<Question>> {
        let response = self
            .client
            .post(self.url("/questions/reorder"))
            .json(&ReorderQuestions { question_ids })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
