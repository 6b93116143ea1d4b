//! Results summary endpoint

use crate::SurveyClient;
use crate::error::Result;
use survey_core::domain::role::Role;
use survey_core::dto::stats::SurveyStats;

impl SurveyClient {
    /// Survey statistics, optionally restricted to one role
    pub async fn stats(&self, role: Option<Role>) -> Result<SurveyStats> {
        let mut request = self.client.get(self.url("/stats"));
        if let Some(role) = role {
            request = request.query(&[("role", role.as_str())]);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }
}
