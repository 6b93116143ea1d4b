//! Distribution link API endpoints

use crate::SurveyClient;
use crate::error::Result;
use survey_core::dto::link::{CreateLink, LinkSummary, PublicLinkInfo};
use uuid::Uuid;

impl SurveyClient {
    // =============================================================================
    // Link Management
    // =============================================================================

    /// Create a distribution link; the server generates the tracking code
    pub async fn create_link(&self, req: CreateLink) -> Result<LinkSummary> {
        let response = self
            .client
            .post(self.url("/links"))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List all links with their current status
    pub async fn list_links(&self) -> Result<Vec<LinkSummary>> {
        let response = self.client.get(self.url("/links")).send().await?;

        self.handle_response(response).await
    }

    /// Get a link by ID
    pub async fn get_link(&self, link_id: Uuid) -> Result<LinkSummary> {
        let response = self
            .client
            .get(self.url(&format!("/links/{}", link_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Stop a link from starting new sessions
    pub async fn deactivate_link(&self, link_id: Uuid) -> Result<LinkSummary> {
        let response = self
            .client
            .post(self.url(&format!("/links/{}/deactivate", link_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a link and everything collected through it
    pub async fn delete_link(&self, link_id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/links/{}", link_id)))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Placeholder QR image (SVG markup) for the link's survey URL
    pub async fn link_qr_svg(&self, link_id: Uuid) -> Result<String> {
        let response = self
            .client
            .get(self.url(&format!("/links/{}/qr.svg", link_id)))
            .send()
            .await?;

        let (_, bytes) = self.handle_bytes_response(response).await?;
        String::from_utf8(bytes)
            .map_err(|e| crate::ClientError::ParseError(format!("QR image is not UTF-8: {}", e)))
    }

    /// Public information about a tracking code, as a respondent sees it
    pub async fn link_info(&self, code: &str) -> Result<PublicLinkInfo> {
        let response = self
            .client
            .get(self.url(&format!("/s/{}", code)))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
