//! Survey HTTP Client
//!
//! A typed HTTP client for the survey server API, used by the `survey` CLI
//! and by anything else that needs to script the admin or respondent flows.
//!
//! # Example
//!
//! ```no_run
//! use survey_client::SurveyClient;
//! use survey_core::domain::role::Role;
//! use survey_core::dto::link::CreateLink;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SurveyClient::new("http://localhost:8080");
//!
//!     let link = client
//!         .create_link(CreateLink {
//!             role: Role::Nurse,
//!             label: "Ward 3".to_string(),
//!             expires_at: None,
//!             max_uses: Some(40),
//!         })
//!         .await?;
//!
//!     println!("Share {}", link.url);
//!     Ok(())
//! }
//! ```

pub mod error;
mod links;
mod questions;
mod sessions;
mod stats;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the survey server API
///
/// Methods are grouped by resource:
/// - Question management (create, list, update, reorder, delete)
/// - Distribution links (create, list, deactivate, QR image)
/// - Respondent sessions (start/resume, answer, complete)
/// - Results (sessions, responses, audio, stats)
#[derive(Debug, Clone)]
pub struct SurveyClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SurveyClient {
    /// Create a new client for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status and return the successful response
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Request failed with {}: {}", status, error_text);
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        self.check(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check(response).await?;
        Ok(())
    }

    /// Handle an API response with a raw body, returning its content type
    async fn handle_bytes_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(Option<String>, Vec<u8>)> {
        let response = self.check(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        Ok((content_type, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SurveyClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = SurveyClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/links"), "http://localhost:8080/api/links");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = SurveyClient::with_client("https://survey.example.org", Client::new());
        assert_eq!(client.base_url(), "https://survey.example.org");
    }
}
