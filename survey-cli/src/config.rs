//! Configuration module

use survey_client::SurveyClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the survey server
    pub server_url: String,
}

impl Config {
    pub fn client(&self) -> SurveyClient {
        SurveyClient::new(&self.server_url)
    }
}
