//! Server configuration
//!
//! Defines the configurable parameters of the survey server, loaded from
//! environment variables with development-friendly defaults.

use std::env;

use survey_core::link_code;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string (e.g., "sqlite://survey.db")
    pub database_url: String,

    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// Base URL respondents reach the survey on; used to build link URLs
    pub public_url: String,

    /// Length of generated tracking codes
    pub link_code_length: usize,

    /// Largest accepted audio recording, in bytes (after base64 decoding)
    pub max_audio_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite database (default: "sqlite://survey.db")
    /// - `SURVEY_BIND_ADDR` - Listen address (default: "0.0.0.0:8080")
    /// - `SURVEY_PUBLIC_URL` - Public base URL (default: "http://localhost:8080")
    /// - `LINK_CODE_LENGTH` - Tracking code length (default: 8)
    /// - `MAX_AUDIO_BYTES` - Audio size cap (default: 10 MiB)
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://survey.db".to_string()),
            bind_addr: env::var("SURVEY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            public_url: env::var("SURVEY_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            link_code_length: env::var("LINK_CODE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(link_code::DEFAULT_LENGTH),
            max_audio_bytes: env::var("MAX_AUDIO_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("database_url cannot be empty".to_string());
        }

        if !self.public_url.starts_with("http://") && !self.public_url.starts_with("https://") {
            return Err("public_url must start with http:// or https://".to_string());
        }

        if !(link_code::MIN_LENGTH..=link_code::MAX_LENGTH).contains(&self.link_code_length) {
            return Err(format!(
                "link_code_length must be between {} and {}",
                link_code::MIN_LENGTH,
                link_code::MAX_LENGTH
            ));
        }

        if self.max_audio_bytes == 0 {
            return Err("max_audio_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://survey.db".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            public_url: "http://localhost:8080".to_string(),
            link_code_length: link_code::DEFAULT_LENGTH,
            max_audio_bytes: 10 * 1024 * 1024,
        }
    }
}
