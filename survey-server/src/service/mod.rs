//! Service Module
//!
//! Business logic layer for the survey server.
//! Services orchestrate between repositories and the pure engines in survey-core.

pub mod link;
pub mod question;
pub mod session;
pub mod stats;

// Re-export for convenience
pub use link as link_service;
pub use question as question_service;
pub use session as session_service;
pub use stats as stats_service;
