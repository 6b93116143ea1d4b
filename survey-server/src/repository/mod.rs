//! Repository Module
//!
//! Data access layer for the survey server.
//! Each repository handles database operations for a specific domain entity.

pub mod link;
pub mod question;
pub mod response;
pub mod session;

// Re-export for convenience
pub use link as link_repository;
pub use question as question_repository;
pub use response as response_repository;
pub use session as session_repository;
