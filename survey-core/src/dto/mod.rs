//! Data Transfer Objects
//!
//! This module contains DTOs exchanged between the survey server and its
//! consumers (respondent front-ends, the typed client and the admin CLI).

pub mod link;
pub mod question;
pub mod response;
pub mod session;
pub mod stats;
