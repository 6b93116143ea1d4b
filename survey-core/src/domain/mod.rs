//! Core domain types
//!
//! This module contains the core domain structures used across survey services.
//! These types represent the fundamental business entities and are shared between
//! the server (for persistence) and the client/CLI (for display).

pub mod link;
pub mod question;
pub mod response;
pub mod role;
pub mod session;
