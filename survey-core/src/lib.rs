//! Survey Core
//!
//! Core types and pure logic for the survey platform.
//!
//! This crate contains:
//! - Domain types: Core business entities (Question, DistributionLink, Session, etc.)
//! - DTOs: Data transfer objects exchanged between server, client and CLI
//! - Engines: question visibility, session resume, answer validation and statistics
//! - Helpers: tracking codes, respondent fingerprints and the placeholder QR pattern

pub mod answers;
pub mod conditions;
pub mod domain;
pub mod dto;
pub mod fingerprint;
pub mod link_code;
pub mod qr;
pub mod resume;
pub mod stats;
