//! Review use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the review persistence lifecycle.
//! - Own session-scoped identity tracking.
//!
//! # See also
//! - `repo` for the SQL boundary.

pub mod identity_map;
pub mod review_service;
