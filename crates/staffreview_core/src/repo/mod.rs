//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL text and row mapping inside the persistence boundary.
//! - Expose the employee existence check used for reference integrity.
//!
//! # Invariants
//! - Write paths call `ReviewRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories hold no cached state; identity tracking lives in services.

pub mod employee_repo;
pub mod review_repo;
