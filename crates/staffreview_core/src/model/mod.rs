//! Domain model for performance reviews.
//!
//! # Responsibility
//! - Define the review record and its field-level validation.
//! - Keep validation pure so it runs without a live store.
//!
//! # Invariants
//! - A record never holds a year below `MIN_REVIEW_YEAR` or a blank summary.
//! - Employee reference integrity is checked by the service layer, not here.

pub mod review;
