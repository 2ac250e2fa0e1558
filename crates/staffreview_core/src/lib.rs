//! Core persistence for employee performance reviews.
//! Validation, CRUD and identity tracking over a SQLite `reviews` table.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::review::{
    EmployeeId, ReviewId, ReviewRecord, ReviewValidationError, MIN_REVIEW_YEAR,
};
pub use repo::employee_repo::{EmployeeDirectory, SqliteEmployeeDirectory};
pub use repo::review_repo::{
    review_from_row, RepoError, RepoResult, ReviewRepository, SqliteReviewRepository,
};
pub use service::identity_map::IdentityMap;
pub use service::review_service::ReviewService;

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
