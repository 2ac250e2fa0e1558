//! Review domain model.
//!
//! # Responsibility
//! - Hold one performance review tied to an employee.
//! - Validate every field on construction and on every assignment.
//!
//! # Invariants
//! - `id` is `None` until the store assigns a primary key.
//! - `year >= MIN_REVIEW_YEAR`.
//! - `summary` contains at least one non-whitespace character.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a persisted review row.
pub type ReviewId = i64;

/// Primary key of an employee row referenced by reviews.
pub type EmployeeId = i64;

/// Earliest accepted review year.
pub const MIN_REVIEW_YEAR: i64 = 2000;

/// Field-level validation failures for review records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    /// Stored or decoded year value is not an integer.
    YearNotInteger,
    /// Year is below `MIN_REVIEW_YEAR`.
    YearTooEarly {
        year: i64,
    },
    /// Summary is empty or whitespace-only.
    EmptySummary,
    /// Referenced employee does not exist in the store.
    UnknownEmployee(EmployeeId),
}

impl Display for ReviewValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearNotInteger => write!(f, "year must be an integer"),
            Self::YearTooEarly { year } => write!(
                f,
                "year must be greater than or equal to {MIN_REVIEW_YEAR}, got {year}"
            ),
            Self::EmptySummary => write!(f, "summary must not be empty"),
            Self::UnknownEmployee(id) => write!(f, "employee with id {id} does not exist"),
        }
    }
}

impl Error for ReviewValidationError {}

/// A performance review for one employee and one year.
///
/// Fields are private so every mutation goes through a validating setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReview")]
pub struct ReviewRecord {
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee_id: EmployeeId,
}

impl ReviewRecord {
    /// Creates a transient review (no id yet).
    ///
    /// # Errors
    /// - `YearTooEarly` when `year < MIN_REVIEW_YEAR`.
    /// - `EmptySummary` when `summary` is empty or whitespace-only.
    pub fn new(
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> Result<Self, ReviewValidationError> {
        Self::build(None, year, summary.into(), employee_id)
    }

    /// Creates a review carrying an id that already exists in storage.
    ///
    /// Used by row mapping; callers creating new reviews should use `new`.
    pub fn with_id(
        id: ReviewId,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
    ) -> Result<Self, ReviewValidationError> {
        Self::build(Some(id), year, summary.into(), employee_id)
    }

    fn build(
        id: Option<ReviewId>,
        year: i64,
        summary: String,
        employee_id: EmployeeId,
    ) -> Result<Self, ReviewValidationError> {
        let mut review = Self {
            id,
            year: MIN_REVIEW_YEAR,
            summary: String::new(),
            employee_id,
        };
        review.set_year(year)?;
        review.set_summary(summary)?;
        Ok(review)
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns whether this review has been assigned a primary key.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Sets the review year. The field is unchanged on error.
    pub fn set_year(&mut self, year: i64) -> Result<(), ReviewValidationError> {
        validate_year(year)?;
        self.year = year;
        Ok(())
    }

    /// Sets the summary verbatim. The field is unchanged on error.
    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ReviewValidationError> {
        let summary = summary.into();
        validate_summary(&summary)?;
        self.summary = summary;
        Ok(())
    }

    /// Sets the referenced employee id.
    ///
    /// Only shape is checked here; existence is verified by
    /// `ReviewService::assign_employee` and again on every save.
    pub fn set_employee_id(&mut self, employee_id: EmployeeId) {
        self.employee_id = employee_id;
    }

    /// Re-checks all in-memory invariants.
    pub fn validate(&self) -> Result<(), ReviewValidationError> {
        validate_year(self.year)?;
        validate_summary(&self.summary)
    }

    pub(crate) fn assign_id(&mut self, id: ReviewId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}

impl Display for ReviewRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Review {id}: ")?,
            None => write!(f, "<Review None: ")?,
        }
        write!(
            f,
            "{}, {}, Employee: {}>",
            self.year, self.summary, self.employee_id
        )
    }
}

/// Unvalidated wire shape; deserialization funnels through `TryFrom`.
#[derive(Deserialize)]
struct RawReview {
    #[serde(default)]
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee_id: EmployeeId,
}

impl TryFrom<RawReview> for ReviewRecord {
    type Error = ReviewValidationError;

    fn try_from(raw: RawReview) -> Result<Self, Self::Error> {
        Self::build(raw.id, raw.year, raw.summary, raw.employee_id)
    }
}

fn validate_year(year: i64) -> Result<(), ReviewValidationError> {
    if year < MIN_REVIEW_YEAR {
        return Err(ReviewValidationError::YearTooEarly { year });
    }
    Ok(())
}

fn validate_summary(summary: &str) -> Result<(), ReviewValidationError> {
    if summary.trim().is_empty() {
        return Err(ReviewValidationError::EmptySummary);
    }
    Ok(())
}
