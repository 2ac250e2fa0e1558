//! Review repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD statements over the `reviews` table.
//! - Map raw rows to validated `ReviewRecord` values.
//!
//! # Invariants
//! - Inserts never send a caller-chosen id; the store assigns it.
//! - Listing all reviews applies no ordering; callers get storage order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::review::{EmployeeId, ReviewId, ReviewRecord, ReviewValidationError};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REVIEW_SELECT_SQL: &str = "SELECT
    id,
    year,
    summary,
    employee_id
FROM reviews";

const REVIEW_COLUMNS: [&str; 4] = ["id", "year", "summary", "employee_id"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for review persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReviewValidationError),
    Db(DbError),
    NotFound(ReviewId),
    /// Operation needs a persisted review but got one without an id.
    Transient,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "review not found: {id}"),
            Self::Transient => write!(f, "review has no id; save it first"),
            Self::InvalidData(message) => write!(f, "invalid persisted review data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReviewValidationError> for RepoError {
    fn from(value: ReviewValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for review CRUD operations.
pub trait ReviewRepository {
    /// Inserts the review's fields and returns the store-assigned id.
    fn insert_review(&self, review: &ReviewRecord) -> RepoResult<ReviewId>;
    /// Rewrites every column of the row keyed by `review.id()`.
    fn update_review(&self, review: &ReviewRecord) -> RepoResult<()>;
    fn get_review(&self, id: ReviewId) -> RepoResult<Option<ReviewRecord>>;
    fn list_reviews(&self) -> RepoResult<Vec<ReviewRecord>>;
    fn list_reviews_for_employee(&self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewRecord>>;
    /// Deletes a row by id. Returns whether a row was removed.
    fn delete_review(&self, id: ReviewId) -> RepoResult<bool>;
}

/// SQLite-backed review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "reviews", &REVIEW_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn insert_review(&self, review: &ReviewRecord) -> RepoResult<ReviewId> {
        review.validate()?;

        self.conn.execute(
            "INSERT INTO reviews (year, summary, employee_id)
             VALUES (?1, ?2, ?3);",
            params![review.year(), review.summary(), review.employee_id()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_review(&self, review: &ReviewRecord) -> RepoResult<()> {
        let id = review.id().ok_or(RepoError::Transient)?;
        review.validate()?;

        let changed = self.conn.execute(
            "UPDATE reviews
             SET
                year = ?1,
                summary = ?2,
                employee_id = ?3
             WHERE id = ?4;",
            params![review.year(), review.summary(), review.employee_id(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_review(&self, id: ReviewId) -> RepoResult<Option<ReviewRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(review_from_row(row)?));
        }

        Ok(None)
    }

    fn list_reviews(&self) -> RepoResult<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(&format!("{REVIEW_SELECT_SQL};"))?;
        let rows = stmt.query([])?;
        collect_reviews(rows)
    }

    fn list_reviews_for_employee(&self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REVIEW_SELECT_SQL}
             WHERE employee_id = ?1
             ORDER BY id ASC;"
        ))?;
        let rows = stmt.query([employee_id])?;
        collect_reviews(rows)
    }

    fn delete_review(&self, id: ReviewId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

/// Maps one `(id, year, summary, employee_id)` row to a validated review.
///
/// Column types are checked explicitly because SQLite does not enforce
/// declared affinities; a `REAL` or `TEXT` year is a validation failure.
pub fn review_from_row(row: &Row<'_>) -> RepoResult<ReviewRecord> {
    let id: ReviewId = row.get("id")?;

    let year = match row.get::<_, Value>("year")? {
        Value::Integer(year) => year,
        _ => return Err(ReviewValidationError::YearNotInteger.into()),
    };

    let summary = match row.get::<_, Value>("summary")? {
        Value::Text(summary) => summary,
        Value::Null => {
            return Err(RepoError::InvalidData(format!(
                "null summary in reviews.summary for id {id}"
            )));
        }
        other => {
            return Err(RepoError::InvalidData(format!(
                "unexpected summary type `{}` in reviews.summary for id {id}",
                other.data_type()
            )));
        }
    };

    let employee_id = row
        .get::<_, Option<EmployeeId>>("employee_id")?
        .ok_or_else(|| {
            RepoError::InvalidData(format!("null employee_id in reviews.employee_id for id {id}"))
        })?;

    Ok(ReviewRecord::with_id(id, year, summary, employee_id)?)
}

fn collect_reviews(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<ReviewRecord>> {
    let mut reviews = Vec::new();
    while let Some(row) = rows.next()? {
        reviews.push(review_from_row(row)?);
    }
    Ok(reviews)
}

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
