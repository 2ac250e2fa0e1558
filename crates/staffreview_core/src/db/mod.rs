//! Review store bootstrap: connection setup and schema migrations.
//!
//! # Responsibility
//! - Hand out connections that repositories can borrow directly.
//! - Bring the `departments` / `employees` / `reviews` schema up to date.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Returned connections enforce foreign keys, so `reviews.employee_id`
//!   can never point at a missing employee row, and an employee that still
//!   has reviews cannot be deleted.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures raised while opening or migrating the review store.
#[derive(Debug)]
pub enum DbError {
    /// Driver error outside of a specific migration step.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build of the review store.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// A migration script failed; the whole upgrade was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// A migration ran but one of the tables it owns is absent afterwards.
    IncompleteMigration {
        version: u32,
        table: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "review store schema version {found} is newer than supported {supported}"
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration {version:04}_{name} failed: {source}"),
            Self::IncompleteMigration { version, table } => write!(
                f,
                "migration {version:04} finished without creating table `{table}`"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::IncompleteMigration { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
