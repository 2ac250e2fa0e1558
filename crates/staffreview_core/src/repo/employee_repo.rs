//! Employee existence checks for review reference integrity.
//!
//! Employee business logic lives elsewhere; reviews only need to know
//! whether an id currently resolves to a row.

use crate::model::review::EmployeeId;
use crate::repo::review_repo::{ensure_connection_ready, RepoResult};
use rusqlite::Connection;

/// Answers whether an employee id exists in the store.
pub trait EmployeeDirectory {
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool>;
}

/// SQLite-backed employee directory over the `employees` table.
pub struct SqliteEmployeeDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeDirectory<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "employees", &["id"])?;
        Ok(Self { conn })
    }
}

impl EmployeeDirectory for SqliteEmployeeDirectory<'_> {
    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
