//! Embedded schema history for the review store.
//!
//! - `0001_staff`: `departments` and `employees`, the rows reviews point at.
//! - `0002_reviews`: the `reviews` table plus its `employee_id` index.
//!
//! Pending steps run inside one transaction, and each step must leave behind
//! every table it claims to own.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
    owns_tables: &'static [&'static str],
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "staff",
        sql: include_str!("0001_staff.sql"),
        owns_tables: &["departments", "employees"],
    },
    SchemaStep {
        version: 2,
        name: "reviews",
        sql: include_str!("0002_reviews.sql"),
        owns_tables: &["reviews"],
    },
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Tables created by the full migration history, in creation order.
pub fn schema_tables() -> impl Iterator<Item = &'static str> {
    SCHEMA_STEPS
        .iter()
        .flat_map(|step| step.owns_tables.iter().copied())
}

/// Upgrades the store to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
/// - `Migration` / `IncompleteMigration` when a step fails; nothing is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();

    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        run_step(&tx, step)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    Ok(())
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    let as_migration_error = |source: rusqlite::Error| DbError::Migration {
        version: step.version,
        name: step.name,
        source,
    };

    tx.execute_batch(step.sql).map_err(as_migration_error)?;

    for &table in step.owns_tables {
        let present: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
                [table],
                |row| row.get(0),
            )
            .map_err(as_migration_error)?;
        if !present {
            return Err(DbError::IncompleteMigration {
                version: step.version,
                table,
            });
        }
    }

    tx.pragma_update(None, "user_version", step.version)
        .map_err(as_migration_error)
}
