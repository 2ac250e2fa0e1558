use rusqlite::Connection;
use staffreview_core::db::migrations::{latest_version, schema_tables};
use staffreview_core::db::{open_db, open_db_in_memory, DbError};
use staffreview_core::{RepoError, SqliteReviewRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in schema_tables() {
        assert_table_exists(&conn, table);
    }
    assert_eq!(
        schema_tables().collect::<Vec<_>>(),
        vec!["departments", "employees", "reviews"]
    );
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO reviews (year, summary, employee_id) VALUES (2020, 'x', 404);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"), "unexpected error: {err}");
}

#[test]
fn employee_with_reviews_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO employees (id, name, job_title) VALUES (1, 'Lee', 'Engineer');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO reviews (year, summary, employee_id) VALUES (2021, 'Solid', 1);",
        [],
    )
    .unwrap();

    let err = conn
        .execute("DELETE FROM employees WHERE id = 1;", [])
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"), "unexpected error: {err}");

    conn.execute("DELETE FROM reviews WHERE employee_id = 1;", [])
        .unwrap();
    conn.execute("DELETE FROM employees WHERE id = 1;", [])
        .unwrap();
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffreview.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO employees (name, job_title) VALUES ('Lee', 'Engineer');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let employees: i64 = second
        .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(employees, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteReviewRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
