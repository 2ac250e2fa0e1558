//! CLI smoke entry point.
//!
//! Prints core wiring facts. With a database path argument it also opens
//! (and migrates) that file and reports how many reviews it holds.

use staffreview_core::db::migrations::latest_version;
use staffreview_core::db::open_db;
use staffreview_core::{ReviewService, SqliteEmployeeDirectory, SqliteReviewRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("staffreview_core ping={}", staffreview_core::ping());
    println!("staffreview_core version={}", staffreview_core::core_version());
    println!("staffreview_core schema_version={}", latest_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match count_reviews(&path) {
        Ok(count) => {
            println!("staffreview_core db={path} reviews={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("staffreview_core db={path} error={err}");
            ExitCode::FAILURE
        }
    }
}

fn count_reviews(path: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let conn = open_db(path)?;
    let mut service = ReviewService::new(
        SqliteReviewRepository::try_new(&conn)?,
        SqliteEmployeeDirectory::try_new(&conn)?,
    );
    Ok(service.get_all()?.len())
}
