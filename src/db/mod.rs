//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for rides, location reports and push
//! subscriptions.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rides (
            hash TEXT PRIMARY KEY,
            corrida_number TEXT NOT NULL,
            driver_name TEXT NOT NULL,
            phone TEXT,
            plate TEXT,
            departure_location TEXT NOT NULL,
            final_location TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Waiting',
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            corrida_number TEXT NOT NULL,
            driver_name TEXT,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            precise INTEGER NOT NULL DEFAULT 0,
            reported_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // One endpoint per corrida: subscribe replaces, never appends.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            corrida_number TEXT PRIMARY KEY,
            endpoint TEXT NOT NULL,
            keys_json TEXT,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // corrida_number is a loose correlation key, not a foreign key; index it
    // on both sides of the join.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_rides_corrida_number ON rides(corrida_number);
        CREATE INDEX IF NOT EXISTS idx_rides_created_at ON rides(created_at);
        CREATE INDEX IF NOT EXISTS idx_locations_corrida_number ON locations(corrida_number);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
