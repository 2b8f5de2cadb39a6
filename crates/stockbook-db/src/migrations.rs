//! # Database Migrations
//!
//! Embedded SQL migrations, applied in order and tracked in the
//! `_sqlx_migrations` table so each runs exactly once.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Embedded migrations from the migrations/sqlite directory.
///
/// The `migrate!` macro embeds migration files at compile time, so the
/// binary is self-contained and needs no migration files at runtime.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations.
///
/// Idempotent: applied migrations are recorded and skipped on later runs.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!("Checking for pending migrations");
    MIGRATOR.run(pool).await?;
    info!("Database schema is up to date");
    Ok(())
}

/// Returns the list of applied migration versions.
pub async fn applied_versions(pool: &SqlitePool) -> DbResult<Vec<i64>> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT version FROM _sqlx_migrations ORDER BY version")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(v,)| v).collect())
}
