//! Schema migrations for the status and index tables.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;

/// Migrations from `migrations/`, embedded in the binary at build time.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies pending migrations; already applied ones are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
