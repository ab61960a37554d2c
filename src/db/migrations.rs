use sqlx::{Pool, Postgres};
use tracing::info;

/// Run all pending database migrations
///
/// Safe to run multiple times; sqlx records which migrations were applied.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations...");

    // Embedded at compile time from the migrations/ directory
    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    info!("Database migrations completed successfully");
    Ok(())
}
