//! Postgres pool setup and migration runner.
//!
//! Hosts that configure `DATABASE_URL` call `init_pool` once at startup and
//! hand the pool to `PgNoteRepo` / `PgConnectionRepo`.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;
    info!(max_connections, "notes database ready");

    Ok(pool)
}
