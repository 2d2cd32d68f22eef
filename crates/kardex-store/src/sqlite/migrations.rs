//! Embedded SQL migrations.
//!
//! The `sqlx::migrate!()` macro embeds every file from `migrations/sqlite`
//! into the binary at compile time; applied versions are tracked in the
//! `_sqlx_migrations` table, so running is idempotent.
//!
//! ## Adding New Migrations
//! 1. Create the next `NNN_description.sql` in `migrations/sqlite/`
//! 2. Write idempotent SQL (`IF NOT EXISTS` where possible)
//! 3. **NEVER** modify an existing migration - always add a new one

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Applying pending migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}
