use std::time::Duration;

use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens the pool for `database_url`, creating the file if needed, and applies migrations.
pub async fn init(database_url: &str) -> anyhow::Result<SqlitePool> {
	let options: SqliteConnectOptions = database_url
		.parse::<SqliteConnectOptions>()
		.context("invalid DATABASE_URL")?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(10)
		.min_connections(1)
		.acquire_timeout(Duration::from_secs(10))
		.connect_with(options)
		.await
		.context("failed to connect to database")?;

	MIGRATOR
		.run(&pool)
		.await
		.context("failed to run migrations")?;

	tracing::info!(migrations = MIGRATOR.iter().count(), "database ready");
	Ok(pool)
}
