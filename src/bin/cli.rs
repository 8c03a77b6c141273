use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use rural_registry::config::load_env;
use rural_registry::seed;

#[derive(Parser, Debug)]
#[command(author, version, about = "rural registry maintenance tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new reversible migration pair with the provided name
    MakeMigration { name: String },
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Roll back the last applied migration
    MigrateRollback,
    /// Insert the demo data set (one account per role plus sample records)
    Seed {
        /// Password given to every seeded account
        #[arg(long, default_value = seed::DEFAULT_PASSWORD)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();

    let cli = Cli::parse();

    match cli.command {
        Commands::MakeMigration { name } => {
            let (up, down) = make_migration_files(&name)?;
            println!("Created migration: {}", up.display());
            println!("Created migration: {}", down.display());
        }
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            migrator.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            print_status(&pool, &migrator).await?;
        }
        Commands::MigrateRollback => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            let last = last_applied_version(&pool)
                .await?
                .context("no migrations were rolled back")?;
            migrator
                .undo(&pool, last - 1)
                .await
                .context("rollback failed")?;
            println!("Rolled back migration {}", last);
        }
        Commands::Seed { password } => {
            let pool = get_pool().await?;
            get_migrator().await?.run(&pool).await?;
            let summary = seed::run(&pool, &password).await?;
            println!(
                "Seeded {} users, {} producers, {} properties, {} herds, {} production units",
                summary.users, summary.produtores, summary.propriedades, summary.rebanhos, summary.unidades
            );
        }
    }

    Ok(())
}

fn make_migration_files(name: &str) -> anyhow::Result<(PathBuf, PathBuf)> {
    // sqlx reads the leading integer as the version
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let sanitized = sanitize_name(name);
    let up = Path::new("migrations").join(format!("{}_{}.up.sql", timestamp, sanitized));
    let down = Path::new("migrations").join(format!("{}_{}.down.sql", timestamp, sanitized));

    if up.exists() || down.exists() {
        anyhow::bail!("migration already exists: {}", up.display());
    }

    fs::write(&up, "-- Write your migration SQL here\n")
        .with_context(|| format!("failed to create migration at {}", up.display()))?;
    fs::write(&down, "-- Revert the matching up migration here\n")
        .with_context(|| format!("failed to create migration at {}", down.display()))?;

    Ok((up, down))
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let options = database_url
        .parse::<SqliteConnectOptions>()
        .context("invalid DATABASE_URL")?
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to connect to database")
}

async fn applied_versions(pool: &SqlitePool) -> anyhow::Result<Vec<i64>> {
    let table: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'")
            .fetch_optional(pool)
            .await?;
    if table.is_none() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1 ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().filter_map(|row| row.try_get::<i64, _>("version").ok()).collect())
}

async fn last_applied_version(pool: &SqlitePool) -> anyhow::Result<Option<i64>> {
    Ok(applied_versions(pool).await?.last().copied())
}

async fn print_status(pool: &SqlitePool, migrator: &sqlx::migrate::Migrator) -> anyhow::Result<()> {
    let applied: HashSet<i64> = applied_versions(pool).await?.into_iter().collect();

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in migrator.iter().filter(|m| m.migration_type.is_up_migration()) {
        let status = if applied.contains(&migration.version) { "applied" } else { "pending" };
        let desc = migration.description.as_ref().trim();
        let name = if desc.is_empty() { "unknown" } else { desc };
        println!("{:<8} {:<20} {}", status, migration.version, name);
    }

    Ok(())
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}

async fn get_migrator() -> anyhow::Result<sqlx::migrate::Migrator> {
    // ./migrations when run from the repo root, else the crate-local folder
    let local = Path::new("./migrations");
    let migrator_path = if local.exists() {
        local.to_path_buf()
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    };

    let display = migrator_path.display().to_string();
    sqlx::migrate::Migrator::new(migrator_path)
        .await
        .with_context(|| format!("failed to load migrations from {}", display))
}
