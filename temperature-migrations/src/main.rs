use anyhow::Context;
use clap::Parser;
use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::{PgPoolOptions, Postgres};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Creates the temperature database if needed and applies pending schema scripts.
#[derive(Debug, Parser)]
#[command(name = "temperature-migrations", version)]
struct Args {
    /// PostgreSQL connection string of the target database
    connection_string: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match provision(&args.connection_string).await {
        Ok(()) => {
            info!("Database is up to date");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error caught while running: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn provision(connection_string: &str) -> anyhow::Result<()> {
    let exists = Postgres::database_exists(connection_string)
        .await
        .context("Failed to check whether the database exists")?;

    if exists {
        info!("Database already exists");
    } else {
        info!("Creating database...");
        Postgres::create_database(connection_string)
            .await
            .context("Failed to create the database")?;
        info!("Database created");
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(connection_string)
        .await
        .context("Failed to connect to the database")?;

    let migrator = sqlx::migrate!("./migrations");
    for migration in migrator.iter() {
        info!(
            "Known script {} {}",
            migration.version, migration.description
        );
    }

    info!("Applying pending scripts...");
    migrator
        .run(&pool)
        .await
        .context("Failed to apply schema scripts")?;

    pool.close().await;
    Ok(())
}
