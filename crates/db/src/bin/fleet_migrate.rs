//! Connects to the configured database, checks it is reachable and applies
//! pending migrations.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_db=info,fleet_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Migration run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = fleet_db::DbConfig::from_env()?;
    tracing::info!(max_connections = config.max_connections, "Loaded database configuration");

    let pool = fleet_db::create_pool(&config).await?;
    tracing::info!("Database connection pool created");

    fleet_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    fleet_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    pool.close().await;
    Ok(())
}
