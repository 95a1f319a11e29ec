use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use htrr_api::app::app;
use htrr_api::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "htrr-api")]
#[command(about = "Restaurant, user and position record API")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to serve on (overrides PORT)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, DB_*, etc.
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file found (assuming env vars are set)");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("htrr_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = htrr_api::config::config();
    tracing::info!("Starting htrr-api in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.run_migrations {
        DatabaseManager::migrate(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("App start at port: {}", port);

    axum::serve(listener, app(pool.clone(), config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
