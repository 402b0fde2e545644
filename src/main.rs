use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use notes_api::config::AppConfig;
use notes_api::database::DatabaseManager;
use notes_api::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "notes-api", version, about = "Personal notes API server")]
struct Args {
    /// Port to listen on (overrides NOTES_API_PORT / PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Create missing tables before serving
    #[arg(long)]
    init_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notes_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set");
    }
    tracing::info!("Starting Notes API in {:?} mode", config.environment);

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    database.health_check().await.context("database health check failed")?;
    if args.init_schema {
        database.ensure_schema().await.context("failed to initialize schema")?;
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(config, database.engine());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Notes API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
