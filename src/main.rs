use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use focus_api::auth::{Authenticator, JwtAuthenticator};
use focus_api::completion::{Completion, OpenAiCompletion, ScriptedCompletion};
use focus_api::config::{AppConfig, StorageBackend};
use focus_api::database::{MemoryStorage, PgStorage, Storage};
use focus_api::AppState;

#[derive(Parser)]
#[command(name = "focus-api")]
#[command(about = "Focus productivity API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides FOCUS_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Storage backend: postgres or memory (overrides DATABASE_BACKEND)")]
    storage: Option<StorageBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("focus_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(backend) = args.storage {
        config.database.backend = backend;
    }
    config.validate()?;
    tracing::info!("Starting Focus API in {:?} mode", config.environment);

    let authenticator: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::from_config(&config.security).context("session authenticator")?);
    let storage = build_storage(&config).await?;
    let completion = build_completion(&config)?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = focus_api::app(AppState::new(config, authenticator, storage, completion));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Focus API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn build_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn Storage>> {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageBackend::Postgres => {
            let storage = PgStorage::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            if config.database.bootstrap_schema {
                storage.bootstrap().await.context("failed to bootstrap schema")?;
            }
            Ok(Arc::new(storage))
        }
    }
}

fn build_completion(config: &AppConfig) -> anyhow::Result<Arc<dyn Completion>> {
    if config.completion.api_key.is_empty() && config.is_development() {
        tracing::warn!("No completion API key; note processing echoes a fixed reply");
        return Ok(Arc::new(ScriptedCompletion::new([
            "Processed note (development mode: set OPENAI_API_KEY for real output)",
        ])));
    }
    let completion = OpenAiCompletion::from_config(&config.completion).context("completion client")?;
    Ok(Arc::new(completion))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
