use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snaptext::api::{create_router, AppState};
use snaptext::config::Config;
use snaptext::extract::local::LocalOcrProvider;
use snaptext::extract::remote::GeminiExtractor;

#[derive(Parser)]
#[command(name = "snaptext")]
#[command(about = "Image-to-text extraction service backed by a hosted multimodal model or local OCR")]
struct Args {
    /// Validate configuration and exit without starting the server
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snaptext=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(anyhow::anyhow!("configuration error"));
        }
    };

    if args.check_config {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    tracing::info!("Initializing remote extractor: {}...", config.gemini.model);
    let remote = GeminiExtractor::new(&config.gemini)?;

    tracing::info!(
        "Initializing local OCR engine: {}...",
        config.ocr.languages.join(",")
    );
    let local = LocalOcrProvider::new(&config.ocr);
    if !local.is_available().await {
        tracing::warn!("Local OCR unavailable - only the remote backend will work");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, remote, local);
    let app = create_router(state);

    tracing::info!("Snaptext starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}
