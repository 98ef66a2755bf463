//! TrialStat Server: upload a filled template, get the report back.
//!
//! # Endpoints
//!
//! - `POST /v1/analyze`: CSV body (or JSON `{csv, config}`) → report + charts
//! - `GET  /v1/template`: empty CSV template
//! - `GET  /v1/schema`: study protocol guide
//! - `GET  /v1/health`: server status, version, request counters

mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use state::AppState;

/// TrialStat analysis server.
#[derive(Parser, Debug)]
#[command(name = "trialstat-server", version = ts_core::VERSION, about)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, default_value = "3743")]
    port: u16,

    /// Bind address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Per-request analysis timeout in seconds. Exceeding it returns 503.
    #[arg(long, default_value = "30")]
    timeout_s: u64,

    /// Maximum request body size in MiB.
    #[arg(long, default_value = "16")]
    max_body_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();
    if cli.timeout_s == 0 {
        anyhow::bail!("--timeout-s must be at least 1");
    }

    let state = Arc::new(AppState::new(Duration::from_secs(cli.timeout_s)));

    let app = Router::new()
        .merge(routes::router())
        .layer(DefaultBodyLimit::max(mb_to_bytes(cli.max_body_mb)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    tracing::info!(
        %addr,
        timeout_s = cli.timeout_s,
        version = ts_core::VERSION,
        "trialstat-server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn mb_to_bytes(mb: usize) -> usize {
    mb.saturating_mul(1024).saturating_mul(1024)
}
