mod app;
mod args;
mod config;
mod routes;
mod sessions;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::args::Args;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "public" = %config.server.public.display(),
        "seed" = ?config.game.seed,
        "merge_mode" = ?config.game.merge_mode,
        "max_sessions" = config.server.max_sessions
    );
    let state = AppState::new(config.game.clone(), config.max_sessions()?)?;
    let router = app::router(state, &config.server.public);

    let addr = config.addr()?;
    info!("listening" = %addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutting down");
}
