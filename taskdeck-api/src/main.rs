//! # Taskdeck Web Server
//!
//! Multi-user task manager: registration, login, and per-account task lists
//! rendered as HTML.
//!
//! ## Usage
//!
//! ```bash
//! SESSION_SECRET=$(openssl rand -hex 32) cargo run -p taskdeck-api -- --port 3000
//! ```

use anyhow::Context;
use clap::Parser;
use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::{
    auth::session,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Taskdeck web server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(long)]
    debug: bool,

    /// Host to bind to (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides API_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "taskdeck_api=debug,taskdeck_shared=debug,tower_http=debug"
    } else {
        "taskdeck_api=info,taskdeck_shared=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Taskdeck v{} starting...", env!("CARGO_PKG_VERSION"));

    // --- Configuration ---
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }

    // --- Database ---
    let pool = create_pool(config.pool_config())
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;

    let report = run_migrations(&pool)
        .await
        .context("Failed to upgrade database schema")?;
    tracing::info!(
        applied = report.applied.len(),
        tolerated_failures = report.tolerated_failures.len(),
        "Database schema ready"
    );

    let purged = session::purge_expired(&pool).await?;
    if purged > 0 {
        tracing::info!(purged, "Removed expired sessions");
    }

    // --- Server ---
    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {bind_address}"))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

/// Waits for Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
