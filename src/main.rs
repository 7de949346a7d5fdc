//! Agora API - Minimal DAO Governance Engine
//!
//! Members propose, vote, and finalize. A proposal is a tiny state machine:
//! it opens Pending, collects votes, and once quorum is reached finalizes
//! into Accepted (running the execution hook) or Rejected.

mod audit;
mod clock;
mod config;
mod error;
mod governance;
mod membership;
mod models;
mod proposal;
mod routes;
mod state;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Agora - DAO Governance Engine...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");
    if settings.governance.single_vote_per_member {
        info!("🗳️  One-vote-per-member enforcement is enabled");
    }

    // Build shared state (in-memory stores, system clock, stub executor)
    let state = Arc::new(AppState::new(&settings.governance));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Governance ───");
    info!("   POST /api/proposals               - Create new proposal");
    info!("   GET  /api/proposals               - List all proposals");
    info!("   GET  /api/proposals/{{id}}          - Get proposal by id");
    info!("   POST /api/proposals/{{id}}/votes    - Cast a vote");
    info!("   POST /api/proposals/{{id}}/finalize - Finalize once quorum is met");
    info!("");
    info!("   ─── Membership ───");
    info!("   POST /api/members                 - Add a member");
    info!("   GET  /api/members                 - List the roster");
    info!("");
    info!("   ─── Audit ───");
    info!("   GET  /api/audit                   - Recent governance actions");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,agora_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
