//! Pressroom - Main entry point.
//!
//! Starts the articles API server with structured JSON logging and
//! graceful shutdown handling (SIGTERM/SIGINT).
//!
//! # Configuration
//!
//! See [`pressroom::config`] for environment variable configuration.
//!
//! # Example
//!
//! ```bash
//! PRESSROOM_JWT_SECRET="change-me" \
//! PRESSROOM_USERS="6a0f1c52-0d0e-4c07-9f52-9d1f5c3a0001:Admin:admin@example.com:admin" \
//! PORT=8080 \
//! cargo run --release
//! ```

use std::process::ExitCode;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use pressroom::config::Config;
use pressroom::routes::{create_router, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("Required environment variables:");
            eprintln!("  PRESSROOM_JWT_SECRET - HS256 secret for token verification");
            eprintln!();
            eprintln!("Optional environment variables:");
            eprintln!("  PRESSROOM_USERS      - Seed users: id:name:email:role,...");
            eprintln!("  PORT                 - HTTP server port (default: 8080)");
            eprintln!("  RUST_LOG             - Log level filter (default: info)");
            return ExitCode::from(1);
        }
    };

    info!(
        port = config.port,
        seed_users = config.users.len(),
        "Pressroom server starting"
    );

    let state = AppState::new(config.clone());
    let app = create_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => {
            info!(address = %bind_addr, "Server listening");
            listener
        }
        Err(err) => {
            error!(error = %err, address = %bind_addr, "Failed to bind to address");
            return ExitCode::from(1);
        }
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    info!("Server ready to accept connections");

    if let Err(err) = server.await {
        error!(error = %err, "Server error");
        return ExitCode::from(1);
    }

    info!("Server shutdown complete");
    ExitCode::SUCCESS
}

/// Initialize structured logging with tracing.
///
/// JSON-formatted output with environment-based filtering via RUST_LOG,
/// defaulting to `info`.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,axum::rejection=trace"));

    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();
}

/// Resolves when a shutdown signal is received.
///
/// Listens for SIGTERM (orchestrator shutdown) and SIGINT (Ctrl+C); axum's
/// graceful shutdown then lets in-flight requests complete.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
