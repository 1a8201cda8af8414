pub mod app;
pub mod handlers;
pub mod middleware;

pub use app::{create_app, AppState};
pub use handlers::{health_check, receive_webhook};

use crate::config::Config;
use crate::error::{AppError, ServerError};
use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpListener};
use tokio::signal;
use tracing::info;

/// Run the webhook gateway until Ctrl+C or SIGTERM
pub async fn run_server(config: Config) -> Result<(), AppError> {
    config.server.validate()?;
    let bind_address = config.server.bind_address();

    let app = create_app(AppState::new(config)?);

    let addr: SocketAddr = lookup_host(&bind_address)
        .await
        .map_err(|e| ServerError::BindError {
            address: bind_address.clone(),
            source: e,
        })?
        .next()
        .ok_or_else(|| {
            ServerError::StartupError(format!("no address resolved for {bind_address}"))
        })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::BindError {
            address: addr.to_string(),
            source: e,
        })?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::StartupError(format!("server error: {e}")))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
