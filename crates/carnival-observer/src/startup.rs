//! Background launch of the display API alongside the display loop.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the display API server on a background Tokio task.
///
/// The address is validated before the task is spawned so an obvious
/// misconfiguration fails startup instead of a background log line.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if `host:port` is not a valid
/// socket address.
pub fn spawn_observer(
    host: &str,
    port: u16,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let config = ServerConfig {
        host: host.to_owned(),
        port,
    };
    let addr = config.addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "Display API exited with error");
        }
    });

    tracing::info!(%addr, "Display API spawned on background task");

    Ok(handle)
}
