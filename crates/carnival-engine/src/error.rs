//! Error types for the display engine binary.

/// Top-level error for the display engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: carnival_core::config::ConfigError,
    },

    /// The backend client could not be built.
    #[error("backend error: {source}")]
    Remote {
        /// The underlying client error.
        #[from]
        source: carnival_store::RemoteError,
    },

    /// The display API failed to start.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the failure.
        message: String,
    },
}
