//! Display engine binary for the carnival display.
//!
//! Wires together the event store, the persistence backend, the display
//! loop, and the display API, then runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `carnival-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the store from the persistence backend
//! 4. Create the shared venue and stop control
//! 5. Start the display API server
//! 6. Install the `Ctrl-C` handler
//! 7. Run the display loop
//! 8. Log the result

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use carnival_core::config::LoggingConfig;
use carnival_core::{CarnivalConfig, DisplayControl, Venue, VenueClock, run_display};
use carnival_observer::AppState;
use carnival_store::{EventStore, RemoteBackend};
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Path of the optional configuration file, relative to the working
/// directory.
const CONFIG_PATH: &str = "carnival-config.yaml";

/// Application entry point for the display engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the backend URL cannot
/// be used, or the API server cannot be started.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = CarnivalConfig::load_or_default(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);

    info!("carnival-engine starting");
    info!(
        tick_interval_ms = config.display.tick_interval_ms,
        rotation_interval_ms = config.display.rotation_interval_ms,
        takeover_secs = config.display.takeover_secs,
        lock_window_minutes = config.display.lock_window_minutes,
        backend_url = config.backend.url,
        "Configuration loaded"
    );

    // 3. Load the store from the backend. An unreachable backend leaves
    //    the store empty; the display still runs.
    let remote = RemoteBackend::new(&config.backend.url, config.backend.request_timeout())?;
    let mut store = EventStore::new();
    info!(url = remote.base_url(), "Loading store from backend");
    if !carnival_store::initialize_from_api(&mut store, &remote).await {
        warn!("Display starting with an empty store");
    }

    // 4. Create the shared venue and stop control.
    let venue = Arc::new(RwLock::new(Venue::new(store)));
    let control = Arc::new(DisplayControl::new());

    let mut app_state = AppState::new(Arc::clone(&venue)).with_control(Arc::clone(&control));
    if config.backend.mirror_enabled {
        app_state = app_state.with_remote(remote);
    } else {
        info!("Backend mirroring disabled");
    }
    let app_state = Arc::new(app_state);

    // 5. Start the display API server.
    let observer_handle = carnival_observer::spawn_observer(
        &config.observer.host,
        config.observer.port,
        Arc::clone(&app_state),
    )
    .map_err(|e| EngineError::Observer {
        message: format!("{e}"),
    })?;
    info!(
        host = config.observer.host,
        port = config.observer.port,
        "Display API server started"
    );

    // 6. Stop cleanly on Ctrl-C.
    let signal_control = Arc::clone(&control);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping display");
                signal_control.request_stop();
            }
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    // 7. Run the display loop.
    let mut callback = ObserverCallback::new(Arc::clone(&app_state));
    let result = run_display(
        &venue,
        &config.display,
        VenueClock::System,
        &control,
        &mut callback,
    )
    .await;

    // 8. Log the result.
    observer_handle.abort();
    info!(
        ticks = result.ticks,
        rotations = result.rotations,
        takeovers_dismissed = result.takeovers_dismissed,
        uptime_seconds = control.uptime_seconds(),
        "carnival-engine stopped"
    );

    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

