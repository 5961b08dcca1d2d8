//! # Daydream Controls
//!
//! Bind a Daydream controller through Linux evdev and publish its button and
//! trackpad events.
//!
//! Usage: `daydream-controls [CONFIG_PATH]` (default `config/default.toml`).

use anyhow::{Context, Result};
use std::path::Path;
use tokio::time::Duration;
use tracing::{info, warn};

use daydream_controls::config::Config;
use daydream_controls::controller::calibration::Deadzone;
use daydream_controls::controller::daydream::{DaydreamControls, Headless};
use daydream_controls::controller::evdev_input::EvdevProvider;
use daydream_controls::controller::presence::GAMEPAD_ID_PREFIX;
use daydream_controls::events::{LoggingSink, Tee};
use daydream_controls::runner::{run, Poller};
use daydream_controls::telemetry::logger::EventLogger;

/// Configuration file read when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Loads the configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration
///    - Open the evdev provider and the optional event log
///
/// 2. **Main Loop**
///    - Poll input devices every `poll_interval_ms`
///    - Bind/unbind the controller and publish its events
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Deactivate the component (unbinds and emits `controllerdisconnected`)
///
/// # Errors
///
/// Returns error if:
/// - The config file exists but is invalid
/// - The event log directory cannot be created
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Daydream Controls v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Path::new(&config_path))?;

    let event_log = if config.event_log.enabled {
        let logger = EventLogger::from_config(&config.event_log)
            .context("Failed to open event log")?;
        info!("Logging events to {}", config.event_log.log_dir);
        Some(logger)
    } else {
        None
    };
    let mut sink = Tee(LoggingSink, event_log);

    let mut controls = DaydreamControls::new(config.controls.clone(), Headless, Headless)
        .with_deadzone(Deadzone::new(config.input.axis_deadzone));
    let mut poller = Poller::new(EvdevProvider::with_path(&config.input.device_path));

    info!(
        "Waiting for a \"{}\" controller (hand: {})",
        GAMEPAD_ID_PREFIX,
        controls.config().hand
    );
    info!("Press Ctrl+C to exit");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down...");
    };

    let ticks = run(
        &mut poller,
        &mut controls,
        &mut sink,
        Duration::from_millis(config.input.poll_interval_ms),
        shutdown,
    )
    .await;

    info!("Total polls: {}", ticks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/daydream/config.toml")).unwrap();
        assert_eq!(config.input.poll_interval_ms, 16);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = load_config(&path).unwrap();
        assert!(config.controls.model);
    }
}
