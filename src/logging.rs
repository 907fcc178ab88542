//! Logging setup
//!
//! Installs a `tracing` subscriber with an `EnvFilter` (`RUST_LOG` wins over
//! the configured level), human or JSON output on stderr, and optionally a
//! daily-rolling log file.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::core::{GatekeeperError, GatekeeperResult};

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "gatekeeper.log";

/// Build the filter: `RUST_LOG` if set, otherwise the configured directive
pub fn build_filter(config: &LoggingConfig) -> GatekeeperResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|err| {
            GatekeeperError::InvalidConfig(format!("log level '{}': {}", config.level, err))
        }),
    }
}

/// Initialize the global subscriber
///
/// Keep the returned guard alive for the life of the process; dropping it
/// stops the background file writer.
pub fn init_logging(config: &LoggingConfig) -> GatekeeperResult<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|err| GatekeeperError::other(format!("failed to install logger: {}", err)))?;

    tracing::debug!(
        level = %config.level,
        json = config.json,
        log_dir = ?config.log_dir,
        "Logging initialized"
    );

    Ok(guard)
}
