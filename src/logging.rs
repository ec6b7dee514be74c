//! Log sink setup.
//!
//! Events go to an append-only log file (no ANSI) and to stderr. The
//! subscriber is installed as the scoped default of the calling thread for as
//! long as the [`LogHandle`] lives; the binary runs a current-thread runtime,
//! so that covers every task.

use crate::config::LoggingConfig;
use crate::error::{DdnsError, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Local wall-clock timestamps, millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Open log sink. Call [`LogHandle::close`] on clean shutdown.
pub struct LogHandle {
    file: Arc<File>,
    _guard: DefaultGuard,
}

impl LogHandle {
    /// Open the log file and start routing `tracing` events to it.
    pub fn open(config: &LoggingConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.file)
            .map_err(|e| {
                DdnsError::Config(format!("cannot open log file {}: {}", config.file.display(), e))
            })?;
        let file = Arc::new(file);

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .map_err(|e| DdnsError::Config(format!("invalid log level {}: {}", config.level, e)))?;

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::clone(&file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(LocalTime),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_timer(LocalTime),
            );

        let guard = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            file,
            _guard: guard,
        })
    }

    /// Flush the log file to disk and uninstall the subscriber.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
