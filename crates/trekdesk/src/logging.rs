//! Logging setup.
//!
//! The library only emits `tracing` events. The binary installs a `fmt`
//! subscriber on stderr, leaving stdout to command output.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty the `trekdesk` target is, set by `-q` and `-v` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Record changes and warnings about skipped rows.
    #[default]
    Normal,
    /// Adds lock and table activity.
    Verbose,
    /// Everything, including lock acquisition.
    Trace,
}

impl Verbosity {
    /// Most detailed level shown at this verbosity.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Install the stderr subscriber.
///
/// A set `RUST_LOG` replaces the filter derived from `verbosity`, so
/// `RUST_LOG=trekdesk::store=trace` narrows output to the storage layer.
/// Later calls are no-ops.
///
/// ```no_run
/// use trekdesk::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

/// Filter directive used when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbosity: Verbosity) -> String {
    format!("trekdesk={}", verbosity.level())
}

/// Route events to the test harness's captured output, warnings and up.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("trekdesk=warn")
        .with_test_writer()
        .try_init();
}
