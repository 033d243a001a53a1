//! Logging setup for the `logbook` binary.
//!
//! Library code only emits `tracing` events; the subscriber is installed here
//! once at startup. Events from dependencies (`printpdf`, `reqwest`, ...)
//! stay silent unless `RUST_LOG` asks for them.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate whose events the default filter lets through.
const TARGET: &str = "logbook";

/// How much the exporter reports, from `-q` to `-vv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Progress of the export (rows read, pages written).
    #[default]
    Normal,
    /// Per-row decisions such as skipped rows and missing airports.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Most detailed level shown at this verbosity.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Filter directive used when `RUST_LOG` is unset, e.g. `logbook=INFO`.
fn default_filter(verbosity: Verbosity) -> String {
    format!("{TARGET}={}", verbosity.to_level_filter())
}

/// `RUST_LOG` when it parses, otherwise the verbosity default.
fn env_filter(rust_log: Option<&str>, verbosity: Verbosity) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(verbosity)))
}

/// Install the console subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`. A second call is a no-op.
///
/// # Examples
///
/// ```no_run
/// use logbook::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(rust_log.as_deref(), verbosity))
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        );

    let _ = subscriber.try_init();
}

/// Route warnings from code under test through the test writer.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
