//! Log subscriber setup for the `csep-xval` binary.
//!
//! Diagnostics go to stderr so that anything a command prints on stdout
//! (summaries, `--dump` JSON) can be piped cleanly.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Targets that follow the requested verbosity; all others stay at `warn`.
const CRATE_TARGETS: [&str; 2] = ["csep_xval_core", "csep_xval"];

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Newline-delimited JSON.
    Json,
}

impl From<bool> for LogFormat {
    fn from(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATE_TARGETS.iter().map(|t| format!("{t}={level}")));
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// Only the first call in a process has any effect.
pub fn init_tracing(format: impl Into<LogFormat>, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format.into() {
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init();
}
