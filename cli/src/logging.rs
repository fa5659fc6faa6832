//! Diagnostics for `txwire`.
//!
//! stdout belongs to the command's result (a base64 string or a JSON
//! document that is usually piped onward), so every log line goes to
//! stderr. The default filter is `warn`: a successful run prints nothing
//! but its result.

use std::io::{self, IsTerminal};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shape of stderr log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// `"json"` in any case selects [`LogFormat::Json`]; anything else,
    /// including typos, falls back to [`LogFormat::Pretty`].
    pub fn from_str_lossy(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Builds the filter from `RUST_LOG` if set, else from `--log-level`.
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global subscriber. Must run once, before any command.
///
/// ```text
/// RUST_LOG=txwire_protocol=trace txwire decode <STRING>
/// ```
pub fn init_logging(default_level: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(default_level));

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(io::stderr().is_terminal())
                    .with_target(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr).with_current_span(false))
            .init(),
    }

    tracing::debug!(?format, "logging ready");
}
