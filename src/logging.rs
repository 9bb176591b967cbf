//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout carries only reports (and the TUI owns the
//! terminal). `RUST_LOG` wins over the configured level.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingSettings};

/// Install the global subscriber. Calling this twice is harmless; the second
/// call is ignored.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match settings.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Full => builder.try_init(),
    };
}

/// Quiet logging for the TUI: only warnings and errors, unless `RUST_LOG`
/// says otherwise. Info lines would tear the alternate screen.
pub fn tui_settings(settings: &LoggingSettings) -> LoggingSettings {
    LoggingSettings {
        level: "warn".to_string(),
        format: settings.format,
    }
}
