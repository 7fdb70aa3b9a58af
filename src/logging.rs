//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout carries nothing but monitor output.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("serial_line_monitor={level},serial_monitor={level},warn")
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config, verbose)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    let result = match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(layer.pretty())
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_uses_config_level() {
        let config = LoggingConfig::default();
        assert_eq!(
            default_directive(&config, false),
            "serial_line_monitor=warn,serial_monitor=warn,warn"
        );
    }

    #[test]
    fn test_verbose_raises_level() {
        let config = LoggingConfig {
            level: "error".to_string(),
            ..Default::default()
        };
        assert!(default_directive(&config, true).starts_with("serial_line_monitor=debug"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let config = LoggingConfig::default();
        init(&config, false);
        init(&config, true);
    }
}
