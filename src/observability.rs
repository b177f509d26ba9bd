//! Structured logging configuration.
//!
//! Sets up the `tracing` subscriber with:
//! - A level filter that `RUST_LOG` can override
//! - Plain text or JSON output on stderr

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

use crate::Config;

/// Tracing configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON output format
    pub json: bool,
}

impl From<&Config> for TracingConfig {
    fn from(config: &Config) -> Self {
        Self {
            level: config.log_level.to_lowercase(),
            json: config.log_json,
        }
    }
}

/// Initialize tracing from `config`, writing to stderr.
///
/// Logs go to stderr so the CLI can print results on stdout.
///
/// # Panics
///
/// Panics if a tracing subscriber has already been initialized in this process.
pub fn init_tracing(config: &TracingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        Registry::default().with(env_filter).with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

        Registry::default().with(env_filter).with(fmt_layer).init();
    }

    tracing::debug!(level = %config.level, json = config.json, "Tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_config_from_config() {
        let config = Config {
            log_level: "DEBUG".to_string(),
            log_json: true,
            ..Config::default()
        };

        let tracing = TracingConfig::from(&config);
        assert_eq!(
            tracing,
            TracingConfig {
                level: "debug".to_string(),
                json: true,
            }
        );
    }
}
