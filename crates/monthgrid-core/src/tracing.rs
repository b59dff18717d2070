//! Log subscriber setup for the monthgrid binaries.
//!
//! The engine only emits events (`debug!` pass summaries, `warn!` for every
//! diagnostic). The CLI installs a subscriber once at startup:
//!
//! ```ignore
//! use monthgrid_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::cli().with_env_filter(Some("monthgrid_core=trace".into())))?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse log filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines, written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line human-readable format
    Pretty,
    /// Single-line format
    #[default]
    Compact,
    /// JSON format, one object per line
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level of the `monthgrid` crates when no filter is given
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Include file/line and module path
    pub include_location: bool,
    /// Filter directive; wins over `RUST_LOG` and `default_level`
    pub env_filter: Option<String>,
}

impl TracingConfig {
    /// Quiet CLI logging: warnings only, no source locations.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            env_filter: None,
        }
    }

    /// CLI logging for `--debug`: pass summaries with source locations.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::cli()
        }
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set an explicit filter directive, or clear it with `None`
    #[must_use]
    pub fn with_env_filter(mut self, filter: Option<String>) -> Self {
        self.env_filter = filter;
        self
    }

    /// Returns the filter used when neither `RUST_LOG` nor a custom
    /// directive is set.
    pub fn default_directive(&self) -> String {
        format!("monthgrid={}", self.default_level.as_str().to_ascii_lowercase())
    }

    /// Builds the env filter this config selects.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::EnvFilter`] for an invalid custom directive.
    pub fn filter(&self) -> Result<EnvFilter, TracingError> {
        match self.env_filter {
            Some(ref directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_location);

    match config.output_format {
        TracingOutputFormat::Pretty => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(layer.pretty());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        TracingOutputFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact().without_time());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        TracingOutputFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(layer.json());
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_presets() {
        let quiet = TracingConfig::cli();
        assert_eq!(quiet.default_level, Level::WARN);
        assert_eq!(quiet.output_format, TracingOutputFormat::Compact);
        assert!(!quiet.include_location);
        assert!(quiet.env_filter.is_none());

        let debug = TracingConfig::cli_debug();
        assert_eq!(debug.default_level, Level::DEBUG);
        assert!(debug.include_location);
        assert_eq!(debug.output_format, quiet.output_format);
    }

    #[test]
    fn default_directive_names_the_crates() {
        assert_eq!(TracingConfig::cli().default_directive(), "monthgrid=warn");
        assert_eq!(TracingConfig::cli_debug().default_directive(), "monthgrid=debug");
        assert_eq!(
            TracingConfig::cli().with_level(Level::TRACE).default_directive(),
            "monthgrid=trace"
        );
    }

    #[test]
    fn builder_methods() {
        let config = TracingConfig::cli()
            .with_format(TracingOutputFormat::Json)
            .with_env_filter(Some("monthgrid_core=trace".into()));

        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("monthgrid_core=trace"));
        assert!(config.filter().is_ok());
        assert!(config.with_env_filter(None).env_filter.is_none());
    }

    #[test]
    fn invalid_directive_is_rejected() {
        let config = TracingConfig::cli().with_env_filter(Some("monthgrid=[".into()));
        assert!(matches!(config.filter(), Err(TracingError::EnvFilter(_))));
    }
}
