//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use monthgrid_core::{OutputFormat, TracingOutputFormat};

/// monthgrid - Lay out a calendar month with multi-day lanes
#[derive(Debug, Parser)]
#[command(name = "monthgrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MONTHGRID_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Log filter directive (e.g. `monthgrid_core=trace`), overrides RUST_LOG
    #[arg(long, env = "MONTHGRID_LOG", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log line formats selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => TracingOutputFormat::Pretty,
            LogFormat::Compact => TracingOutputFormat::Compact,
            LogFormat::Json => TracingOutputFormat::Json,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute and print the layout of a month
    Layout(LayoutArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options of the layout command.
#[derive(Debug, Default, Args)]
pub struct LayoutArgs {
    /// Month to lay out (YYYY-MM, prev or next), defaults to the current month
    #[arg(long, short)]
    pub month: Option<String>,

    /// Saved events.list response, overrides calendar.feed_path
    #[arg(long, short, env = "MONTHGRID_FEED")]
    pub feed: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Maximum title length (truncated with ellipsis)
    #[arg(long)]
    pub max_title_length: Option<usize>,

    /// Cap on generated dates per recurring event
    #[arg(long)]
    pub max_instances: Option<usize>,

    /// IANA timezone to show events in instead of the calendar's own
    #[arg(long)]
    pub timezone: Option<String>,

    /// Hide the warnings collected during the pass
    #[arg(long)]
    pub no_warnings: bool,
}

impl LayoutArgs {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_layout_flags() {
        let cli = Cli::parse_from([
            "monthgrid",
            "--debug",
            "layout",
            "--month",
            "2024-03",
            "--feed",
            "feed.json",
            "--json",
            "--max-title-length",
            "10",
        ]);
        assert!(cli.debug);
        let Some(Command::Layout(args)) = cli.command else {
            panic!("expected layout command");
        };
        assert_eq!(args.month.as_deref(), Some("2024-03"));
        assert_eq!(args.feed, Some(PathBuf::from("feed.json")));
        assert_eq!(args.output_format(), OutputFormat::Json);
        assert_eq!(args.max_title_length, Some(10));
        assert!(!args.no_warnings);
    }

    #[test]
    fn parses_config_action() {
        let cli = Cli::parse_from([
            "monthgrid",
            "config",
            "path",
            "--log-format",
            "json",
            "--log-filter",
            "monthgrid_core=trace",
        ]);
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Path
            })
        ));
        assert_eq!(
            TracingOutputFormat::from(cli.log_format),
            TracingOutputFormat::Json
        );
        assert_eq!(cli.log_filter.as_deref(), Some("monthgrid_core=trace"));
    }
}
