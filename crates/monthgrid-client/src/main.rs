//! monthgrid CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use monthgrid_client::cli::{Cli, Command, ConfigAction, LayoutArgs};
use monthgrid_client::commands;
use monthgrid_client::config::ClientConfig;
use monthgrid_client::error::ClientResult;
use monthgrid_core::{TracingConfig, init_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    let tracing = tracing
        .with_format(cli.log_format.into())
        .with_env_filter(cli.log_filter.clone());
    if let Err(e) = init_tracing(tracing) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    match cli.command {
        Some(Command::Layout(args)) => commands::layout::run(&args, &config),
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        // Default behavior: the current month
        None => commands::layout::run(&LayoutArgs::default(), &config),
    }
}
