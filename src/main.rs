mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use cli::Commands;
use commands::{run_schema, run_validate};

fn main() -> ExitCode {
    let args = cli::parse();

    let filter = match args.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Validate {
            references,
            events,
            threshold,
            time_threshold_ms,
            event_marker,
            format,
            output,
        } => run_validate(
            args.config,
            args.verbose > 0,
            references,
            events,
            threshold,
            time_threshold_ms,
            event_marker,
            format,
            output,
        ),
        Commands::Schema {
            references,
            format,
            output,
        } => run_schema(args.config, references, format, output),
    }
}
