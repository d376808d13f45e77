use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dlv")]
#[command(
    version,
    about = "DataLayer Validator - Validate captured analytics events against reference definitions",
    long_about = "DataLayer Validator (DLV)\n\nModes:\n- validate: score a finalized capture of datalayer events against the reference definitions and report per-event validity, reference coverage, and unique counts.\n- schema: build and emit the validation schema from the reference definitions alone.\n\nThe capture file is an ordered JSON array of event records as delivered by a browser capture session (live, fixture, or replay); records may carry a _captureTimestamp in milliseconds.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        short = 'v',
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for thresholds and the event marker; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a captured event sequence against the reference definitions
    Validate {
        #[arg(long, help = "Path to the reference definitions JSON array")]
        references: PathBuf,

        #[arg(
            long,
            help = "Path to the captured events JSON array (finalized browser capture)"
        )]
        events: PathBuf,

        #[arg(
            long,
            help = "Minimum score for a captured event to count as an instance of a reference (default 0.7)"
        )]
        threshold: Option<f64>,

        #[arg(
            long,
            value_name = "MS",
            help = "Events closer together than this get a rapid-fire warning (default 500)"
        )]
        time_threshold_ms: Option<u64>,

        #[arg(
            long,
            help = "Marker value of relevant events; anything else is filtered out (default GAEvent)"
        )]
        event_marker: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
        format: OutputFormat,

        #[arg(long, help = "Write output to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Build and emit the validation schema from the reference definitions
    Schema {
        #[arg(long, help = "Path to the reference definitions JSON array")]
        references: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
        format: OutputFormat,

        #[arg(long, help = "Write output to a file instead of stdout")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
