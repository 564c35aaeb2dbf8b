// phiscan/src/cli.rs
//! This file defines the command-line interface (CLI) for the phiscan application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "phiscan",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Flag Protected Health Information in OCR'd clinical documents",
    long_about = "phiscan reads text extracted from scanned clinical documents and reports the Protected Health Information (PHI) it contains. Structured patterns (dates, SSNs, phone numbers, emails) are always trusted; names, addresses and gender terms proposed by the lexicon recognizer are kept only when they clear a confidence threshold and pass per-label validation.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG to DEBUG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `phiscan` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scans a single document (file or stdin) and prints its PHI report.
    #[command(about = "Scan one document from a file or stdin and print its PHI report.")]
    Scan(ScanCommand),

    /// Scans every `.txt` document in a directory and logs one record per document.
    #[command(about = "Scan every .txt document in a directory, logging one record per document.")]
    Batch(BatchCommand),

    /// Lists the active structured pattern rules.
    #[command(about = "List the active structured pattern rules.")]
    Rules(RulesCommand),
}

/// Options shared by every command that builds a detection engine.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Path to a custom pattern rule configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "PHISCAN_CONFIG", help = "Path to a custom pattern rule configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Explicitly enable only these rule names (comma-separated).
    #[arg(long = "enable", short = 'e', value_delimiter = ',', help = "Explicitly enable only these rule names (comma-separated).")]
    pub enable: Vec<String>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long = "disable", short = 'x', value_delimiter = ',', help = "Explicitly disable these rule names (comma-separated).")]
    pub disable: Vec<String>,

    /// Minimum recognizer confidence, overriding the configured threshold.
    #[arg(long = "threshold", value_name = "X", help = "Minimum recognizer confidence in [0, 1] (default: 0.9).")]
    pub threshold: Option<f64>,

    /// Path to a custom lexicon file (YAML) for the recognizer.
    #[arg(long = "lexicon", value_name = "FILE", env = "PHISCAN_LEXICON", conflicts_with = "no_recognizer", help = "Path to a custom recognizer lexicon (YAML).")]
    pub lexicon: Option<PathBuf>,

    /// Run structured patterns only.
    #[arg(long = "no-recognizer", help = "Disable the statistical recognizer; detect structured patterns only.")]
    pub no_recognizer: bool,
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Print the full document report as JSON to stdout.
    #[arg(long = "json", help = "Print the document report as JSON instead of a table.")]
    pub json: bool,

    /// Append the document report to this violations log.
    #[arg(long = "log", value_name = "FILE", help = "Append the document report to a JSON-lines violations log.")]
    pub log: Option<PathBuf>,

    /// Skip the header/blank-line cleanup applied to OCR text.
    #[arg(long = "raw", help = "Analyse the input verbatim, without OCR cleanup.")]
    pub raw: bool,
}

/// Arguments for the `batch` command.
#[derive(Parser, Debug)]
pub struct BatchCommand {
    /// Directory containing `.txt` documents.
    #[arg(value_name = "DIR", help = "Directory containing extracted .txt documents.")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Maximum number of documents analysed concurrently.
    #[arg(long = "jobs", short = 'j', value_name = "N", help = "Maximum number of documents analysed concurrently (default: available parallelism).")]
    pub jobs: Option<usize>,

    /// Per-document recognizer deadline in seconds.
    #[arg(long = "timeout-secs", value_name = "S", default_value_t = 30, help = "Per-document recognizer deadline in seconds.")]
    pub timeout_secs: u64,

    /// Violations log to append to.
    #[arg(long = "log", value_name = "FILE", env = "PHISCAN_LOG", help = "JSON-lines violations log (default: <data dir>/phiscan/violations.log).")]
    pub log: Option<PathBuf>,

    /// Skip the header/blank-line cleanup applied to OCR text.
    #[arg(long = "raw", help = "Analyse documents verbatim, without OCR cleanup.")]
    pub raw: bool,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesCommand {
    /// Path to a custom pattern rule configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "PHISCAN_CONFIG", help = "Path to a custom pattern rule configuration file (YAML).")]
    pub config: Option<PathBuf>,
}
