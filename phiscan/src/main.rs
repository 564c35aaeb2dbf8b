// phiscan/src/main.rs
//! phiscan entry point.

use is_terminal::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use phiscan::cli::{Cli, Commands};
use phiscan::commands::{batch, rules, scan};
use phiscan::logger;
use phiscan::ui::output_format;
use phiscan::ui::theme::{build_theme_map, ThemeMap};

async fn dispatch(cli: &Cli, theme: &ThemeMap) -> Result<ExitCode> {
    match &cli.command {
        Commands::Scan(cmd) => {
            scan::run_scan(cmd, theme, cli.quiet)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Batch(cmd) => {
            let summary = batch::run_batch(cmd, theme, cli.quiet).await?;
            if summary.failed > 0 {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Commands::Rules(cmd) => {
            rules::run_rules(cmd)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug));
    debug!("phiscan {} starting.", env!("CARGO_PKG_VERSION"));

    let theme = match build_theme_map(cli.theme.as_ref()).context("Failed to load theme") {
        Ok(theme) => theme,
        Err(e) => {
            eprintln!("[error] {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&cli, &theme).await {
        Ok(code) => code,
        Err(e) => {
            let mut stderr = std::io::stderr();
            let supports_color = stderr.is_terminal();
            let _ = output_format::print_error_message(&mut stderr, &format!("{:#}", e), &theme, supports_color);
            ExitCode::FAILURE
        }
    }
}
