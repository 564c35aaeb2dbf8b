//! `phiscan scan`: analyse one document and print its report.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};

use phiscan_core::{JsonlSink, PhiEngine, ReportSink, ViolationRecord};

use crate::cli::ScanCommand;
use crate::commands::build_engine;
use crate::ui::output_format;
use crate::ui::report_view;
use crate::ui::theme::ThemeMap;
use crate::utils::cleanup::clean_text;
use crate::utils::paths::document_name;

/// Name used for stdin input in logs and reports.
pub const STDIN_DOCUMENT: &str = "<stdin>";

/// Reads the document text from the input file or stdin.
fn read_input(cmd: &ScanCommand) -> Result<(String, String)> {
    match &cmd.input_file {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display()))?;
            Ok((document_name(path), text))
        }
        None => {
            info!("Reading input from stdin...");
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("Failed to read from stdin")?;
            Ok((STDIN_DOCUMENT.to_string(), text))
        }
    }
}

/// Analyses a single document with an already built engine.
pub fn run_scan_with_engine(engine: &PhiEngine, cmd: &ScanCommand, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let (document, raw_text) = read_input(cmd)?;
    let text = if cmd.raw { raw_text } else { clean_text(&raw_text) };
    debug!("Analysing '{}' ({} bytes after cleanup).", document, text.len());

    let report = engine.analyze(&text);

    if let Some(log_path) = &cmd.log {
        let sink = JsonlSink::new(log_path)?;
        sink.append(&document, &report)?;
        if !quiet {
            let _ = output_format::print_info_message(
                &mut io::stderr(),
                &format!("Report appended to {}", log_path.display()),
                theme,
                io::stderr().is_terminal(),
            );
        }
    }

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.json {
        let json = serde_json::to_string_pretty(&ViolationRecord::new(&document, &report))
            .context("Failed to serialize report")?;
        writeln!(writer, "{}", json)?;
    } else {
        let supports_color = stdout.is_terminal();
        report_view::print_document_report(&mut writer, &document, &report, theme, supports_color)?;
    }

    info!("Scan of '{}' completed; binary_phi={}.", document, report.binary_phi);
    Ok(())
}

/// Entry point for `phiscan scan`.
pub fn run_scan(cmd: &ScanCommand, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let engine = build_engine(&cmd.engine)?;
    run_scan_with_engine(&engine, cmd, theme, quiet)
}
