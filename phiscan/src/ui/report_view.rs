//! Human-readable rendering of PHI reports.

use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use owo_colors::OwoColorize;

use phiscan_core::{DocumentReport, GroupedReport, RecognizerStatus};

use crate::ui::theme::{color_for, ThemeEntry, ThemeMap};

/// Builds a `label | text | score` table, one row per grouped entry.
pub fn grouped_table(report: &GroupedReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Label").add_attribute(Attribute::Bold),
            Cell::new("Text").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
        ]);

    for (label, entries) in report.iter() {
        for entry in entries {
            table.add_row(vec![
                Cell::new(label.as_str()),
                Cell::new(&entry.text),
                Cell::new(format!("{:.2}", entry.score)).set_alignment(CellAlignment::Right),
            ]);
        }
    }
    table
}

fn recognizer_note(status: RecognizerStatus) -> Option<&'static str> {
    match status {
        RecognizerStatus::Available => None,
        RecognizerStatus::Unavailable => Some("structured patterns only (no recognizer loaded)"),
        RecognizerStatus::Failed => Some("recognizer failed; structured patterns only"),
        RecognizerStatus::TimedOut => Some("recognizer timed out; structured patterns only"),
    }
}

/// Prints the verdict line followed by the grouped table, if any.
pub fn print_document_report<W: Write>(
    writer: &mut W,
    document: &str,
    report: &DocumentReport,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{}", verdict_line(document, report, theme, supports_color))?;
    if let Some(note) = recognizer_note(report.recognizer) {
        writeln!(writer, "  note: {}", note)?;
    }
    if report.binary_phi {
        writeln!(writer, "{}", grouped_table(&report.grouped_entities))?;
    }
    Ok(())
}

/// One line per document: name, verdict and per-label counts.
pub fn verdict_line(document: &str, report: &DocumentReport, theme: &ThemeMap, supports_color: bool) -> String {
    let (verdict, entry) = if report.binary_phi {
        ("PHI FOUND", ThemeEntry::PhiFound)
    } else {
        ("no PHI", ThemeEntry::PhiClear)
    };
    let verdict = if supports_color {
        verdict.color(color_for(theme, entry)).to_string()
    } else {
        verdict.to_string()
    };

    let counts: Vec<String> = report
        .grouped_entities
        .iter()
        .map(|(label, entries)| format!("{}={}", label, entries.len()))
        .collect();

    if counts.is_empty() {
        format!("{}: {}", document, verdict)
    } else {
        format!("{}: {} ({})", document, verdict, counts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;
    use phiscan_core::{DetectionConfig, PhiEngine};

    fn report_for(text: &str) -> DocumentReport {
        let config = DetectionConfig::load_default_rules().unwrap();
        PhiEngine::new(&config, None).unwrap().analyze(text)
    }

    #[test]
    fn verdict_lists_label_counts() {
        let theme = ThemeStyle::default_theme_map();
        let report = report_for("SSN 123-45-6789 and 987-65-4321, DOB 01/02/1990");
        let line = verdict_line("a.txt", &report, &theme, false);
        assert_eq!(line, "a.txt: PHI FOUND (DATE=1, SSN=2)");
    }

    #[test]
    fn clean_document_prints_no_table() {
        let theme = ThemeStyle::default_theme_map();
        let report = report_for("nothing to see");
        let mut buf = Vec::new();
        print_document_report(&mut buf, "b.txt", &report, &theme, false).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("b.txt: no PHI\n"));
        assert!(out.contains("no recognizer loaded"));
        assert!(!out.contains("Label"));
    }

    #[test]
    fn table_has_one_row_per_entry() {
        let report = report_for("SSN 123-45-6789");
        let rendered = grouped_table(&report.grouped_entities).to_string();
        assert!(rendered.contains("SSN"));
        assert!(rendered.contains("123-45-6789"));
        assert!(rendered.contains("1.00"));
    }
}
