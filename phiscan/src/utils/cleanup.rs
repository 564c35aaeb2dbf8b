//! Cleanup of OCR text before detection.
//!
//! Extracted page text is full of blank-line runs and running headers such as
//! `DISCHARGE SUMMARY`. Both are removed so that headers are not mistaken for
//! names and line structure does not depend on page layout.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RUNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n+").expect("constant pattern compiles")
});

// A line of 3 to 50 upper-case letters and spaces.
static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[A-Z ]{3,50}\n").expect("constant pattern compiles")
});

/// Collapses newline runs, drops all-caps header lines and trims the result.
pub fn clean_text(text: &str) -> String {
    let collapsed = BLANK_LINE_RUNS.replace_all(text, "\n");
    let without_headers = HEADER_LINE.replace_all(&collapsed, "");
    without_headers.trim().to_string()
}
