//! Console message formatting for phiscan.
//!
//! Status messages go to stderr so stdout stays machine-readable. Colour is
//! applied only when the caller says the stream supports it.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::ui::theme::{color_for, ThemeEntry, ThemeMap};

fn print_message<W: Write>(
    writer: &mut W,
    prefix: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{} {}", prefix.color(color_for(theme, entry)), msg)
    } else {
        writeln!(writer, "{} {}", prefix, msg)
    }
}

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "[info]", msg, ThemeEntry::Info, theme, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "[warn]", msg, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "[error]", msg, ThemeEntry::Error, theme, supports_color)
}

pub fn print_success_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "[ok]", msg, ThemeEntry::Success, theme, supports_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;

    #[test]
    fn plain_output_has_no_escape_codes() {
        let theme = ThemeStyle::default_theme_map();
        let mut buf = Vec::new();
        print_warn_message(&mut buf, "recognizer timed out", &theme, false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[warn] recognizer timed out\n");
    }

    #[test]
    fn colored_output_wraps_prefix() {
        let theme = ThemeStyle::default_theme_map();
        let mut buf = Vec::new();
        print_error_message(&mut buf, "boom", &theme, true).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("\u{1b}["));
        assert!(out.ends_with(" boom\n"));
    }
}
