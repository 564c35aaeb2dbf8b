//! Console colour theme.
//!
//! Users can recolour the parts of phiscan's console output through a small
//! YAML file mapping theme entries to 16-colour ANSI names:
//!
//! ```yaml
//! phi_found:
//!   fg: magenta
//! warn:
//!   fg: brightyellow
//! ```
//!
//! Entries missing from the file keep their default colour; an unknown colour
//! name is a load error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::Deserialize;

pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// The parts of the console output that can be recoloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    Success,
    Info,
    Warn,
    Error,
    /// Per-document verdict when PHI was found.
    PhiFound,
    /// Per-document verdict when no PHI was found.
    PhiClear,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 6] = [
        ThemeEntry::Success,
        ThemeEntry::Info,
        ThemeEntry::Warn,
        ThemeEntry::Error,
        ThemeEntry::PhiFound,
        ThemeEntry::PhiClear,
    ];

    fn default_color(self) -> AnsiColors {
        match self {
            ThemeEntry::Success | ThemeEntry::PhiClear => AnsiColors::Green,
            ThemeEntry::Info => AnsiColors::Cyan,
            ThemeEntry::Warn => AnsiColors::Yellow,
            ThemeEntry::Error => AnsiColors::Red,
            ThemeEntry::PhiFound => AnsiColors::BrightRed,
        }
    }
}

const COLOR_NAMES: [(&str, AnsiColors); 16] = [
    ("black", AnsiColors::Black),
    ("red", AnsiColors::Red),
    ("green", AnsiColors::Green),
    ("yellow", AnsiColors::Yellow),
    ("blue", AnsiColors::Blue),
    ("magenta", AnsiColors::Magenta),
    ("cyan", AnsiColors::Cyan),
    ("white", AnsiColors::White),
    ("brightblack", AnsiColors::BrightBlack),
    ("brightred", AnsiColors::BrightRed),
    ("brightgreen", AnsiColors::BrightGreen),
    ("brightyellow", AnsiColors::BrightYellow),
    ("brightblue", AnsiColors::BrightBlue),
    ("brightmagenta", AnsiColors::BrightMagenta),
    ("brightcyan", AnsiColors::BrightCyan),
    ("brightwhite", AnsiColors::BrightWhite),
];

/// A validated ANSI colour name from a theme file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ThemeColor(AnsiColors);

impl ThemeColor {
    pub fn ansi(self) -> AnsiColors {
        self.0
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        let lower = name.to_ascii_lowercase();
        COLOR_NAMES
            .iter()
            .find(|(known, _)| *known == lower)
            .map(|(_, color)| ThemeColor(*color))
            .ok_or_else(|| {
                let known: Vec<&str> = COLOR_NAMES.iter().map(|(n, _)| *n).collect();
                format!("unknown theme colour '{}'; expected one of: {}", name, known.join(", "))
            })
    }
}

/// Style for one theme entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

impl ThemeStyle {
    /// Loads a theme file and fills entries it omits from the default theme.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let custom: Option<ThemeMap> = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

        let mut theme = Self::default_theme_map();
        theme.extend(custom.unwrap_or_default());
        Ok(theme)
    }

    pub fn default_theme_map() -> ThemeMap {
        ThemeEntry::ALL
            .iter()
            .map(|entry| (*entry, ThemeStyle { fg: Some(ThemeColor(entry.default_color())) }))
            .collect()
    }
}

/// Loads the theme at `theme_path`, or the default theme.
pub fn build_theme_map(theme_path: Option<&PathBuf>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

/// The colour for `entry`; white when the theme leaves it unset.
pub fn color_for(theme: &ThemeMap, entry: ThemeEntry) -> AnsiColors {
    theme
        .get(&entry)
        .and_then(|style| style.fg)
        .map(ThemeColor::ansi)
        .unwrap_or(AnsiColors::White)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn colour_names_are_case_insensitive() {
        assert_eq!(ThemeColor::try_from("BrightGreen".to_string()).unwrap().ansi(), AnsiColors::BrightGreen);
        assert!(ThemeColor::try_from("teal".to_string()).is_err());
    }

    #[test]
    fn default_theme_covers_every_entry() {
        let theme = ThemeStyle::default_theme_map();
        assert_eq!(theme.len(), ThemeEntry::ALL.len());
        assert_eq!(color_for(&theme, ThemeEntry::Error), AnsiColors::Red);
    }

    #[test]
    fn partial_theme_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "phi_found:\n  fg: magenta").unwrap();
        let theme = ThemeStyle::load_from_file(file.path()).unwrap();
        assert_eq!(color_for(&theme, ThemeEntry::PhiFound), AnsiColors::Magenta);
        assert_eq!(color_for(&theme, ThemeEntry::Warn), AnsiColors::Yellow);
    }

    #[test]
    fn unknown_colour_in_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "warn:\n  fg: teal").unwrap();
        let err = ThemeStyle::load_from_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("teal"));
    }

    #[test]
    fn unset_colour_falls_back_to_white() {
        let mut theme = ThemeStyle::default_theme_map();
        theme.insert(ThemeEntry::Info, ThemeStyle::default());
        assert_eq!(color_for(&theme, ThemeEntry::Info), AnsiColors::White);
    }
}
