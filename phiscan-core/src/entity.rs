// phiscan-core/src/entity.rs
//! Core data structures for detected PHI entities, plus the helpers used to
//! keep matched PHI out of debug logs.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use log::debug;
use lazy_static::lazy_static;

lazy_static! {
    /// A static boolean that is initialized once to determine if PHI is allowed in debug logs.
    static ref PHI_DEBUG_ALLOWED: bool = {
        std::env::var("PHISCAN_ALLOW_DEBUG_PHI")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// The fixed set of PHI categories the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhiLabel {
    Person,
    Date,
    Address,
    Phone,
    Email,
    Ssn,
    Gender,
}

impl PhiLabel {
    pub const ALL: [PhiLabel; 7] = [
        PhiLabel::Person,
        PhiLabel::Date,
        PhiLabel::Address,
        PhiLabel::Phone,
        PhiLabel::Email,
        PhiLabel::Ssn,
        PhiLabel::Gender,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhiLabel::Person => "PERSON",
            PhiLabel::Date => "DATE",
            PhiLabel::Address => "ADDRESS",
            PhiLabel::Phone => "PHONE",
            PhiLabel::Email => "EMAIL",
            PhiLabel::Ssn => "SSN",
            PhiLabel::Gender => "GENDER",
        }
    }
}

impl fmt::Display for PhiLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label string is not one of the [`PhiLabel`] names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown PHI label '{}'", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl FromStr for PhiLabel {
    type Err = UnknownLabel;

    /// Label names are matched exactly (upper-case), as recognizers emit them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhiLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// A detected PHI occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: PhiLabel,
    pub score: f64,
}

impl Entity {
    /// An entity from the structured pattern detector. These are always trusted.
    pub fn structured(text: impl Into<String>, label: PhiLabel) -> Self {
        Self { text: text.into(), label, score: 1.0 }
    }
}

/// An unvalidated span as returned by a statistical recognizer.
///
/// The label is kept as the recognizer's raw string; it only becomes a
/// [`PhiLabel`] once it survives filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub label: String,
    pub score: f64,
}

impl Candidate {
    pub fn new(text: impl Into<String>, label: impl Into<String>, score: f64) -> Self {
        Self { text: text.into(), label: label.into(), score }
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PHI_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_captured_match_debug(
    module_path: &str,
    label: &str,
    original_sensitive_content: &str,
) {
    debug!("{} Captured match (original): '{}' for label '{}'",
        module_path,
        get_loggable_content(original_sensitive_content),
        label
    );
}

pub fn log_rejected_candidate_debug(
    module_path: &str,
    label: &str,
    original_sensitive_content: &str,
    reason: &str,
) {
    debug!(
        "{} Rejected candidate '{}' for label '{}': {}",
        module_path,
        get_loggable_content(original_sensitive_content),
        label,
        reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }

    #[test]
    fn test_label_round_trips_through_str() {
        for label in PhiLabel::ALL {
            assert_eq!(label.as_str().parse::<PhiLabel>(), Ok(label));
        }
        assert!("ORG".parse::<PhiLabel>().is_err());
        assert!("person".parse::<PhiLabel>().is_err());
    }

    #[test]
    fn test_label_serializes_upper_case() {
        let e = Entity::structured("123-45-6789", PhiLabel::Ssn);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"text":"123-45-6789","label":"SSN","score":1.0}"#);
    }
}
