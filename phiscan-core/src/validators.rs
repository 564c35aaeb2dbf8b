// File: phiscan-core/src/validators.rs
//! Rule-based validation for entities proposed by a statistical recognizer.
//!
//! Recognizers over-report on noisy OCR text: section headings become names,
//! SSNs become addresses. These checks reject candidates whose shape does not
//! fit their label. Structured pattern matches never pass through here.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashSet;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::entity::PhiLabel;

/// Longest plausible person name, in whitespace-separated tokens.
pub const MAX_PERSON_TOKENS: usize = 4;

static PERSON_TITLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(["mr", "ms", "mrs", "dr", "prof"]);
    set
});

// Medical and document boilerplate that recognizers tend to mislabel as names.
static PERSON_DENYLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend([
        "diagnosis", "treatment", "history", "introduction", "evaluation",
        "angiography", "medication", "rehabilitation", "adjustment",
        "compliance", "adherence", "symptoms", "copyright", "reports",
        "information", "purpose", "revealed", "advise", "birth", "leave",
    ]);
    set
});

static VALID_GENDERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(["male", "female", "other", "unknown", "m", "f"]);
    set
});

static NINE_DIGITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{9}$").expect("constant pattern compiles")
});

// Unicode decimal digits (category Nd); vulgar fractions and numerals do not count.
static ANY_DIGIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d").expect("constant pattern compiles")
});

static STREET_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"(Street|St\.|Avenue|Ave|Road|Rd|Blvd|Boulevard|Lane|Ln|Drive|Dr|Suite|Apt)")
        .case_insensitive(true)
        .build()
        .expect("constant pattern compiles")
});

/// Decides whether a recognizer candidate is plausible for its label.
///
/// Checks run in order and stop at the first rejection:
///
/// 1. every label: at least one token and at least two characters after trimming;
/// 2. `PERSON`: at most four tokens, a leading title accepts immediately, otherwise
///    a capitalized word is required and boilerplate words reject;
/// 3. `GENDER`: one of a fixed set of terms;
/// 4. `ADDRESS`: not nine bare digits, contains a digit and a street keyword.
///
/// # Returns
///
/// `true` if no check rejected the text.
pub fn is_valid(label: PhiLabel, text: &str) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let clean_text = text.trim();

    if tokens.is_empty() || clean_text.chars().count() < 2 {
        return false;
    }

    match label {
        PhiLabel::Person => is_valid_person(&tokens),
        PhiLabel::Gender => VALID_GENDERS.contains(clean_text.to_lowercase().as_str()),
        PhiLabel::Address => is_valid_address(clean_text),
        _ => true,
    }
}

/// String-label entry point; labels outside [`PhiLabel`] are never valid.
pub fn is_valid_label_str(label: &str, text: &str) -> bool {
    match label.parse::<PhiLabel>() {
        Ok(label) => is_valid(label, text),
        Err(_) => false,
    }
}

fn is_valid_person(tokens: &[&str]) -> bool {
    if tokens.len() > MAX_PERSON_TOKENS {
        return false;
    }

    let first = tokens[0].to_lowercase();
    if PERSON_TITLES.contains(first.trim_end_matches('.')) {
        return true;
    }

    let has_capitalized_word = tokens.iter()
        .filter(|t| t.chars().all(char::is_alphabetic))
        .any(|t| t.chars().next().map_or(false, char::is_uppercase));
    if !has_capitalized_word {
        return false;
    }

    !tokens.iter().any(|t| PERSON_DENYLIST.contains(t.to_lowercase().as_str()))
}

fn is_valid_address(clean_text: &str) -> bool {
    if NINE_DIGITS.is_match(clean_text) {
        return false;
    }
    if !ANY_DIGIT.is_match(clean_text) {
        return false;
    }
    STREET_KEYWORD.is_match(clean_text)
}
