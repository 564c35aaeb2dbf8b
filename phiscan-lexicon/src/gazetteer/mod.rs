// phiscan-lexicon/src/gazetteer/mod.rs
//! Word lists the recognizer consults, normalised for case-insensitive lookup.

extern crate alloc;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::context::ContextScanner;

/// Raw word lists, as loaded from a lexicon file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    pub given_names: Vec<String>,
    pub surnames: Vec<String>,
    pub titles: Vec<String>,
    pub street_suffixes: Vec<String>,
    pub gender_terms: Vec<String>,
    /// Keywords that make a following name more likely ("patient", "physician").
    pub person_context: Vec<String>,
    /// Keywords that make a following street address more likely ("address", "lives").
    pub address_context: Vec<String>,
    /// Keywords that make a following gender term more likely ("sex", "gender").
    pub gender_context: Vec<String>,
}

/// Errors raised while building a [`Gazetteer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexiconError {
    /// The lexicon has no names and no street suffixes, so nothing can ever match.
    Empty,
    /// A context keyword list could not be compiled into an automaton.
    Automaton(String),
}

impl fmt::Display for LexiconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexiconError::Empty => write!(f, "lexicon contains no names and no street suffixes"),
            LexiconError::Automaton(e) => write!(f, "failed to build context automaton: {}", e),
        }
    }
}

impl core::error::Error for LexiconError {}

/// Normalised lookup tables plus the context scanners built from a [`Lexicon`].
#[derive(Debug)]
pub struct Gazetteer {
    given_names: BTreeSet<String>,
    surnames: BTreeSet<String>,
    titles: BTreeSet<String>,
    street_suffixes: BTreeSet<String>,
    gender_terms: BTreeSet<String>,
    pub(crate) person_context: ContextScanner,
    pub(crate) address_context: ContextScanner,
    pub(crate) gender_context: ContextScanner,
}

fn normalise(words: &[String]) -> BTreeSet<String> {
    words
        .iter()
        .map(|w| w.trim().trim_end_matches('.').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

impl Gazetteer {
    pub fn new(lexicon: &Lexicon) -> Result<Self, LexiconError> {
        let given_names = normalise(&lexicon.given_names);
        let surnames = normalise(&lexicon.surnames);
        let street_suffixes = normalise(&lexicon.street_suffixes);

        if given_names.is_empty() && surnames.is_empty() && street_suffixes.is_empty() {
            return Err(LexiconError::Empty);
        }

        Ok(Self {
            given_names,
            surnames,
            titles: normalise(&lexicon.titles),
            street_suffixes,
            gender_terms: normalise(&lexicon.gender_terms),
            person_context: ContextScanner::new(&lexicon.person_context)?,
            address_context: ContextScanner::new(&lexicon.address_context)?,
            gender_context: ContextScanner::new(&lexicon.gender_context)?,
        })
    }

    fn contains(set: &BTreeSet<String>, word: &str) -> bool {
        let key = word.trim_end_matches('.');
        if key.chars().all(|c| !c.is_uppercase()) {
            return set.contains(key);
        }
        set.contains(&key.to_lowercase())
    }

    pub fn is_title(&self, word: &str) -> bool {
        Self::contains(&self.titles, word)
    }

    pub fn is_known_name(&self, word: &str) -> bool {
        Self::contains(&self.given_names, word) || Self::contains(&self.surnames, word)
    }

    pub fn is_street_suffix(&self, word: &str) -> bool {
        Self::contains(&self.street_suffixes, word)
    }

    pub fn is_gender_term(&self, word: &str) -> bool {
        Self::contains(&self.gender_terms, word)
    }
}
