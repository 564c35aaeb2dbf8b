// phiscan-core/src/engines/lexicon_engine.rs
//! An `EntityRecognizer` backed by the `phiscan-lexicon` gazetteer engine.
//!
//! Proposes PERSON, ADDRESS and GENDER candidates from name lists, street
//! suffixes and context keywords. Scores are the lexicon engine's logistic
//! confidences; filtering happens later, in the reconciliation engine.
//! License: MIT OR APACHE 2.0

use std::path::Path;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::engine::EntityRecognizer;
use crate::entity::{log_captured_match_debug, Candidate};
use crate::errors::{PhiscanError, RecognizerError};

use phiscan_lexicon::{Gazetteer, Lexicon, LexiconEngine};

/// Word lists as they appear in a lexicon YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub given_names: Vec<String>,
    pub surnames: Vec<String>,
    pub titles: Vec<String>,
    pub street_suffixes: Vec<String>,
    pub gender_terms: Vec<String>,
    pub person_context: Vec<String>,
    pub address_context: Vec<String>,
    pub gender_context: Vec<String>,
}

impl LexiconConfig {
    /// Loads a lexicon from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading lexicon from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file {}", path.display()))?;
        serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse lexicon file {}", path.display()))
    }

    /// The lexicon embedded in the binary.
    pub fn load_default() -> Result<Self> {
        let default_yaml = include_str!("../../config/default_lexicon.yaml");
        serde_yml::from_str(default_yaml).context("Failed to parse default lexicon")
    }
}

impl From<LexiconConfig> for Lexicon {
    fn from(c: LexiconConfig) -> Self {
        Lexicon {
            given_names: c.given_names,
            surnames: c.surnames,
            titles: c.titles,
            street_suffixes: c.street_suffixes,
            gender_terms: c.gender_terms,
            person_context: c.person_context,
            address_context: c.address_context,
            gender_context: c.gender_context,
        }
    }
}

/// The in-process statistical recognizer.
#[derive(Debug)]
pub struct LexiconRecognizer {
    inner_engine: LexiconEngine,
}

impl LexiconRecognizer {
    pub const NAME: &'static str = "lexicon";

    /// Builds the recognizer from a lexicon.
    ///
    /// Fails with [`PhiscanError::RecognizerUnavailable`] when the lexicon
    /// cannot produce any match or its keyword automata cannot be built.
    pub fn new(lexicon: LexiconConfig) -> Result<Self, PhiscanError> {
        let gazetteer = Gazetteer::new(&Lexicon::from(lexicon))
            .map_err(|e| PhiscanError::RecognizerUnavailable(e.to_string()))?;
        debug!("Initialized LexiconRecognizer.");
        Ok(Self { inner_engine: LexiconEngine::new(gazetteer) })
    }

    /// Builds the recognizer from the embedded lexicon.
    pub fn with_default_lexicon() -> Result<Self, PhiscanError> {
        let lexicon = LexiconConfig::load_default()
            .map_err(|e| PhiscanError::RecognizerUnavailable(format!("{:#}", e)))?;
        Self::new(lexicon)
    }

    /// Builds the recognizer from a lexicon file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PhiscanError> {
        let lexicon = LexiconConfig::load_from_file(path)
            .map_err(|e| PhiscanError::RecognizerUnavailable(format!("{:#}", e)))?;
        Self::new(lexicon)
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, text: &str) -> Result<Vec<Candidate>, RecognizerError> {
        let candidates: Vec<Candidate> = self
            .inner_engine
            .scan(text)
            .into_iter()
            .map(|m| {
                let span = &text[m.start..m.end];
                log_captured_match_debug("[phiscan_core::LexiconRecognizer]", m.kind.label(), span);
                Candidate::new(span, m.kind.label(), m.confidence)
            })
            .collect();
        debug!("LexiconRecognizer proposed {} candidate(s).", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_loads() {
        let lexicon = LexiconConfig::load_default().unwrap();
        assert!(lexicon.titles.contains(&"dr".to_string()));
        assert!(!lexicon.given_names.is_empty());
    }

    #[test]
    fn test_empty_lexicon_is_unavailable() {
        let err = LexiconRecognizer::new(LexiconConfig::default()).unwrap_err();
        assert!(matches!(err, PhiscanError::RecognizerUnavailable(_)));
    }

    #[test]
    fn test_detect_proposes_labelled_candidates() {
        let recognizer = LexiconRecognizer::with_default_lexicon().unwrap();
        let candidates = recognizer.detect("Patient: Dr. Alan Green, Sex: female").unwrap();

        let person = candidates.iter().find(|c| c.label == "PERSON").unwrap();
        assert_eq!(person.text, "Dr. Alan Green");
        assert!(person.score > 0.9);
        assert!(candidates.iter().any(|c| c.label == "GENDER" && c.text == "female"));
    }

    #[test]
    fn test_lexicon_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.yaml");
        std::fs::write(&path, "surnames: [Okafor]\ntitles: [nurse]\n").unwrap();

        let recognizer = LexiconRecognizer::from_file(&path).unwrap();
        let candidates = recognizer.detect("seen by Nurse Okafor today").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Nurse Okafor");
    }
}
