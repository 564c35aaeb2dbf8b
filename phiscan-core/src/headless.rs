// phiscan-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot PHI detection on a string, without
//! setting up engines, recognizers or sinks by hand.

use std::sync::Arc;

use anyhow::Result;
use crate::config::DetectionConfig;
use crate::engine::{EntityRecognizer, RecognizerHandle};
use crate::engines::lexicon_engine::LexiconRecognizer;
use crate::reconcile::PhiEngine;
use crate::report::{DocumentReport, GroupedReport};

/// Which recognizer to pair with the structured patterns in headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessRecognizer {
    /// Structured patterns only.
    None,
    /// The built-in lexicon recognizer.
    Lexicon,
}

fn build_engine(config: &DetectionConfig, recognizer: HeadlessRecognizer) -> Result<PhiEngine> {
    let handle: RecognizerHandle = match recognizer {
        HeadlessRecognizer::None => None,
        HeadlessRecognizer::Lexicon => {
            Some(Arc::new(LexiconRecognizer::with_default_lexicon()?) as Arc<dyn EntityRecognizer>)
        }
    };
    PhiEngine::new(config, handle)
}

/// Detects PHI in `text` and returns the grouped report.
///
/// # Arguments
///
/// * `config` - The merged DetectionConfig (defaults + optional user overrides).
/// * `text` - The document text.
/// * `recognizer` - Which recognizer to run alongside the structured patterns.
pub fn headless_reconcile(config: &DetectionConfig, text: &str, recognizer: HeadlessRecognizer) -> Result<GroupedReport> {
    Ok(build_engine(config, recognizer)?.reconcile(text))
}

/// Like [`headless_reconcile`], but returns the complete document report.
pub fn headless_analyze(config: &DetectionConfig, text: &str, recognizer: HeadlessRecognizer) -> Result<DocumentReport> {
    Ok(build_engine(config, recognizer)?.analyze(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PhiLabel;

    #[test]
    fn test_headless_patterns_only() -> Result<()> {
        let config = DetectionConfig::load_default_rules()?;
        let report = headless_reconcile(&config, "Reach me at test@example.com.", HeadlessRecognizer::None)?;

        assert!(report.binary_phi());
        assert_eq!(report.get(PhiLabel::Email).unwrap()[0].text, "test@example.com");
        Ok(())
    }

    #[test]
    fn test_headless_with_lexicon() -> Result<()> {
        let config = DetectionConfig::load_default_rules()?;
        let report = headless_analyze(&config, "Patient Dr. Alan Green was seen today.", HeadlessRecognizer::Lexicon)?;

        assert!(report.binary_phi);
        assert_eq!(report.grouped_entities.get(PhiLabel::Person).unwrap()[0].text, "Dr. Alan Green");
        Ok(())
    }
}
