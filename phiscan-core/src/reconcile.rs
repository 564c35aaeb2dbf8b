// phiscan-core/src/reconcile.rs
//! The reconciliation engine.
//!
//! Runs the structured pattern detector and the optional statistical
//! recognizer over the same text, filters the recognizer's candidates, and
//! merges both streams into one grouped report per document.
//!
//! Structured matches are always trusted (score 1.0). Recognizer candidates
//! survive only when their label is a PHI label, they are longer than two
//! characters, they clear the confidence threshold, and the per-label
//! validator accepts them.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::{debug, warn};
use uuid::Uuid;

use crate::config::DetectionConfig;
use crate::engine::{EntityRecognizer, RecognizerHandle};
use crate::engines::regex_engine::StructuredDetector;
use crate::entity::{log_rejected_candidate_debug, Candidate, Entity, PhiLabel};
use crate::errors::PhiscanError;
use crate::report::{input_hash, DocumentReport, GroupedReport, RecognizerStatus, ReportEntry, StructuredResults};
use crate::validators;

/// Minimum trimmed length, in characters, for a recognizer candidate.
/// Shorter spans are almost always OCR noise.
pub const MIN_CANDIDATE_CHARS: usize = 3;

const MODULE: &str = "[phiscan_core::PhiEngine]";

/// The recognizer's output for one text, together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub candidates: Vec<Candidate>,
    pub status: RecognizerStatus,
}

impl Recognition {
    /// No candidates, with the reason they are missing.
    pub fn degraded(status: RecognizerStatus) -> Self {
        Self { candidates: Vec::new(), status }
    }
}

/// Combines structured detection with recognizer output into grouped reports.
///
/// A `PhiEngine` holds no per-document state; one instance can serve many
/// threads at once.
#[derive(Clone)]
pub struct PhiEngine {
    detector: StructuredDetector,
    recognizer: RecognizerHandle,
    threshold: f64,
    run_id: String,
}

impl std::fmt::Debug for PhiEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhiEngine")
            .field("detector", &self.detector)
            .field("recognizer", &self.recognizer.as_ref().map(|r| r.name().to_string()))
            .field("threshold", &self.threshold)
            .field("run_id", &self.run_id)
            .finish()
    }
}

impl PhiEngine {
    /// Builds an engine from a detection config and an optional recognizer.
    ///
    /// The threshold is taken from `config.engine.threshold` (default 0.9).
    pub fn new(config: &DetectionConfig, recognizer: RecognizerHandle) -> Result<Self> {
        let threshold = check_threshold(config.threshold())?;
        let detector = StructuredDetector::new(config)?;

        match &recognizer {
            Some(r) => debug!("PhiEngine using recognizer '{}' at threshold {}.", r.name(), threshold),
            None => warn!("No statistical recognizer loaded; only structured patterns will be detected."),
        }

        Ok(Self {
            detector,
            recognizer,
            threshold,
            run_id: Uuid::new_v4().to_string(),
        })
    }

    /// Replaces the candidate threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, PhiscanError> {
        self.threshold = check_threshold(threshold)?;
        Ok(self)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Identifier shared by every report this engine produces.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn recognizer(&self) -> Option<&Arc<dyn EntityRecognizer>> {
        self.recognizer.as_ref()
    }

    pub fn detector(&self) -> &StructuredDetector {
        &self.detector
    }

    /// Structured pattern matches, grouped by label in rule order.
    pub fn detect_structured(&self, text: &str) -> StructuredResults {
        self.detector.detect(text)
    }

    /// Runs the recognizer, if any.
    ///
    /// Never fails: an absent recognizer, an error, or a panic inside the
    /// recognizer all yield an empty candidate list with a matching status.
    pub fn recognize(&self, text: &str) -> Recognition {
        let Some(recognizer) = &self.recognizer else {
            return Recognition::degraded(RecognizerStatus::Unavailable);
        };

        match panic::catch_unwind(AssertUnwindSafe(|| recognizer.detect(text))) {
            Ok(Ok(candidates)) => Recognition { candidates, status: RecognizerStatus::Available },
            Ok(Err(e)) => {
                warn!("Recognizer '{}' failed; falling back to structured patterns: {}", recognizer.name(), e);
                Recognition::degraded(RecognizerStatus::Failed)
            }
            Err(_) => {
                warn!("Recognizer '{}' panicked; falling back to structured patterns.", recognizer.name());
                Recognition::degraded(RecognizerStatus::Failed)
            }
        }
    }

    /// Filters candidates at the engine threshold.
    pub fn filter_candidates(&self, candidates: &[Candidate]) -> Vec<Entity> {
        filter_candidates(candidates, self.threshold)
    }

    /// Merges structured matches and validated candidates into a grouped report.
    ///
    /// Structured matches come first, then candidates. Within a label each text
    /// appears once, so a structured match shadows a candidate with the same text.
    pub fn merge(&self, structured: &StructuredResults, validated: &[Entity]) -> GroupedReport {
        merge(structured, validated)
    }

    /// Full pipeline at the engine threshold.
    pub fn reconcile(&self, text: &str) -> GroupedReport {
        let structured = self.detect_structured(text);
        let recognition = self.recognize(text);
        let validated = filter_candidates(&recognition.candidates, self.threshold);
        merge(&structured, &validated)
    }

    /// Full pipeline at an explicit threshold, which must lie in [0.0, 1.0].
    pub fn reconcile_with_threshold(&self, text: &str, threshold: f64) -> Result<GroupedReport, PhiscanError> {
        let threshold = check_threshold(threshold)?;
        let structured = self.detect_structured(text);
        let recognition = self.recognize(text);
        let validated = filter_candidates(&recognition.candidates, threshold);
        Ok(merge(&structured, &validated))
    }

    /// Full pipeline, returning the complete per-document record.
    pub fn analyze(&self, text: &str) -> DocumentReport {
        let structured = self.detect_structured(text);
        let recognition = self.recognize(text);
        self.assemble(text, structured, recognition)
    }

    /// Builds a document report from already computed detector outputs.
    ///
    /// Callers that run the recognizer themselves (for example under a
    /// deadline) use this to finish the pipeline.
    pub fn assemble(&self, text: &str, structured: StructuredResults, recognition: Recognition) -> DocumentReport {
        let ner_entities = self.filter_candidates(&recognition.candidates);
        let grouped_entities = merge(&structured, &ner_entities);
        debug!(
            "{} Reconciled {} structured match(es) and {} validated candidate(s) into {} label(s).",
            MODULE,
            structured.total(),
            ner_entities.len(),
            grouped_entities.len()
        );

        DocumentReport {
            binary_phi: grouped_entities.binary_phi(),
            grouped_entities,
            regex_violations: structured,
            ner_entities,
            recognizer: recognition.status,
            input_sha256: input_hash(text),
            run_id: self.run_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

fn check_threshold(threshold: f64) -> Result<f64, PhiscanError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(PhiscanError::InvalidThreshold(threshold))
    }
}

/// Keeps the candidates that are plausible PHI, in their original order.
///
/// Texts are trimmed; the first occurrence of each `(text, label)` pair wins.
pub fn filter_candidates(candidates: &[Candidate], threshold: f64) -> Vec<Entity> {
    let mut seen: HashSet<(String, PhiLabel)> = HashSet::new();
    let mut kept = Vec::new();

    for candidate in candidates {
        let Ok(label) = candidate.label.parse::<PhiLabel>() else {
            log_rejected_candidate_debug(MODULE, &candidate.label, &candidate.text, "label outside the PHI set");
            continue;
        };
        let text = candidate.text.trim();
        if text.chars().count() < MIN_CANDIDATE_CHARS {
            log_rejected_candidate_debug(MODULE, label.as_str(), text, "too short");
            continue;
        }
        if !(0.0..=1.0).contains(&candidate.score) {
            log_rejected_candidate_debug(MODULE, label.as_str(), text, "score outside [0, 1]");
            continue;
        }
        if threshold.is_nan() || candidate.score < threshold {
            log_rejected_candidate_debug(MODULE, label.as_str(), text, "below threshold");
            continue;
        }
        if !validators::is_valid(label, text) {
            log_rejected_candidate_debug(MODULE, label.as_str(), text, "failed validation");
            continue;
        }
        if seen.insert((text.to_string(), label)) {
            kept.push(Entity { text: text.to_string(), label, score: candidate.score });
        }
    }

    kept
}

/// Groups structured matches then validated candidates by label.
pub fn merge(structured: &StructuredResults, validated: &[Entity]) -> GroupedReport {
    let mut grouped = GroupedReport::new();
    let entities = structured
        .iter()
        .flat_map(|(_, entities)| entities.iter())
        .chain(validated.iter());

    for entity in entities {
        if grouped.contains_text(entity.label, &entity.text) {
            continue;
        }
        grouped.entry(entity.label).push(ReportEntry {
            text: entity.text.clone(),
            score: entity.score,
        });
    }

    grouped
}
