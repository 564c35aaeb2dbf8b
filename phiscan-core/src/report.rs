// phiscan-core/src/report.rs
//! Report types produced by the reconciliation engine.
//!
//! Every value here has a fixed schema, so the sink can serialize it without
//! inspecting types at runtime.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::entity::{Entity, PhiLabel};

/// A label-keyed map that remembers label insertion order.
///
/// Serializes as a JSON object whose keys appear in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap<V> {
    groups: Vec<(PhiLabel, Vec<V>)>,
}

impl<V> Default for LabelMap<V> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<V> LabelMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The values under `label`, creating an empty group at the end if absent.
    pub fn entry(&mut self, label: PhiLabel) -> &mut Vec<V> {
        let idx = match self.groups.iter().position(|(l, _)| *l == label) {
            Some(idx) => idx,
            None => {
                self.groups.push((label, Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx].1
    }

    pub fn get(&self, label: PhiLabel) -> Option<&[V]> {
        self.groups.iter().find(|(l, _)| *l == label).map(|(_, v)| v.as_slice())
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = PhiLabel> + '_ {
        self.groups.iter().map(|(l, _)| *l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhiLabel, &[V])> + '_ {
        self.groups.iter().map(|(l, v)| (*l, v.as_slice()))
    }

    /// Number of labels present.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of values across all labels.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, v)| v.len()).sum()
    }

    /// Drops labels whose group ended up empty.
    pub(crate) fn prune_empty(&mut self) {
        self.groups.retain(|(_, v)| !v.is_empty());
    }
}

impl<V: Serialize> Serialize for LabelMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (label, values) in &self.groups {
            map.serialize_entry(label.as_str(), values)?;
        }
        map.end()
    }
}

/// One `{text, score}` pair of the grouped report.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct ReportEntry {
    pub text: String,
    pub score: f64,
}

/// Output of the structured pattern detector: label to matches, all scored 1.0.
pub type StructuredResults = LabelMap<Entity>;

/// Final per-document output: label to deduplicated, scored matches.
pub type GroupedReport = LabelMap<ReportEntry>;

impl LabelMap<ReportEntry> {
    /// True when the document contains any PHI.
    pub fn binary_phi(&self) -> bool {
        !self.is_empty()
    }

    pub(crate) fn contains_text(&self, label: PhiLabel, text: &str) -> bool {
        self.get(label).map_or(false, |entries| entries.iter().any(|e| e.text == text))
    }
}

/// What happened to the statistical recognizer for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerStatus {
    /// The recognizer ran and its candidates were considered.
    Available,
    /// No recognizer was loaded for this run.
    Unavailable,
    /// The recognizer returned an error or panicked.
    Failed,
    /// The caller's deadline expired before the recognizer finished.
    TimedOut,
}

/// The full per-document record handed to a report sink.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DocumentReport {
    pub binary_phi: bool,
    pub grouped_entities: GroupedReport,
    /// Raw structured detector output, duplicates included.
    pub regex_violations: StructuredResults,
    /// Recognizer candidates that passed filtering and validation.
    pub ner_entities: Vec<Entity>,
    pub recognizer: RecognizerStatus,
    pub input_sha256: String,
    pub run_id: String,
    pub timestamp: String,
}

/// Hex SHA-256 of the analysed text, so records can be correlated without
/// storing the text itself.
pub fn input_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
