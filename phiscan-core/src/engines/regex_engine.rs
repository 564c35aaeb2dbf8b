// phiscan-core/src/engines/regex_engine.rs
//! The structured pattern detector. Applies the compiled rules in order and
//! groups every match under its rule's label with a score of 1.0.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;
use anyhow::{Context, Result};
use log::debug;

use crate::config::{DetectionConfig, OverlapPolicy};
use crate::entity::{log_captured_match_debug, Entity};
use crate::patterns::compiler::{get_or_compile_rules, CompiledPatterns};
use crate::report::StructuredResults;

#[derive(Debug, Clone)]
pub struct StructuredDetector {
    compiled_patterns: Arc<CompiledPatterns>,
    overlap_policy: OverlapPolicy,
}

impl StructuredDetector {
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        let compiled_patterns = get_or_compile_rules(config)
            .context("Failed to compile pattern rules for StructuredDetector")?;

        Ok(Self {
            compiled_patterns,
            overlap_policy: config.overlap_policy(),
        })
    }

    /// Finds every match of every rule in `text`.
    ///
    /// Labels appear in rule order and only when they have at least one match.
    /// Under [`OverlapPolicy::Exclusive`] a match overlapping a span already
    /// reported by an earlier rule is dropped.
    pub fn detect(&self, text: &str) -> StructuredResults {
        let mut results = StructuredResults::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for rule in &self.compiled_patterns.rules {
            let mut rule_spans = Vec::new();
            for m in rule.regex.find_iter(text) {
                if self.overlap_policy == OverlapPolicy::Exclusive
                    && claimed.iter().any(|&(s, e)| m.start() < e && s < m.end())
                {
                    debug!("Rule '{}' match at {}..{} overlaps an earlier rule; skipped.", rule.name, m.start(), m.end());
                    continue;
                }
                log_captured_match_debug("[phiscan_core::StructuredDetector]", rule.label.as_str(), m.as_str());
                results.entry(rule.label).push(Entity::structured(m.as_str(), rule.label));
                rule_spans.push((m.start(), m.end()));
            }
            claimed.extend(rule_spans);
        }

        results.prune_empty();
        debug!("Structured detection found {} match(es) across {} label(s).", results.total(), results.len());
        results
    }

    pub fn compiled_patterns(&self) -> &CompiledPatterns {
        &self.compiled_patterns
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineSettings, PatternRule};
    use crate::entity::PhiLabel;

    fn default_detector() -> StructuredDetector {
        StructuredDetector::new(&DetectionConfig::load_default_rules().unwrap()).unwrap()
    }

    #[test]
    fn test_default_rules_find_each_label() {
        let text = "DOB 01/02/1990, SSN 123-45-6789, call 555-123-4567 or a.b@x.org";
        let results = default_detector().detect(text);

        assert_eq!(results.get(PhiLabel::Date).unwrap()[0].text, "01/02/1990");
        assert_eq!(results.get(PhiLabel::Ssn).unwrap()[0].text, "123-45-6789");
        assert_eq!(results.get(PhiLabel::Phone).unwrap()[0].text, "555-123-4567");
        assert_eq!(results.get(PhiLabel::Email).unwrap()[0].text, "a.b@x.org");
        assert!(results.iter().all(|(_, v)| v.iter().all(|e| e.score == 1.0)));
    }

    #[test]
    fn test_labels_follow_rule_order() {
        let text = "a.b@x.org then 123-45-6789 then 01/02/1990";
        let labels: Vec<_> = default_detector().detect(text).labels().collect();
        assert_eq!(labels, vec![PhiLabel::Date, PhiLabel::Ssn, PhiLabel::Email]);
    }

    #[test]
    fn test_no_matches_yields_empty_results() {
        assert!(default_detector().detect("").is_empty());
        assert!(default_detector().detect("nothing sensitive here").is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let results = default_detector().detect("123-45-6789 and again 123-45-6789");
        assert_eq!(results.get(PhiLabel::Ssn).unwrap().len(), 2);
    }

    #[test]
    fn test_exclusive_policy_drops_later_overlaps() {
        let rules = vec![
            PatternRule { name: "ssn".into(), label: "SSN".into(), pattern: Some(r"\b\d{3}-\d{2}-\d{4}\b".into()), ..Default::default() },
            PatternRule { name: "digits".into(), label: "PHONE".into(), pattern: Some(r"\d{2}-\d{4}".into()), ..Default::default() },
        ];
        let allow = DetectionConfig { rules: rules.clone(), engine: EngineSettings::default() };
        let exclusive = DetectionConfig {
            rules,
            engine: EngineSettings { threshold: None, overlap_policy: Some(OverlapPolicy::Exclusive) },
        };
        let text = "123-45-6789 and 77-1234";

        let allowed = StructuredDetector::new(&allow).unwrap().detect(text);
        assert_eq!(allowed.get(PhiLabel::Phone).unwrap().len(), 2);

        let exclusive = StructuredDetector::new(&exclusive).unwrap().detect(text);
        let phones = exclusive.get(PhiLabel::Phone).unwrap();
        assert_eq!(phones.len(), 1);
        assert_eq!(phones[0].text, "77-1234");
    }
}
