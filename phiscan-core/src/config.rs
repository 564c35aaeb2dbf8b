//! Configuration management for `phiscan-core`.
//!
//! This module defines the core data structures for structured pattern rules and
//! engine settings. It handles deserialization of YAML configurations and provides
//! utilities for loading, merging, and validating these configs.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use log::{debug, info, warn};
use std::fmt;
use regex::Regex;

use crate::entity::PhiLabel;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Confidence threshold applied to recognizer candidates when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// Represents a single structured-pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternRule {
    /// Unique identifier for the rule (e.g., "us_ssn").
    pub name: String,
    /// The PHI label every match of this rule is reported under (e.g., "SSN").
    pub label: String,
    /// Human-readable description of what the rule targets.
    pub description: Option<String>,
    /// The regex pattern string.
    pub pattern: Option<String>,
    /// If true, enables multiline mode for the regex engine.
    pub multiline: bool,
    /// If true, the dot character `.` in regex will match newlines.
    pub dot_matches_new_line: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            label: String::new(),
            description: None,
            pattern: None,
            multiline: false,
            dot_matches_new_line: false,
            enabled: None,
        }
    }
}

/// How matches of different rules that cover the same text are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Every rule reports all of its matches, even where another rule matched
    /// the same text (a digit run may appear under both SSN and PHONE).
    #[default]
    Allow,
    /// A span claimed by an earlier rule suppresses overlapping matches of
    /// later rules.
    Exclusive,
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Allow => f.write_str("allow"),
            OverlapPolicy::Exclusive => f.write_str("exclusive"),
        }
    }
}

/// Reconciliation settings.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Minimum recognizer confidence for a candidate to be kept (default: 0.9).
    pub threshold: Option<f64>,
    /// Cross-rule overlap handling for structured matches (default: allow).
    pub overlap_policy: Option<OverlapPolicy>,
}

/// Represents the top-level configuration structure for phiscan.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Structured pattern rules, applied in this order.
    #[serde(default)]
    pub rules: Vec<PatternRule>,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl DetectionConfig {
    /// Loads pattern rules and engine settings from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: DetectionConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_rules(&config.rules)?;
        validate_engine_settings(&config.engine)?;
        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());

        Ok(config)
    }

    /// Loads the built-in structured PHI rules from the embedded configuration.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let config: DetectionConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default rules")?;

        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }

    /// The configured candidate threshold, or [`DEFAULT_THRESHOLD`].
    pub fn threshold(&self) -> f64 {
        self.engine.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    /// The configured overlap policy, or [`OverlapPolicy::Allow`].
    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.engine.overlap_policy.unwrap_or_default()
    }

    /// Filters active rules based on enable/disable lists provided via CLI.
    ///
    /// A non-empty `enable_rules` list keeps only the named rules; `disable_rules`
    /// always wins over `enable_rules`.
    pub fn set_active_rules(&mut self, enable_rules: &[String], disable_rules: &[String]) {
        let enable_set: HashSet<&str> = enable_rules.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();

        debug!("Initial rules count before filtering: {}", self.rules.len());

        let all_rule_names: HashSet<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();

        for rule_name in enable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `enable_rules` list does not exist.", rule_name);
        }

        for rule_name in disable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `disable_rules` list does not exist.", rule_name);
        }

        self.rules.retain(|rule| {
            let rule_name_str = rule.name.as_str();
            !disable_set.contains(rule_name_str) && (enable_set.is_empty() || enable_set.contains(rule_name_str))
        });

        debug!("Final active rules count after filtering: {}", self.rules.len());
    }
}

/// Merges user-defined rules and engine settings with defaults.
///
/// Rule order is significant: default rules keep their position (a user rule with
/// the same name replaces it in place) and new user rules are appended.
pub fn merge_rules(
    default_config: DetectionConfig,
    user_config: Option<DetectionConfig>,
) -> DetectionConfig {
    debug!("merge_rules called. Initial default rules count: {}", default_config.rules.len());

    let mut final_rules = default_config.rules;
    let mut final_engine = default_config.engine;

    if let Some(user_cfg) = user_config {
        debug!("User config provided. Merging {} user rules.", user_cfg.rules.len());
        let positions: HashMap<String, usize> = final_rules.iter()
            .enumerate()
            .map(|(i, rule)| (rule.name.clone(), i))
            .collect();

        for user_rule in user_cfg.rules {
            match positions.get(&user_rule.name) {
                Some(&i) => final_rules[i] = user_rule,
                None => final_rules.push(user_rule),
            }
        }

        if let Some(user_threshold) = user_cfg.engine.threshold {
            debug!("Overriding threshold with user value: {}", user_threshold);
            final_engine.threshold = Some(user_threshold);
        }

        if let Some(user_policy) = user_cfg.engine.overlap_policy {
            debug!("Overriding overlap policy with user value: {}", user_policy);
            final_engine.overlap_policy = Some(user_policy);
        }
    }

    debug!("Final total rules after merge: {}", final_rules.len());

    DetectionConfig {
        rules: final_rules,
        engine: final_engine,
    }
}

fn validate_engine_settings(settings: &EngineSettings) -> Result<()> {
    match settings.threshold {
        Some(t) if !(0.0..=1.0).contains(&t) => {
            Err(anyhow!("Engine threshold {} must lie within [0.0, 1.0].", t))
        }
        _ => Ok(()),
    }
}

/// Validates rule integrity (names, labels, regex compilation).
fn validate_rules(rules: &[PatternRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        if rule.label.parse::<PhiLabel>().is_err() {
            errors.push(format!("Rule '{}' has an unknown label '{}'.", rule.name, rule.label));
        }

        let pattern = match &rule.pattern {
            Some(p) => p,
            None => {
                errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name));
                continue;
            }
        };

        if pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
        }

        if pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(format!(
                "Rule '{}' pattern is {} characters long; the maximum is {}.",
                rule.name, pattern.len(), MAX_PATTERN_LENGTH
            ));
            continue;
        }

        if let Err(e) = Regex::new(pattern) {
            errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Rule validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}
