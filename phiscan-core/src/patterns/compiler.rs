//! compiler.rs - Manages the compilation and caching of structured pattern rules.
//!
//! This module provides a thread-safe, cached mechanism to convert a
//! `DetectionConfig` into `CompiledPatterns`. It uses a global, shared cache
//! to avoid redundant compilation when many engines are built from the same
//! configuration.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, Result};
use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use lazy_static::lazy_static;
use std::sync::{Arc, RwLock};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

use crate::config::{PatternRule, DetectionConfig, MAX_PATTERN_LENGTH};
use crate::entity::PhiLabel;
use crate::errors::PhiscanError;

/// Represents a single compiled pattern rule.
#[derive(Debug)]
pub struct CompiledPattern {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// The unique name of the rule.
    pub name: String,
    /// The label every match is reported under.
    pub label: PhiLabel,
}

/// The ordered set of compiled rules a detector applies.
#[derive(Debug)]
pub struct CompiledPatterns {
    /// Rules in configuration order.
    pub rules: Vec<CompiledPattern>,
}

lazy_static! {
    /// A thread-safe, global cache for compiled patterns.
    /// The key is a hash of the ordered rule list.
    static ref COMPILED_PATTERNS_CACHE: RwLock<HashMap<u64, Arc<CompiledPatterns>>> = RwLock::new(HashMap::new());
}

/// Hashes the rule list to create a cache key. Order is part of the key
/// because rules are applied in order.
fn hash_config(config: &DetectionConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.rules.hash(&mut hasher);
    hasher.finish()
}

/// Compiles a list of `PatternRule`s into `CompiledPatterns`.
/// This is the low-level function that performs the actual regex compilation.
/// Disabled rules are skipped.
pub fn compile_rules(rules_to_compile: Vec<PatternRule>) -> Result<CompiledPatterns, PhiscanError> {
    debug!("Starting compilation of {} rules.", rules_to_compile.len());

    let mut compiled_rules = Vec::new();
    let mut compilation_errors = Vec::new();

    for rule in rules_to_compile {
        if rule.enabled == Some(false) {
            debug!("Skipping disabled rule '{}'.", &rule.name);
            continue;
        }

        let label = match rule.label.parse::<PhiLabel>() {
            Ok(label) => label,
            Err(_) => {
                compilation_errors.push(PhiscanError::InvalidRuleLabel(rule.name, rule.label));
                continue;
            }
        };

        let Some(pattern) = rule.pattern.as_ref() else {
            warn!("Skipping rule '{}' because its pattern is missing.", &rule.name);
            continue;
        };

        if pattern.len() > MAX_PATTERN_LENGTH {
            compilation_errors.push(PhiscanError::PatternLengthExceeded(
                rule.name,
                pattern.len(),
                MAX_PATTERN_LENGTH
            ));
            continue;
        }

        let regex_result = RegexBuilder::new(pattern)
            .multi_line(rule.multiline)
            .dot_matches_new_line(rule.dot_matches_new_line)
            .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
            .build();

        match regex_result {
            Ok(regex) => {
                log::debug!(
                    target: "phiscan_core::patterns",
                    "Rule '{}' compiled successfully.",
                    &rule.name
                );
                compiled_rules.push(CompiledPattern {
                    regex,
                    name: rule.name,
                    label,
                });
            }
            Err(e) => {
                compilation_errors.push(PhiscanError::RuleCompilationError(rule.name, e));
            }
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors.iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        Err(PhiscanError::Fatal(format!("Failed to compile {} rule(s):\n{}", compilation_errors.len(), error_message)))
    } else {
        debug!(
            "Finished compiling rules. Total compiled: {}.",
            compiled_rules.len()
        );
        Ok(CompiledPatterns { rules: compiled_rules })
    }
}

/// Gets a `CompiledPatterns` instance from the cache or compiles them if not found.
///
/// It returns an `Arc` so every engine and worker shares one compiled set.
pub fn get_or_compile_rules(config: &DetectionConfig) -> Result<Arc<CompiledPatterns>> {
    let cache_key = hash_config(config);

    {
        let cache = COMPILED_PATTERNS_CACHE.read()
            .map_err(|_| anyhow!("Compiled pattern cache lock poisoned"))?;
        if let Some(rules) = cache.get(&cache_key) {
            debug!("Serving compiled patterns from cache for key: {}", &cache_key);
            return Ok(Arc::clone(rules));
        }
    }

    debug!("Compiled patterns not found in cache. Compiling now.");
    let compiled = compile_rules(config.rules.clone())?;
    let mut cache = COMPILED_PATTERNS_CACHE.write()
        .map_err(|_| anyhow!("Compiled pattern cache lock poisoned"))?;
    // Another thread may have compiled the same rules meanwhile; keep the first.
    let cached = cache.entry(cache_key).or_insert_with(|| Arc::new(compiled));

    debug!("Successfully compiled and cached patterns for key: {}", &cache_key);
    Ok(Arc::clone(cached))
}
