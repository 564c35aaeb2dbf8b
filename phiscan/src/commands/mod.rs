//! Command implementations for the phiscan CLI.
//!
//! Every command that analyses text builds its engine through
//! [`build_engine`], so config merging, rule filtering and recognizer loading
//! behave the same way for `scan` and `batch`.

pub mod batch;
pub mod rules;
pub mod scan;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use phiscan_core::{merge_rules, DetectionConfig, EntityRecognizer, LexiconRecognizer, PhiEngine, RecognizerHandle};

use crate::cli::EngineArgs;

/// Loads the default rules and merges the user's config file over them.
pub fn load_detection_config(user_config: Option<&std::path::Path>) -> Result<DetectionConfig> {
    let default_config = DetectionConfig::load_default_rules()?;
    let user_config = match user_config {
        Some(path) => Some(
            DetectionConfig::load_from_file(path)
                .with_context(|| format!("Failed to load custom rules from {}", path.display()))?,
        ),
        None => None,
    };
    Ok(merge_rules(default_config, user_config))
}

/// Loads the recognizer once for the whole run.
///
/// A lexicon that cannot be loaded is not fatal: the run continues with
/// structured patterns only, and every report says so.
pub fn load_recognizer(args: &EngineArgs) -> RecognizerHandle {
    if args.no_recognizer {
        info!("Recognizer disabled by --no-recognizer.");
        return None;
    }

    let loaded = match &args.lexicon {
        Some(path) => LexiconRecognizer::from_file(path),
        None => LexiconRecognizer::with_default_lexicon(),
    };

    match loaded {
        Ok(recognizer) => {
            debug!("Loaded recognizer '{}'.", recognizer.name());
            Some(Arc::new(recognizer) as Arc<dyn EntityRecognizer>)
        }
        Err(e) => {
            warn!("{}; continuing with structured patterns only.", e);
            None
        }
    }
}

/// Builds the engine described by the shared command-line options.
pub fn build_engine(args: &EngineArgs) -> Result<PhiEngine> {
    let mut config = load_detection_config(args.config.as_deref())?;
    config.set_active_rules(&args.enable, &args.disable);

    let engine = PhiEngine::new(&config, load_recognizer(args))
        .context("Failed to initialize the PHI engine")?;

    match args.threshold {
        Some(threshold) => Ok(engine.with_threshold(threshold)?),
        None => Ok(engine),
    }
}
