//! `phiscan rules`: list the structured pattern rules in effect.

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use log::debug;

use phiscan_core::{DetectionConfig, PatternRule};

use crate::cli::RulesCommand;
use crate::commands::load_detection_config;

fn status(rule: &PatternRule) -> &'static str {
    if rule.enabled == Some(false) { "disabled" } else { "enabled" }
}

/// Renders the merged rule set in application order.
pub fn rules_table(config: &DetectionConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Rule").add_attribute(Attribute::Bold),
            Cell::new("Label").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ]);

    for rule in &config.rules {
        table.add_row(vec![
            Cell::new(&rule.name),
            Cell::new(&rule.label),
            Cell::new(status(rule)),
            Cell::new(rule.description.as_deref().unwrap_or("")),
        ]);
    }
    table
}

/// Entry point for `phiscan rules`.
pub fn run_rules(cmd: &RulesCommand) -> Result<()> {
    let config = load_detection_config(cmd.config.as_deref())?;
    debug!("Listing {} rules.", config.rules.len());
    println!("{}", rules_table(&config));
    println!("threshold: {:.2}  overlap policy: {}", config.threshold(), config.overlap_policy());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_default_rules_in_order() {
        let config = load_detection_config(None).unwrap();
        let rendered = rules_table(&config).to_string();
        let date = rendered.find("date").unwrap();
        let ssn = rendered.find("us_ssn").unwrap();
        assert!(date < ssn);
        assert!(rendered.contains("EMAIL"));
    }

    #[test]
    fn disabled_rule_is_marked() {
        let mut config = load_detection_config(None).unwrap();
        config.rules[0].enabled = Some(false);
        assert!(rules_table(&config).to_string().contains("disabled"));
    }
}
