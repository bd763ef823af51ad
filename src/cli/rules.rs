//! Rules command handlers

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

use crate::cli::RulesListArgs;
use crate::config::{vendor_map, TriageConfig};
use crate::flags::RuleCatalog;

/// Handle `triage rules list`.
pub fn handle_rules_list(args: &RulesListArgs) -> anyhow::Result<String> {
    let config = TriageConfig::load(Some(&args.config))?.with_env_overrides();
    let catalog = RuleCatalog::load(&config.catalog.dir, vendor_map(&config.profiles))?;

    if args.json {
        let slots: Vec<_> = catalog
            .iter()
            .map(|(slot, pattern)| {
                json!({
                    "slot": slot,
                    "pattern": pattern.number(),
                    "entries": pattern.entry_count(),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&slots)?);
    }

    Ok(format_rules_table(&catalog))
}

/// Format the catalog as a table
fn format_rules_table(catalog: &RuleCatalog) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slot", "Pattern", "Entries"]);

    for (slot, pattern) in catalog.iter() {
        let pattern_name = match pattern.number() {
            1 => "text-contains-any",
            2 => "field-equals-any",
            3 => "vendor-cross-match",
            4 => "three-way",
            5 => "classification-match",
            _ => "unknown",
        };
        table.add_row(vec![
            Cell::new(format!("{:02}", slot)),
            Cell::new(pattern_name),
            Cell::new(pattern.entry_count()),
        ]);
    }

    table.to_string()
}
