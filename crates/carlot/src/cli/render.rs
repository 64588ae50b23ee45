//! Output formatting for the `carlot` binary.

use super::setup::OutputFormat;
use carlotapp::config::CarlotConfig;
use carlotapp::filter::{FilterKey, FilterKind};
use carlotapp::model::Listing;
use std::fmt::Write;

pub fn listings(listings: &[Listing], format: OutputFormat) -> serde_json::Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            for listing in listings {
                out.push_str(&serde_json::to_string(listing)?);
                out.push('\n');
            }
        }
        OutputFormat::Table => {
            for l in listings {
                let name = if l.title.is_empty() {
                    format!("{} {}", l.make, l.model)
                } else {
                    l.title.clone()
                };
                let _ = writeln!(
                    out,
                    "{:<8} {:<28} {:<14} {:>12} {:>6} {:>9} km",
                    l.id.as_str(), name, l.city, l.price, l.year, l.mileage
                );
            }
        }
    }
    Ok(out)
}

pub fn filter_keys() -> String {
    let mut out = String::new();
    for key in FilterKey::ALL {
        let how = match key.kind() {
            FilterKind::Search => "substring of make, model or city",
            FilterKind::Exact => "case-insensitive exact match",
            FilterKind::Range => "range: MIN-MAX or MIN+",
        };
        let _ = writeln!(out, "{:<16} {}", key.as_str(), how);
    }
    out
}

pub fn config(config: &CarlotConfig) -> String {
    let data_dir = config
        .data_dir
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "(unresolved)".to_string());
    format!(
        "draft_key = {:?}\nfirst_year = {}\nmax_compare_slots = {}\nmax_draft_bytes = {}\ndata_dir = {:?}\n",
        config.draft_key, config.first_year, config.max_compare_slots, config.max_draft_bytes, data_dir
    )
}
