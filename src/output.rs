use crate::eureka::OutcomeStatus;
use crate::orchestrator::{DeregisterReport, RegistryListing};
use std::fmt::Write;

const LIST_HEADERS: [&str; 5] = ["eureka app name", "cf app name", "cf instance index", "zone", "status"];

/// Render the registry listing as an aligned table
pub fn render_listing(listing: &RegistryListing) -> String {
    if listing.instances.is_empty() {
        return format!(
            "Service registry {} has no registered applications\n",
            listing.registry
        );
    }

    let rows: Vec<[String; 5]> = listing
        .instances
        .iter()
        .map(|listed| {
            let instance = &listed.instance;
            [
                instance.app_name.clone(),
                listed.cf_app_name.clone().unwrap_or_else(|| "?".to_string()),
                instance.cf_instance_index.clone().unwrap_or_else(|| "?".to_string()),
                instance.zone.clone().unwrap_or_else(|| "?".to_string()),
                instance.status.clone(),
            ]
        })
        .collect();

    let mut widths = LIST_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &LIST_HEADERS.map(str::to_string), &widths);
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    let _ = writeln!(out, "{}", line.join("   ").trim_end());
}

/// Render the summary line followed by one line per failed instance
pub fn render_report(report: &DeregisterReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.summary());

    for outcome in report.failures() {
        let id = outcome.instance_id.as_deref().unwrap_or("?");
        match &outcome.status {
            OutcomeStatus::Failed(reason) => {
                let _ = writeln!(out, "  failed   {} {}: {}", outcome.app_name, id, reason);
            }
            OutcomeStatus::Skipped(reason) => {
                let _ = writeln!(out, "  skipped  {} {}: {}", outcome.app_name, id, reason);
            }
            OutcomeStatus::Deregistered => {}
        }
    }
    out
}
