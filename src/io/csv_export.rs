use std::path::Path;

use tracing::info;

use crate::workload::{AssigneeSummary, OverloadWarning};
use crate::Result;

fn hours(value: f64) -> String {
    format!("{value:.2}")
}

/// Export a semicolon-delimited workload report.
///
/// One `Assignee` row per summary, then one `Overload` row per warning:
/// Kind ; Assignee ; Date ; Hours ; Items ; Utilization % ; Overage
/// Returns the number of data rows written.
pub fn export_workload(
    summaries: &[AssigneeSummary],
    warnings: &[OverloadWarning],
    path: &Path,
) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record([
        "Kind",
        "Assignee",
        "Date",
        "Hours",
        "Items",
        "Utilization %",
        "Overage",
    ])?;

    for summary in summaries {
        let utilization = summary
            .utilization_percent
            .map(|p| format!("{p:.0}"))
            .unwrap_or_default();
        wtr.write_record([
            "Assignee",
            summary.label.as_str(),
            "",
            hours(summary.total_hours).as_str(),
            summary.item_count.to_string().as_str(),
            utilization.as_str(),
            "",
        ])?;
    }

    for warning in warnings {
        wtr.write_record([
            "Overload",
            warning.assignee_label.as_str(),
            warning.date.format("%d/%m/%Y").to_string().as_str(),
            hours(warning.hours).as_str(),
            "",
            "",
            hours(warning.overage).as_str(),
        ])?;
    }

    wtr.flush()?;
    let rows = summaries.len() + warnings.len();
    info!(path = %path.display(), rows, "workload report exported");
    Ok(rows)
}
