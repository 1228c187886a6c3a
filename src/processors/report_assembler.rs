use crate::models::{Finding, ProfileKind, Report};
use crate::utils::filename::generate_report_filename;
use chrono::NaiveDate;

/// Concatenate per-station findings into one report.
///
/// Station order and rule order are preserved as given. Identical findings
/// from different stations are kept.
pub fn assemble(
    kind: ProfileKind,
    per_station_findings: Vec<Vec<Finding>>,
    run_date: NaiveDate,
) -> Report {
    Report {
        profile: kind,
        run_date,
        filename: generate_report_filename(kind, run_date),
        findings: per_station_findings.into_iter().flatten().collect(),
    }
}
