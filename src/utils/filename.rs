use crate::models::ProfileKind;
use chrono::NaiveDate;

/// Report filename with format: {profile}_report_{YYYY-MM-DD}
pub fn generate_report_filename(kind: ProfileKind, run_date: NaiveDate) -> String {
    format!("{}_report_{}", kind, run_date.format("%Y-%m-%d"))
}

/// Prefix shared by every report of a profile, whatever its date
pub fn report_filename_prefix(kind: ProfileKind) -> String {
    format!("{}_report_", kind)
}
