use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::ProfileKind;

/// One reported anomaly tied to a station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub station: String,
    pub issue: String,
}

impl Finding {
    pub fn new(station: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            issue: issue.into(),
        }
    }
}

/// Findings of one run, in station order then rule order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub profile: ProfileKind,
    pub run_date: NaiveDate,
    pub filename: String,
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn affected_stations(&self) -> usize {
        self.findings
            .iter()
            .map(|finding| finding.station.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Generate a plain-text summary for terminal output
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== {} ===\n", self.filename));
        summary.push_str(&format!("Profile: {}\n", self.profile));
        summary.push_str(&format!("Run date: {}\n", self.run_date));
        summary.push_str(&format!(
            "Findings: {} across {} stations\n",
            self.len(),
            self.affected_stations()
        ));

        if !self.findings.is_empty() {
            summary.push('\n');
            for (i, finding) in self.findings.iter().enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: {}\n",
                    i + 1,
                    finding.station,
                    finding.issue
                ));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let report = Report {
            profile: ProfileKind::Daily,
            run_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            filename: "daily_report_2024-01-15".to_string(),
            findings: vec![
                Finding::new("Mountcain", "Battery is below 11.5 volts"),
                Finding::new("Mountcain", "Relative humidity sensor is outside of range 0 to 100"),
                Finding::new("Upperskeena", "Battery is below 11.5 volts"),
            ],
        };

        assert_eq!(report.len(), 3);
        assert_eq!(report.affected_stations(), 2);

        let summary = report.summary();
        assert!(summary.contains("Findings: 3 across 2 stations"));
        assert!(summary.contains("  3. Upperskeena: Battery is below 11.5 volts"));
    }
}
