use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{MonitorError, Result};
use crate::models::{CheckProfile, ProfileKind, Report};
use crate::utils::filename::report_filename_prefix;
use crate::writers::render::{render_html_document, ReportFormat};
use crate::writers::sink::ReportSink;

/// Writes reports into a directory, one file per run.
///
/// Earlier reports of the same profile are removed before the new one is
/// written unless `keep_previous` is set.
pub struct FileReportSink {
    dir: PathBuf,
    keep_previous: bool,
}

impl FileReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keep_previous: false,
        }
    }

    pub fn with_keep_previous(mut self, keep_previous: bool) -> Self {
        self.keep_previous = keep_previous;
        self
    }

    pub fn report_path(&self, report: &Report) -> PathBuf {
        let format = ReportFormat::for_profile(report.profile);
        self.dir
            .join(format!("{}.{}", report.filename, format.extension()))
    }

    /// Render and write the report atomically, returning its path
    pub fn write(&self, report: &Report, profile: &CheckProfile) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let format = ReportFormat::for_profile(report.profile);
        let content = match format {
            ReportFormat::Csv => format.render(report)?,
            ReportFormat::Html => {
                render_html_document(&profile.dispatch.subject, &format.render(report)?)
            }
        };

        let path = self.report_path(report);
        if !self.keep_previous {
            self.remove_previous(report.profile, &path)?;
        }

        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.flush()?;
        temp_file
            .persist(&path)
            .map_err(|e| MonitorError::Io(e.error))?;

        info!(path = %path.display(), findings = report.len(), "report written");
        Ok(path)
    }

    /// Remove earlier reports of `kind`, leaving `current` alone
    fn remove_previous(&self, kind: ProfileKind, current: &Path) -> Result<usize> {
        let prefix = report_filename_prefix(kind);
        let mut removed = 0;

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path == current || !path.is_file() {
                continue;
            }
            let is_report = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix));
            if is_report {
                fs::remove_file(&path)?;
                debug!(path = %path.display(), "previous report removed");
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn deliver(&self, report: &Report, profile: &CheckProfile) -> Result<()> {
        self.write(report, profile).map(|_| ())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Finding;
    use crate::processors::report_assembler::assemble;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn daily_report(day: u32) -> Report {
        assemble(
            ProfileKind::Daily,
            vec![vec![Finding::new("Apex", "Battery is below 11.5 volts")]],
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        )
    }

    #[test]
    fn test_write_csv_report() {
        let dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(dir.path());

        let path = sink.write(&daily_report(1), &CheckProfile::daily()).unwrap();

        assert_eq!(path, dir.path().join("daily_report_2024-06-01.csv"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Station,Issue\nApex,Battery is below 11.5 volts\n");
    }

    #[test]
    fn test_previous_report_of_same_profile_is_replaced() {
        let dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(dir.path());
        fs::write(dir.path().join("weekly_report_2024-05-27.csv"), "Station,Issue\n").unwrap();

        sink.write(&daily_report(1), &CheckProfile::daily()).unwrap();
        sink.write(&daily_report(2), &CheckProfile::daily()).unwrap();

        assert!(!dir.path().join("daily_report_2024-06-01.csv").exists());
        assert!(dir.path().join("daily_report_2024-06-02.csv").exists());
        assert!(dir.path().join("weekly_report_2024-05-27.csv").exists());
    }

    #[test]
    fn test_keep_previous() {
        let dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(dir.path()).with_keep_previous(true);

        sink.write(&daily_report(1), &CheckProfile::daily()).unwrap();
        sink.write(&daily_report(2), &CheckProfile::daily()).unwrap();

        assert!(dir.path().join("daily_report_2024-06-01.csv").exists());
        assert!(dir.path().join("daily_report_2024-06-02.csv").exists());
    }

    #[tokio::test]
    async fn test_transmission_report_is_html() {
        let dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(dir.path().join("nested"));
        let report = assemble(
            ProfileKind::Transmission,
            vec![vec![Finding::new(
                "Apex",
                "Satellite data has not been transmitting for at least 12 hours for Apex",
            )]],
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        );

        sink.deliver(&report, &CheckProfile::transmission())
            .await
            .unwrap();

        let path = dir.path().join("nested/transmission_report_2024-06-03.html");
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains("<title>Alert transmission issue - last 12 hours</title>"));
        assert!(html.contains("for at least 12 hours for Apex</td>"));
    }
}
