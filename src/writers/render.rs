use crate::error::{MonitorError, Result};
use crate::models::{ProfileKind, Report};
use crate::utils::constants::REPORT_CSV_HEADER;

/// How a report is rendered for delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Full `Station,Issue` table
    Csv,
    /// Issue list only, for inline email bodies
    Html,
}

impl ReportFormat {
    pub fn for_profile(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Transmission => ReportFormat::Html,
            ProfileKind::Daily | ProfileKind::Weekly => ReportFormat::Csv,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        match self {
            ReportFormat::Csv => render_csv(report),
            ReportFormat::Html => Ok(render_html(report)),
        }
    }
}

pub fn render_csv(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REPORT_CSV_HEADER)?;
    for finding in &report.findings {
        writer.write_record([finding.station.as_str(), finding.issue.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| MonitorError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| MonitorError::InvalidFormat(e.to_string()))
}

/// A bare `<table>` of issues, one row per finding, no header
pub fn render_html(report: &Report) -> String {
    let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <tbody>\n");
    for finding in &report.findings {
        html.push_str("    <tr>\n      <td>");
        html.push_str(&escape_html(&finding.issue));
        html.push_str("</td>\n    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Wrap a fragment in a minimal standalone document
pub fn render_html_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
