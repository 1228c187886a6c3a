use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::error::{MonitorError, Result};
use crate::models::{CheckProfile, Report};
use crate::settings::SmtpSettings;
use crate::utils::constants::IMPLICIT_TLS_SMTP_PORT;
use crate::writers::render::{escape_html, ReportFormat};
use crate::writers::sink::ReportSink;

pub struct EmailReportSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailReportSink {
    pub fn from_settings(smtp: &SmtpSettings) -> Result<Self> {
        let from = parse_mailbox(&smtp.from)?;

        // Port 465 is implicit TLS; otherwise STARTTLS unless TLS is off.
        let mut builder = if smtp.port == IMPLICIT_TLS_SMTP_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                .map_err(|e| MonitorError::Config(e.to_string()))?
                .port(smtp.port)
        } else if smtp.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                .map_err(|e| MonitorError::Config(e.to_string()))?
                .port(smtp.port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host).port(smtp.port)
        };

        if let (Ok(username), Ok(password)) =
            (std::env::var("SMTP_USERNAME"), std::env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    pub fn build_message(&self, report: &Report, profile: &CheckProfile) -> Result<Message> {
        build_message(&self.from, report, profile)
    }
}

#[async_trait]
impl ReportSink for EmailReportSink {
    async fn deliver(&self, report: &Report, profile: &CheckProfile) -> Result<()> {
        let message = self.build_message(report, profile)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MonitorError::Delivery(e.to_string()))?;

        info!(
            subject = %profile.dispatch.subject,
            recipients = profile.dispatch.recipients.len(),
            "report emailed"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| {
            MonitorError::Config(format!("invalid address '{}': {}", address, e))
        })
}

/// Build the email for a report addressed to the profile's recipients
pub fn build_message(from: &Mailbox, report: &Report, profile: &CheckProfile) -> Result<Message> {
    if profile.dispatch.recipients.is_empty() {
        return Err(MonitorError::Delivery(format!(
            "no recipients configured for the {} profile",
            profile.kind
        )));
    }

    let mut builder = Message::builder()
        .from(from.clone())
        .subject(profile.dispatch.subject.clone());
    for recipient in &profile.dispatch.recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let format = ReportFormat::for_profile(report.profile);
    let body = format.render(report)?;

    let message = match format {
        ReportFormat::Html => builder.singlepart(SinglePart::html(body)),
        ReportFormat::Csv => {
            let mut notice = format!("<p>{}</p>\n", escape_html(&profile.dispatch.notice));
            if report.is_empty() {
                notice.push_str("<p>No issues were found.</p>\n");
            }
            let content_type = ContentType::parse("text/csv")
                .map_err(|e| MonitorError::Delivery(e.to_string()))?;
            let attachment = Attachment::new(format!("{}.{}", report.filename, format.extension()))
                .body(body, content_type);

            builder.multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::html(notice))
                    .singlepart(attachment),
            )
        }
    };

    message.map_err(|e| MonitorError::Delivery(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finding, ProfileKind};
    use crate::processors::report_assembler::assemble;
    use chrono::NaiveDate;

    fn smtp(port: u16, tls: bool) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port,
            tls,
            from: "Hydromet <hydromet@example.com>".to_string(),
        }
    }

    fn from() -> Mailbox {
        "Hydromet <hydromet@example.com>".parse().unwrap()
    }

    fn report(kind: ProfileKind) -> Report {
        assemble(
            kind,
            vec![vec![Finding::new("Apex", "Battery is below 11.5 volts")]],
            NaiveDate::from_ymd_opt(2024, 8, 12).unwrap(),
        )
    }

    #[test]
    fn test_from_settings() {
        assert!(EmailReportSink::from_settings(&smtp(587, true)).is_ok());
        assert!(EmailReportSink::from_settings(&smtp(465, true)).is_ok());
        assert!(EmailReportSink::from_settings(&smtp(25, false)).is_ok());
    }

    #[test]
    fn test_invalid_from_address() {
        let mut settings = smtp(587, true);
        settings.from = "not-an-address".to_string();

        let result = EmailReportSink::from_settings(&settings);
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_no_recipients() {
        let profile = CheckProfile::daily();
        let result = build_message(&from(), &report(ProfileKind::Daily), &profile);
        assert!(matches!(result, Err(MonitorError::Delivery(_))));
    }

    #[test]
    fn test_daily_message_has_csv_attachment() {
        let mut profile = CheckProfile::daily();
        profile.dispatch.recipients = vec![
            "ops@example.com".to_string(),
            "field@example.com".to_string(),
        ];

        let message = build_message(&from(), &report(ProfileKind::Daily), &profile).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("Subject: Hydromet daily report"));
        assert!(formatted.contains("ops@example.com"));
        assert!(formatted.contains("field@example.com"));
        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("text/csv"));
        assert!(formatted.contains("daily_report_2024-08-12.csv"));
    }

    #[test]
    fn test_transmission_message_is_inline_html() {
        let mut profile = CheckProfile::transmission();
        profile.dispatch.recipients = vec!["ops@example.com".to_string()];

        let message =
            build_message(&from(), &report(ProfileKind::Transmission), &profile).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("Subject: Alert transmission issue - last 12 hours"));
        assert!(formatted.contains("text/html"));
        assert!(!formatted.contains("multipart/mixed"));
        assert!(!formatted.contains("text/csv"));
    }
}
