use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{CheckProfile, Report};

/// Destination for a finished report
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &Report, profile: &CheckProfile) -> Result<()>;

    fn name(&self) -> &str;
}

/// Result of handing one report to one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub sink: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Deliver a report to every sink in turn. A failing sink is logged and
/// recorded; the remaining sinks still run.
pub async fn dispatch(
    sinks: &[Box<dyn ReportSink>],
    report: &Report,
    profile: &CheckProfile,
) -> Vec<DeliveryOutcome> {
    let mut outcomes = Vec::with_capacity(sinks.len());

    for sink in sinks {
        let start = Instant::now();
        let result = sink.deliver(report, profile).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let error = match result {
            Ok(()) => {
                info!(
                    sink = sink.name(),
                    report = %report.filename,
                    findings = report.len(),
                    duration_ms,
                    "report delivered"
                );
                None
            }
            Err(e) => {
                warn!(
                    sink = sink.name(),
                    report = %report.filename,
                    error = %e,
                    duration_ms,
                    "report delivery failed"
                );
                Some(e.to_string())
            }
        };

        outcomes.push(DeliveryOutcome {
            sink: sink.name().to_string(),
            success: error.is_none(),
            error,
            duration_ms,
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;
    use crate::models::{Finding, ProfileKind};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        delivered: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ReportSink for CountingSink {
        async fn deliver(&self, _report: &Report, _profile: &CheckProfile) -> Result<()> {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct FailingSink;

    #[async_trait]
    impl ReportSink for FailingSink {
        async fn deliver(&self, _report: &Report, _profile: &CheckProfile) -> Result<()> {
            Err(MonitorError::Delivery("relay refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let sinks: Vec<Box<dyn ReportSink>> = vec![
            Box::new(FailingSink),
            Box::new(CountingSink {
                delivered: Arc::clone(&delivered),
            }),
        ];
        let report = Report {
            profile: ProfileKind::Daily,
            run_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            filename: "daily_report_2024-01-02".to_string(),
            findings: vec![Finding::new("Apex", "Battery is below 11.5 volts")],
        };

        let outcomes = dispatch(&sinks, &report, &CheckProfile::daily()).await;

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].success);
        assert_eq!(
            outcomes[0].error.as_deref(),
            Some("Report delivery error: relay refused")
        );
        assert!(outcomes[1].success);
        assert_eq!(outcomes[1].sink, "counting");
    }
}
