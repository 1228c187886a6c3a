use crate::error::{MonitorError, Result};
use crate::models::{CheckProfile, Finding, ProfileKind, Report, Station, StationWindow};
use crate::processors::report_assembler::assemble;
use crate::processors::{CatalogResolver, RuleEngine};
use crate::readers::DataSource;
use crate::utils::progress::ProgressReporter;
use crate::writers::{dispatch, DeliveryOutcome, ReportSink};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

/// What one run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub profile: ProfileKind,
    pub stations: usize,
    pub findings: usize,
    /// `None` when nothing was found and the profile stays silent
    pub report: Option<Report>,
    pub deliveries: Vec<DeliveryOutcome>,
}

impl RunSummary {
    pub fn all_delivered(&self) -> bool {
        self.deliveries.iter().all(|outcome| outcome.success)
    }
}

/// Runs one profile over every station of a data source.
///
/// Stations are evaluated in parallel; a failure local to one station becomes
/// a finding for that station and never aborts the run.
pub struct StationMonitor<S: DataSource> {
    source: S,
    profile: CheckProfile,
    resolver: CatalogResolver,
    max_workers: usize,
}

impl<S: DataSource> StationMonitor<S> {
    pub fn new(source: S, profile: CheckProfile) -> Self {
        Self {
            source,
            profile,
            resolver: CatalogResolver::default(),
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_resolver(mut self, resolver: CatalogResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn profile(&self) -> &CheckProfile {
        &self.profile
    }

    /// Stations this profile evaluates, in report order
    pub fn stations(&self) -> Result<Vec<Station>> {
        let names = self.source.list_tables().map_err(|e| {
            MonitorError::InvalidCatalog(format!("could not list source tables: {}", e))
        })?;
        self.resolver.resolve(&names, &self.profile)
    }

    /// Fetch and evaluate one station. Errors are reported as findings.
    pub fn check_station(&self, station: &Station, now: DateTime<Utc>) -> Vec<Finding> {
        let engine = RuleEngine::new(&self.profile, now);
        let window_size = self.profile.window_size;

        let records = match self.source.fetch_window(&station.id, window_size) {
            Ok(records) => records,
            Err(e) => {
                warn!(station = %station.id, error = %e, "station data could not be read");
                return vec![Finding::new(
                    station.display_name.clone(),
                    format!("Station data could not be read: {}", e),
                )];
            }
        };

        let window = match StationWindow::new(&station.id, records, window_size) {
            Ok(window) => window,
            Err(MonitorError::EmptyWindow { .. }) => {
                info!(station = %station.id, "station returned no records");
                return vec![engine.staleness_finding(station)];
            }
            Err(e) => {
                return vec![Finding::new(
                    station.display_name.clone(),
                    format!("Station data could not be read: {}", e),
                )];
            }
        };

        match engine.evaluate(station, &window) {
            Ok(findings) => findings,
            Err(MonitorError::ChannelMissing { channel, .. }) => {
                warn!(station = %station.id, channel = %channel, "station schema error");
                vec![Finding::new(
                    station.display_name.clone(),
                    format!("Station schema error: missing channel {}", channel),
                )]
            }
            Err(e) => {
                warn!(station = %station.id, error = %e, "station could not be evaluated");
                vec![Finding::new(
                    station.display_name.clone(),
                    format!("Station could not be evaluated: {}", e),
                )]
            }
        }
    }

    /// Evaluate stations in parallel. Results keep the input order.
    pub fn evaluate(
        &self,
        stations: &[Station],
        now: DateTime<Utc>,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<Vec<Finding>>> {
        if let Some(p) = progress {
            p.set_length(stations.len() as u64);
            p.set_message(&format!(
                "Checking {} stations ({})...",
                stations.len(),
                self.profile.kind
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| MonitorError::Config(e.to_string()))?;

        let per_station: Vec<Vec<Finding>> = pool.install(|| {
            stations
                .par_iter()
                .map(|station| {
                    let findings = self.check_station(station, now);
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    findings
                })
                .collect()
        });

        if let Some(p) = progress {
            p.finish_with_message(&format!("Checked {} stations", stations.len()));
        }

        Ok(per_station)
    }

    /// Resolve, evaluate and assemble. `None` means no report is emitted.
    pub fn check(
        &self,
        now: DateTime<Utc>,
        progress: Option<&ProgressReporter>,
    ) -> Result<Option<Report>> {
        let stations = self.stations()?;
        let per_station = self.evaluate(&stations, now, progress)?;
        Ok(self.finish_report(per_station, now))
    }

    fn finish_report(&self, per_station: Vec<Vec<Finding>>, now: DateTime<Utc>) -> Option<Report> {
        let report = assemble(self.profile.kind, per_station, now.date_naive());
        if report.is_empty() && !self.profile.emit_empty_report {
            None
        } else {
            Some(report)
        }
    }

    /// One complete run: check every station, then hand the report to each
    /// sink. Only a catalog failure is fatal.
    pub async fn run_once(
        &self,
        now: DateTime<Utc>,
        sinks: &[Box<dyn ReportSink>],
        progress: Option<&ProgressReporter>,
    ) -> Result<RunSummary> {
        let stations = self.stations()?;
        let per_station = self.evaluate(&stations, now, progress)?;
        let findings: usize = per_station.iter().map(Vec::len).sum();
        let report = self.finish_report(per_station, now);

        info!(
            profile = %self.profile.kind,
            stations = stations.len(),
            findings,
            "check complete"
        );

        let deliveries = match &report {
            Some(report) => dispatch(sinks, report, &self.profile).await,
            None => {
                info!(profile = %self.profile.kind, "no findings, no report emitted");
                Vec::new()
            }
        };

        Ok(RunSummary {
            profile: self.profile.kind,
            stations: stations.len(),
            findings,
            report,
            deliveries,
        })
    }
}
