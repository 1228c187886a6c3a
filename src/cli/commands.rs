use chrono::Utc;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::cli::args::{Cli, Commands};
use crate::error::{MonitorError, Result};
use crate::models::{ProfileKind, Station};
use crate::processors::StationMonitor;
use crate::readers::CsvDirectorySource;
use crate::settings::Settings;
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{EmailReportSink, FileReportSink, ReportSink};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    let silent = cli.log_file.is_some() || !std::io::stderr().is_terminal();

    match cli.command {
        Commands::Run {
            profile,
            data_dir,
            output_dir,
            email,
            max_workers,
        } => {
            override_data_dir(&mut settings, data_dir);
            if let Some(dir) = output_dir {
                settings.output.dir = dir;
            }

            println!("Running {} check...", profile);
            println!("Data directory: {}", settings.source.data_dir.display());
            println!("Output directory: {}", settings.output.dir.display());
            println!("Workers: {}", max_workers);

            let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(
                FileReportSink::new(&settings.output.dir)
                    .with_keep_previous(settings.output.keep_previous),
            )];
            if email {
                let smtp = settings.smtp.as_ref().ok_or_else(|| {
                    MonitorError::Config("--email requires an [smtp] section".to_string())
                })?;
                sinks.push(Box::new(EmailReportSink::from_settings(smtp)?));
            }

            let monitor = monitor_for(&settings, profile).with_max_workers(max_workers);
            let progress = ProgressReporter::new(0, "Resolving stations...", silent);

            let summary = monitor
                .run_once(Utc::now(), &sinks, Some(&progress))
                .await?;

            match &summary.report {
                Some(report) => println!("\n{}", report.summary()),
                None => println!(
                    "\nNo findings across {} stations; no report emitted",
                    summary.stations
                ),
            }

            for outcome in &summary.deliveries {
                match &outcome.error {
                    None => println!("Delivered via {} ({} ms)", outcome.sink, outcome.duration_ms),
                    Some(error) => println!("Delivery via {} failed: {}", outcome.sink, error),
                }
            }

            if !summary.all_delivered() {
                return Err(MonitorError::Delivery(
                    "report could not be delivered to every sink".to_string(),
                ));
            }
        }

        Commands::Stations { profile, data_dir } => {
            override_data_dir(&mut settings, data_dir);
            let monitor = monitor_for(&settings, profile);

            let spinner = ProgressReporter::new_spinner("Reading source catalog...", silent);
            let stations = monitor.stations()?;
            spinner.finish_with_message(&format!("Found {} stations", stations.len()));

            for station in &stations {
                println!("{:<40} {}", station.id, station.display_name);
            }
            println!("\n{} stations for the {} profile", stations.len(), profile);
        }

        Commands::Check {
            profile,
            table,
            data_dir,
        } => {
            override_data_dir(&mut settings, data_dir);
            let monitor = monitor_for(&settings, profile);
            let station = Station::from_source_name(&table, &settings.source.clean_prefix);

            let spinner =
                ProgressReporter::new_spinner(&format!("Checking {}...", table), silent);
            if monitor.profile().exclusions.excludes(&table) {
                spinner.println(&format!(
                    "Note: {} is excluded from the {} profile",
                    table, profile
                ));
            }
            let findings = monitor.check_station(&station, Utc::now());
            spinner.finish_with_message(&format!("Checked {}", table));

            if findings.is_empty() {
                println!("{}: no issues", station.display_name);
            } else {
                for finding in &findings {
                    println!("{}: {}", finding.station, finding.issue);
                }
            }
        }

        Commands::Config => {
            let json = serde_json::to_string_pretty(&settings)
                .map_err(|e| MonitorError::InvalidFormat(e.to_string()))?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn override_data_dir(settings: &mut Settings, data_dir: Option<PathBuf>) {
    if let Some(dir) = data_dir {
        settings.source.data_dir = dir;
    }
}

fn monitor_for(settings: &Settings, profile: ProfileKind) -> StationMonitor<CsvDirectorySource> {
    StationMonitor::new(settings.data_source(), settings.profiles.get(profile).clone())
        .with_resolver(settings.resolver())
}
