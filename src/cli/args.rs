use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::ProfileKind;

#[derive(Parser)]
#[command(name = "wx-station-check")]
#[command(about = "Telemetry health checks for remote weather stations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: wx-check.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check every station for one profile and deliver the report
    Run {
        #[arg(short, long, value_enum)]
        profile: ProfileKind,

        #[arg(short, long, help = "Directory of <table>.csv exports")]
        data_dir: Option<PathBuf>,

        #[arg(short, long, help = "Report output directory")]
        output_dir: Option<PathBuf>,

        #[arg(long, help = "Also email the report to the profile's recipients")]
        email: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// List the stations a profile would check
    Stations {
        #[arg(short, long, value_enum)]
        profile: ProfileKind,

        #[arg(short, long, help = "Directory of <table>.csv exports")]
        data_dir: Option<PathBuf>,
    },

    /// Check a single station table and print its findings
    Check {
        #[arg(short, long, value_enum)]
        profile: ProfileKind,

        #[arg(short, long, help = "Source table name, e.g. clean_mountcain")]
        table: String,

        #[arg(short, long, help = "Directory of <table>.csv exports")]
        data_dir: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    Config,
}
