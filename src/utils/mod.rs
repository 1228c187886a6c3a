pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use filename::{generate_report_filename, report_filename_prefix};
pub use logging::init_logging;
pub use progress::ProgressReporter;
