pub mod email_sink;
pub mod file_sink;
pub mod render;
pub mod sink;

pub use email_sink::EmailReportSink;
pub use file_sink::FileReportSink;
pub use render::ReportFormat;
pub use sink::{dispatch, DeliveryOutcome, ReportSink};
