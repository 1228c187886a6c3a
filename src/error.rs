use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    /// The source list is empty or unreachable. Aborts the run.
    #[error("Invalid station catalog: {0}")]
    InvalidCatalog(String),

    /// A channel needed by an enabled rule is absent from every record.
    #[error("Station {station} has no '{channel}' channel")]
    ChannelMissing { station: String, channel: String },

    #[error("Station {station} returned no records")]
    EmptyWindow { station: String },

    #[error("Station {station} not found")]
    StationNotFound { station: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Report delivery error: {0}")]
    Delivery(String),
}
