/// Source naming
pub const DEFAULT_CLEAN_PREFIX: &str = "clean_";
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "DateTime";
pub const DEFAULT_WATER_YEAR_COLUMN: &str = "WaterYr";
pub const SOURCE_FILE_EXTENSION: &str = "csv";

/// Channel names as exported by the station loggers
pub const CHANNEL_BATTERY: &str = "Batt";
pub const CHANNEL_WIND_DIRECTION: &str = "Wind_Dir";
pub const CHANNEL_WIND_SPEED: &str = "Wind_Speed";
pub const CHANNEL_AIR_TEMPERATURE: &str = "Air_Temp";
pub const CHANNEL_SOIL_TEMPERATURE: &str = "Soil_Temperature";
pub const CHANNEL_SOIL_MOISTURE: &str = "Soil_Moisture";
pub const CHANNEL_RELATIVE_HUMIDITY: &str = "RH";

/// Window sizes (records, hourly loggers)
pub const TRANSMISSION_WINDOW: usize = 12;
pub const DAILY_WINDOW: usize = 24;
pub const WEEKLY_WINDOW: usize = 168;

/// Staleness lookbacks
pub const TRANSMISSION_LOOKBACK_HOURS: i64 = 12;
pub const DAILY_LOOKBACK_HOURS: i64 = 0;
pub const WEEKLY_LOOKBACK_HOURS: i64 = 7 * 24;

/// Battery thresholds (volts)
pub const DAILY_BATTERY_THRESHOLD: f64 = 11.5;
pub const WEEKLY_BATTERY_THRESHOLD: f64 = 12.0;

/// Plausible ranges
pub const MAX_WIND_DIRECTION: f64 = 360.0;
pub const THAW_TEMPERATURE: f64 = 2.0;
pub const MIN_AIR_TEMP: f64 = -45.0;
pub const MAX_AIR_TEMP: f64 = 45.0;
pub const MIN_SOIL_TEMP: f64 = -10.0;
pub const MAX_SOIL_TEMP: f64 = 25.0;
pub const MIN_SOIL_MOISTURE: f64 = 0.0;
pub const MAX_SOIL_MOISTURE: f64 = 100.0;
pub const MIN_RELATIVE_HUMIDITY: f64 = 0.0;
pub const MAX_RELATIVE_HUMIDITY: f64 = 100.0;

/// Readings the loggers write for "no value"
pub const ABSENT_MARKERS: [&str; 5] = ["", "null", "none", "nan", "na"];

/// Configuration
pub const DEFAULT_CONFIG_FILE: &str = "wx-check.toml";
pub const ENV_PREFIX: &str = "WXCHECK";
pub const ENV_SEPARATOR: &str = "__";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const IMPLICIT_TLS_SMTP_PORT: u16 = 465;

/// Report rendering
pub const REPORT_CSV_HEADER: [&str; 2] = ["Station", "Issue"];
