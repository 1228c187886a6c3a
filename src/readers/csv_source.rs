use crate::error::{MonitorError, Result};
use crate::models::StationRecord;
use crate::readers::source::DataSource;
use crate::utils::constants::{
    ABSENT_MARKERS, DEFAULT_TIMESTAMP_COLUMN, DEFAULT_WATER_YEAR_COLUMN, SOURCE_FILE_EXTENSION,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A directory of `<table>.csv` exports, one file per source table.
///
/// Every column other than the timestamp and water-year columns is read as a
/// numeric channel, in file order.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
    timestamp_column: String,
    water_year_column: String,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            water_year_column: DEFAULT_WATER_YEAR_COLUMN.to_string(),
        }
    }

    pub fn with_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = column.into();
        self
    }

    pub fn with_water_year_column(mut self, column: impl Into<String>) -> Self {
        self.water_year_column = column.into();
        self
    }

    fn table_path(&self, table: &str) -> Result<PathBuf> {
        if table.is_empty() || table.contains(['/', '\\']) || table.contains("..") {
            return Err(MonitorError::InvalidFormat(format!(
                "Invalid table name: '{}'",
                table
            )));
        }
        Ok(self
            .dir
            .join(format!("{}.{}", table, SOURCE_FILE_EXTENSION)))
    }

    /// Read every record of one table file, in file order
    pub fn read_table(&self, table: &str) -> Result<Vec<StationRecord>> {
        let path = self.table_path(table)?;
        if !path.is_file() {
            return Err(MonitorError::StationNotFound {
                station: table.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let headers = reader.headers()?.clone();
        let timestamp_idx = headers
            .iter()
            .position(|h| h == self.timestamp_column)
            .ok_or_else(|| {
                MonitorError::InvalidFormat(format!(
                    "{}: no '{}' column",
                    path.display(),
                    self.timestamp_column
                ))
            })?;
        let water_year_idx = headers.iter().position(|h| h == self.water_year_column);

        let channels: Vec<(usize, &str)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != timestamp_idx && Some(*idx) != water_year_idx)
            .collect();

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let line = result?;

            let timestamp = parse_timestamp(line.get(timestamp_idx).unwrap_or(""))?;
            let mut record = StationRecord::new(timestamp);

            if let Some(idx) = water_year_idx {
                let raw = line.get(idx).unwrap_or("");
                if !is_absent(raw) {
                    let water_year = raw.parse::<i32>().map_err(|_| {
                        MonitorError::InvalidFormat(format!(
                            "{} row {}: invalid water year '{}'",
                            table,
                            row + 1,
                            raw
                        ))
                    })?;
                    record = record.with_water_year(water_year);
                }
            }

            for (idx, channel) in &channels {
                let value = parse_reading(line.get(*idx).unwrap_or("")).map_err(|raw| {
                    MonitorError::InvalidFormat(format!(
                        "{} row {}: invalid {} reading '{}'",
                        table,
                        row + 1,
                        channel,
                        raw
                    ))
                })?;
                record = record.with_reading(*channel, value);
            }

            records.push(record);
        }

        debug!(table = %table, records = records.len(), "table read");
        Ok(records)
    }
}

impl DataSource for CsvDirectorySource {
    fn list_tables(&self) -> Result<BTreeSet<String>> {
        let mut tables = BTreeSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tables.insert(stem.to_string());
            }
        }
        Ok(tables)
    }

    fn fetch_window(&self, table: &str, limit: usize) -> Result<Vec<StationRecord>> {
        let mut records = self.read_table(table)?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        Ok(records)
    }
}

fn is_absent(raw: &str) -> bool {
    let raw = raw.trim();
    ABSENT_MARKERS
        .iter()
        .any(|marker| raw.eq_ignore_ascii_case(marker))
}

/// `Ok(None)` for absent markers, `Err(raw)` for anything non-numeric
fn parse_reading(raw: &str) -> std::result::Result<Option<f64>, String> {
    if is_absent(raw) {
        return Ok(None);
    }
    raw.trim()
        .parse::<f64>()
        .map(|value| Some(value).filter(|v| v.is_finite()))
        .map_err(|_| raw.to_string())
}

/// RFC 3339, or a naive timestamp taken as UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let mut last_err = None;
    for format in NAIVE_TIMESTAMP_FORMATS {
        match NaiveDateTime::parse_from_str(raw, format) {
            Ok(naive) => return Ok(Utc.from_utc_datetime(&naive)),
            Err(e) => last_err = Some(e),
        }
    }

    match last_err {
        Some(e) => Err(MonitorError::DateParse(e)),
        None => Err(MonitorError::InvalidFormat(format!(
            "Invalid timestamp: '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_table(dir: &TempDir, name: &str, content: &str) {
        let mut file = fs::File::create(dir.path().join(format!("{}.csv", name))).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 10, 1, 13, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-10-01 13:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-01T13:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-01T13:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-10-01T06:00:00-07:00").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_absent_markers() {
        assert_eq!(parse_reading(""), Ok(None));
        assert_eq!(parse_reading("NULL"), Ok(None));
        assert_eq!(parse_reading("NaN"), Ok(None));
        assert_eq!(parse_reading(" 0 "), Ok(Some(0.0)));
        assert_eq!(parse_reading("12.4"), Ok(Some(12.4)));
        assert_eq!(parse_reading("broken"), Err("broken".to_string()));
    }

    #[test]
    fn test_list_tables() {
        let dir = TempDir::new().unwrap();
        write_table(&dir, "clean_apex", "DateTime,Batt\n");
        write_table(&dir, "raw_apex", "DateTime,Batt\n");
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let source = CsvDirectorySource::new(dir.path());
        let tables: Vec<String> = source.list_tables().unwrap().into_iter().collect();

        assert_eq!(tables, vec!["clean_apex", "raw_apex"]);
    }

    #[test]
    fn test_fetch_window() {
        let dir = TempDir::new().unwrap();
        write_table(
            &dir,
            "clean_apex",
            "DateTime,WaterYr,Batt,RH,Snow_Depth\n\
             2024-10-01 10:00:00,2025,12.5,80.1,\n\
             2024-10-01 12:00:00,2025,12.4,81.0,NaN\n\
             2024-10-01 11:00:00,2025,12.6,NULL,\n",
        );

        let source = CsvDirectorySource::new(dir.path());
        let records = source.fetch_window("clean_apex", 2).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].timestamp,
            Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(records[0].water_year, Some(2025));
        assert_eq!(records[0].reading("Batt"), Some(12.4));
        assert_eq!(records[1].reading("RH"), None);
        assert!(records[1].has_channel("RH"));
        assert!(records[0].has_channel("Snow_Depth"));
        assert!(!records[0].has_channel("WaterYr"));
        assert!(!records[0].has_channel("DateTime"));
        assert_eq!(
            records[0].readings.keys().collect::<Vec<_>>(),
            vec!["Batt", "RH", "Snow_Depth"]
        );
    }

    #[test]
    fn test_custom_columns() {
        let dir = TempDir::new().unwrap();
        write_table(&dir, "clean_apex", "time,Batt\n2024-10-01T00:00:00Z,12.5\n");

        let source = CsvDirectorySource::new(dir.path()).with_timestamp_column("time");
        let records = source.fetch_window("clean_apex", 24).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].water_year, None);
    }

    #[test]
    fn test_fetch_errors() {
        let dir = TempDir::new().unwrap();
        write_table(&dir, "clean_notime", "Batt,RH\n12.0,50\n");
        write_table(&dir, "clean_garbled", "DateTime,Batt\n2024-10-01 00:00:00,twelve\n");
        let source = CsvDirectorySource::new(dir.path());

        assert!(matches!(
            source.fetch_window("clean_missing", 24),
            Err(MonitorError::StationNotFound { .. })
        ));
        assert!(matches!(
            source.fetch_window("clean_notime", 24),
            Err(MonitorError::InvalidFormat(_))
        ));
        assert!(matches!(
            source.fetch_window("clean_garbled", 24),
            Err(MonitorError::InvalidFormat(_))
        ));
        assert!(matches!(
            source.fetch_window("../etc/passwd", 24),
            Err(MonitorError::InvalidFormat(_))
        ));
    }
}
