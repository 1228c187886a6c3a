use crate::error::{MonitorError, Result};
use crate::models::StationRecord;
use std::collections::{BTreeMap, BTreeSet};

/// A time-series store holding one table per station.
///
/// Implementations are shared across the evaluation pool, so they must be
/// `Send + Sync` and must not rely on call order.
pub trait DataSource: Send + Sync {
    /// Every table name the store exposes, clean or not
    fn list_tables(&self) -> Result<BTreeSet<String>>;

    /// The `limit` most recent records of `table`, newest first
    fn fetch_window(&self, table: &str, limit: usize) -> Result<Vec<StationRecord>>;
}

/// In-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, Vec<StationRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, records: Vec<StationRecord>) -> Self {
        self.insert(name, records);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, records: Vec<StationRecord>) {
        self.tables.insert(name.into(), records);
    }
}

impl DataSource for MemorySource {
    fn list_tables(&self) -> Result<BTreeSet<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn fetch_window(&self, table: &str, limit: usize) -> Result<Vec<StationRecord>> {
        let records = self
            .tables
            .get(table)
            .ok_or_else(|| MonitorError::StationNotFound {
                station: table.to_string(),
            })?;

        let mut records = records.clone();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_memory_source_newest_first_and_limited() {
        let base = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let records = (0..10)
            .map(|h| StationRecord::new(base + Duration::hours(h)).with_reading("Batt", Some(12.0)))
            .collect();
        let source = MemorySource::new().with_table("clean_apex", records);

        let window = source.fetch_window("clean_apex", 3).unwrap();

        assert_eq!(window.len(), 3);
        assert_eq!(window[0].timestamp, base + Duration::hours(9));
        assert_eq!(window[2].timestamp, base + Duration::hours(7));
    }

    #[test]
    fn test_memory_source_unknown_table() {
        let source = MemorySource::new().with_table("clean_apex", Vec::new());

        assert_eq!(
            source.list_tables().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["clean_apex".to_string()]
        );
        assert!(matches!(
            source.fetch_window("clean_nowhere", 12),
            Err(MonitorError::StationNotFound { .. })
        ));
    }
}
