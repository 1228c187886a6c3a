use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// One timestamped observation from a station logger.
///
/// Channel order is the source column order. A channel mapped to `None` was
/// present in the schema but carried no reading for this timestamp; absence is
/// never read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub timestamp: DateTime<Utc>,
    pub water_year: Option<i32>,
    pub readings: IndexMap<String, Option<f64>>,
}

impl StationRecord {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            water_year: None,
            readings: IndexMap::new(),
        }
    }

    pub fn with_water_year(mut self, water_year: i32) -> Self {
        self.water_year = Some(water_year);
        self
    }

    pub fn with_reading(mut self, channel: impl Into<String>, value: Option<f64>) -> Self {
        self.readings.insert(channel.into(), value);
        self
    }

    /// Reading for a channel; non-finite values count as absent
    pub fn reading(&self, channel: &str) -> Option<f64> {
        self.readings
            .get(channel)
            .copied()
            .flatten()
            .filter(|value| value.is_finite())
    }

    pub fn has_channel(&self, channel: &str) -> bool {
        self.readings.contains_key(channel)
    }
}

/// The most recent records of one station, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct StationWindow {
    records: Vec<StationRecord>,
}

impl StationWindow {
    /// Build a window of at most `capacity` records. Records are reordered
    /// newest-first; zero records is an [`MonitorError::EmptyWindow`].
    pub fn new(station: &str, mut records: Vec<StationRecord>, capacity: usize) -> Result<Self> {
        if records.is_empty() {
            return Err(MonitorError::EmptyWindow {
                station: station.to_string(),
            });
        }

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(capacity.max(1));

        Ok(Self { records })
    }

    pub fn newest(&self) -> &StationRecord {
        &self.records[0]
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn has_channel(&self, channel: &str) -> bool {
        self.records.iter().any(|record| record.has_channel(channel))
    }

    /// Channel names in first-seen order, newest record first
    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = Vec::new();
        for record in &self.records {
            for channel in record.readings.keys() {
                if !channels.contains(&channel.as_str()) {
                    channels.push(channel.as_str());
                }
            }
        }
        channels
    }

    /// Present readings of a channel, newest first
    pub fn readings<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.records
            .iter()
            .filter_map(move |record| record.reading(channel))
    }
}
