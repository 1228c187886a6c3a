use crate::error::{MonitorError, Result};
use crate::models::{CheckProfile, Finding, Station, StationWindow};
use crate::processors::rules::{self, RuleContext};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Evaluates a profile's rules against station windows.
///
/// The clock is fixed at construction so every station in a run is judged
/// against the same instant.
pub struct RuleEngine<'a> {
    profile: &'a CheckProfile,
    now: DateTime<Utc>,
}

impl<'a> RuleEngine<'a> {
    pub fn new(profile: &'a CheckProfile, now: DateTime<Utc>) -> Self {
        Self { profile, now }
    }

    /// Run every enabled rule, in evaluation order, without short-circuiting.
    ///
    /// Fails with [`MonitorError::ChannelMissing`] before any rule runs if a
    /// channel an enabled rule depends on is absent from the whole window.
    pub fn evaluate(&self, station: &Station, window: &StationWindow) -> Result<Vec<Finding>> {
        self.check_schema(station, window)?;

        let ctx = RuleContext {
            station,
            window,
            profile: self.profile,
            now: self.now,
        };

        let findings: Vec<Finding> = self
            .profile
            .enabled_rules()
            .filter_map(|rule| {
                let finding = rules::check(rule, &ctx);
                if finding.is_some() {
                    debug!(station = %station.id, rule = %rule, "rule fired");
                }
                finding
            })
            .collect();

        Ok(findings)
    }

    /// Every channel required by an enabled rule must appear in at least one record
    pub fn check_schema(&self, station: &Station, window: &StationWindow) -> Result<()> {
        match self
            .profile
            .required_channels()
            .into_iter()
            .find(|channel| !window.has_channel(channel))
        {
            Some(channel) => Err(MonitorError::ChannelMissing {
                station: station.id.clone(),
                channel: channel.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Finding for a station that returned no records at all
    pub fn staleness_finding(&self, station: &Station) -> Finding {
        rules::staleness_finding(station, self.profile)
    }
}
