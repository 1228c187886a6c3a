use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::constants::*;

/// Report cadence. Each kind owns one [`CheckProfile`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Transmission,
    Daily,
    Weekly,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Transmission => "transmission",
            ProfileKind::Daily => "daily",
            ProfileKind::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifiers of the anomaly rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Staleness,
    FrozenChannel,
    Battery,
    WindDirection,
    FrozenWindWithThaw,
    AirTemperature,
    SoilTemperature,
    SoilMoisture,
    RelativeHumidity,
}

impl RuleId {
    /// Fixed evaluation order, independent of how a profile lists its rules
    pub const EVALUATION_ORDER: [RuleId; 9] = [
        RuleId::Staleness,
        RuleId::FrozenChannel,
        RuleId::Battery,
        RuleId::WindDirection,
        RuleId::FrozenWindWithThaw,
        RuleId::AirTemperature,
        RuleId::SoilTemperature,
        RuleId::SoilMoisture,
        RuleId::RelativeHumidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::Staleness => "staleness",
            RuleId::FrozenChannel => "frozen_channel",
            RuleId::Battery => "battery",
            RuleId::WindDirection => "wind_direction",
            RuleId::FrozenWindWithThaw => "frozen_wind_with_thaw",
            RuleId::AirTemperature => "air_temperature",
            RuleId::SoilTemperature => "soil_temperature",
            RuleId::SoilMoisture => "soil_moisture",
            RuleId::RelativeHumidity => "relative_humidity",
        }
    }

    /// Channels this rule cannot run without
    pub fn required_channels<'a>(&self, channels: &'a ChannelNames) -> Vec<&'a str> {
        match self {
            RuleId::Staleness | RuleId::FrozenChannel => Vec::new(),
            RuleId::Battery => vec![channels.battery.as_str()],
            RuleId::WindDirection => vec![channels.wind_direction.as_str()],
            RuleId::FrozenWindWithThaw => vec![
                channels.wind_speed.as_str(),
                channels.air_temperature.as_str(),
            ],
            RuleId::AirTemperature => vec![channels.air_temperature.as_str()],
            RuleId::SoilTemperature => vec![channels.soil_temperature.as_str()],
            RuleId::SoilMoisture => vec![channels.soil_moisture.as_str()],
            RuleId::RelativeHumidity => vec![channels.relative_humidity.as_str()],
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
}

impl Granularity {
    /// Floor a timestamp to the start of its hour or day
    pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let hour = match self {
            Granularity::Hour => ts.hour(),
            Granularity::Day => 0,
        };
        ts.date_naive()
            .and_hms_opt(hour, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(ts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StalenessPolicy {
    #[validate(range(min = 0, max = 87_840))]
    pub lookback_hours: i64,
    pub granularity: Granularity,
    /// `{station}` is replaced by the station display name
    #[validate(length(min = 1))]
    pub message: String,
}

impl StalenessPolicy {
    /// Oldest acceptable timestamp for the newest record
    ///
    /// Saturates at the earliest representable instant instead of overflowing.
    pub fn reference(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let oldest = Duration::try_hours(self.lookback_hours)
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.granularity.truncate(oldest)
    }

    pub fn message_for(&self, display_name: &str) -> String {
        self.message.replace("{station}", display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_limits"))]
pub struct Limits {
    pub battery_threshold: f64,
    pub wind_direction_max: f64,
    pub thaw_temperature: f64,
    pub air_temperature: ValueRange,
    pub soil_temperature: ValueRange,
    pub soil_moisture: ValueRange,
    pub relative_humidity: ValueRange,
}

fn validate_limits(limits: &Limits) -> std::result::Result<(), ValidationError> {
    let ranges = [
        limits.air_temperature,
        limits.soil_temperature,
        limits.soil_moisture,
        limits.relative_humidity,
    ];
    if ranges.iter().any(|range| range.min > range.max) {
        return Err(ValidationError::new("range_min_above_max"));
    }
    Ok(())
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            battery_threshold: DAILY_BATTERY_THRESHOLD,
            wind_direction_max: MAX_WIND_DIRECTION,
            thaw_temperature: THAW_TEMPERATURE,
            air_temperature: ValueRange::new(MIN_AIR_TEMP, MAX_AIR_TEMP),
            soil_temperature: ValueRange::new(MIN_SOIL_TEMP, MAX_SOIL_TEMP),
            soil_moisture: ValueRange::new(MIN_SOIL_MOISTURE, MAX_SOIL_MOISTURE),
            relative_humidity: ValueRange::new(MIN_RELATIVE_HUMIDITY, MAX_RELATIVE_HUMIDITY),
        }
    }
}

/// Column names the rules read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNames {
    pub battery: String,
    pub wind_direction: String,
    pub wind_speed: String,
    pub air_temperature: String,
    pub soil_temperature: String,
    pub soil_moisture: String,
    pub relative_humidity: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            battery: CHANNEL_BATTERY.to_string(),
            wind_direction: CHANNEL_WIND_DIRECTION.to_string(),
            wind_speed: CHANNEL_WIND_SPEED.to_string(),
            air_temperature: CHANNEL_AIR_TEMPERATURE.to_string(),
            soil_temperature: CHANNEL_SOIL_TEMPERATURE.to_string(),
            soil_moisture: CHANNEL_SOIL_MOISTURE.to_string(),
            relative_humidity: CHANNEL_RELATIVE_HUMIDITY.to_string(),
        }
    }
}

/// Sources skipped by a profile: legacy, archived, test and duplicate-hardware
/// tables, and stations without a satellite link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
}

impl ExclusionSet {
    pub fn excludes(&self, source_name: &str) -> bool {
        self.exact.iter().any(|name| name == source_name)
            || self
                .contains
                .iter()
                .any(|fragment| source_name.contains(fragment.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub subject: String,
    /// Intro paragraph of the email body (CSV reports only)
    #[serde(default)]
    pub notice: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CheckProfile {
    pub kind: ProfileKind,

    #[validate(range(min = 1, max = 10000))]
    pub window_size: usize,

    #[validate(nested)]
    pub staleness: StalenessPolicy,

    #[validate(length(min = 1))]
    pub rules: Vec<RuleId>,

    #[validate(nested)]
    pub limits: Limits,

    pub channels: ChannelNames,

    pub exclusions: ExclusionSet,

    /// Leading text of the combined frozen-channel finding
    #[validate(length(min = 1))]
    pub frozen_message: String,

    /// Whether a run with no findings still produces a report
    pub emit_empty_report: bool,

    pub dispatch: Dispatch,
}

impl CheckProfile {
    /// Near-real-time outage check: staleness only
    pub fn transmission() -> Self {
        Self {
            kind: ProfileKind::Transmission,
            window_size: TRANSMISSION_WINDOW,
            staleness: StalenessPolicy {
                lookback_hours: TRANSMISSION_LOOKBACK_HOURS,
                granularity: Granularity::Hour,
                message: "Satellite data has not been transmitting for at least 12 hours for {station}"
                    .to_string(),
            },
            rules: vec![RuleId::Staleness],
            limits: Limits::default(),
            channels: ChannelNames::default(),
            exclusions: ExclusionSet {
                exact: [1, 2, 4, 7, 8, 10]
                    .iter()
                    .map(|n| format!("{}steph{}", DEFAULT_CLEAN_PREFIX, n))
                    .collect(),
                contains: [
                    "legacy_ontree",
                    "russellmain",
                    "machmell",
                    "mountmaya",
                    "eastbuxton_archive",
                    "_v2",
                    "placeglacier",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
            frozen_message: "Data is all the same for sensors:".to_string(),
            emit_empty_report: false,
            dispatch: Dispatch {
                subject: "Alert transmission issue - last 12 hours".to_string(),
                notice: String::new(),
                recipients: Vec::new(),
            },
        }
    }

    /// Last 24 records against the full rule set
    pub fn daily() -> Self {
        Self {
            kind: ProfileKind::Daily,
            window_size: DAILY_WINDOW,
            staleness: StalenessPolicy {
                lookback_hours: DAILY_LOOKBACK_HOURS,
                granularity: Granularity::Day,
                message: "Satellite data has not been transmitting for more than a day".to_string(),
            },
            rules: RuleId::EVALUATION_ORDER.to_vec(),
            limits: Limits::default(),
            channels: ChannelNames::default(),
            exclusions: ExclusionSet {
                exact: Vec::new(),
                contains: vec!["legacy_ontree".to_string()],
            },
            frozen_message: "Data is all the same for sensors:".to_string(),
            emit_empty_report: true,
            dispatch: Dispatch {
                subject: "Hydromet daily report".to_string(),
                notice: "This is a daily automated message about the current state of the \
                         station data for the last 24 hours."
                    .to_string(),
                recipients: Vec::new(),
            },
        }
    }

    /// Last 168 records against a reduced rule set
    pub fn weekly() -> Self {
        Self {
            kind: ProfileKind::Weekly,
            window_size: WEEKLY_WINDOW,
            staleness: StalenessPolicy {
                lookback_hours: WEEKLY_LOOKBACK_HOURS,
                granularity: Granularity::Day,
                message: "Satellite data has not been transmitting for more than a week"
                    .to_string(),
            },
            rules: vec![
                RuleId::Staleness,
                RuleId::FrozenChannel,
                RuleId::Battery,
                RuleId::WindDirection,
                RuleId::RelativeHumidity,
            ],
            limits: Limits {
                battery_threshold: WEEKLY_BATTERY_THRESHOLD,
                ..Limits::default()
            },
            channels: ChannelNames::default(),
            exclusions: ExclusionSet {
                exact: Vec::new(),
                contains: vec![
                    "legacy_ontree".to_string(),
                    "eastbuxton_archive".to_string(),
                    "_v2".to_string(),
                ],
            },
            frozen_message: "Data is all the same for the last week for sensors:".to_string(),
            emit_empty_report: true,
            dispatch: Dispatch {
                subject: "Hydromet weekly report".to_string(),
                notice: "This is a weekly automated message about the current state of the \
                         station data for the last 7 days."
                    .to_string(),
                recipients: Vec::new(),
            },
        }
    }

    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Transmission => Self::transmission(),
            ProfileKind::Daily => Self::daily(),
            ProfileKind::Weekly => Self::weekly(),
        }
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        self.rules.contains(&rule)
    }

    /// Enabled rules in evaluation order
    pub fn enabled_rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        RuleId::EVALUATION_ORDER
            .into_iter()
            .filter(|rule| self.is_enabled(*rule))
    }

    /// Channels every window must carry for this profile, deduplicated
    pub fn required_channels(&self) -> Vec<&str> {
        let mut required: Vec<&str> = Vec::new();
        for rule in self.enabled_rules() {
            for channel in rule.required_channels(&self.channels) {
                if !required.contains(&channel) {
                    required.push(channel);
                }
            }
        }
        required
    }
}

/// One profile per cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileSet {
    #[validate(nested)]
    pub transmission: CheckProfile,
    #[validate(nested)]
    pub daily: CheckProfile,
    #[validate(nested)]
    pub weekly: CheckProfile,
}

impl ProfileSet {
    pub fn get(&self, kind: ProfileKind) -> &CheckProfile {
        match kind {
            ProfileKind::Transmission => &self.transmission,
            ProfileKind::Daily => &self.daily,
            ProfileKind::Weekly => &self.weekly,
        }
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            transmission: CheckProfile::transmission(),
            daily: CheckProfile::daily(),
            weekly: CheckProfile::weekly(),
        }
    }
}
