use chrono::{DateTime, Utc};

use crate::models::{CheckProfile, Finding, RuleId, Station, StationWindow, ValueRange};

/// Everything a rule may look at
pub struct RuleContext<'a> {
    pub station: &'a Station,
    pub window: &'a StationWindow,
    pub profile: &'a CheckProfile,
    pub now: DateTime<Utc>,
}

impl RuleContext<'_> {
    fn finding(&self, issue: String) -> Finding {
        Finding::new(self.station.display_name.clone(), issue)
    }
}

pub fn check(rule: RuleId, ctx: &RuleContext) -> Option<Finding> {
    match rule {
        RuleId::Staleness => staleness(ctx),
        RuleId::FrozenChannel => frozen_channels(ctx),
        RuleId::Battery => low_battery(ctx),
        RuleId::WindDirection => wind_direction(ctx),
        RuleId::FrozenWindWithThaw => frozen_wind_with_thaw(ctx),
        RuleId::AirTemperature => {
            let limits = &ctx.profile.limits;
            out_of_range(
                ctx,
                &ctx.profile.channels.air_temperature,
                limits.air_temperature,
                format!(
                    "Air temperature sensor is outside of range + {} to {} celsius",
                    limits.air_temperature.max, limits.air_temperature.min
                ),
            )
        }
        RuleId::SoilTemperature => {
            let limits = &ctx.profile.limits;
            out_of_range(
                ctx,
                &ctx.profile.channels.soil_temperature,
                limits.soil_temperature,
                format!(
                    "Soil temperature sensor is outside of range + {} to {} celsius",
                    limits.soil_temperature.max, limits.soil_temperature.min
                ),
            )
        }
        RuleId::SoilMoisture => {
            let range = ctx.profile.limits.soil_moisture;
            out_of_range(
                ctx,
                &ctx.profile.channels.soil_moisture,
                range,
                format!(
                    "Soil moisture sensor is outside of range {} to {}",
                    range.min, range.max
                ),
            )
        }
        RuleId::RelativeHumidity => {
            let range = ctx.profile.limits.relative_humidity;
            out_of_range(
                ctx,
                &ctx.profile.channels.relative_humidity,
                range,
                format!(
                    "Relative humidity sensor is outside of range {} to {}",
                    range.min, range.max
                ),
            )
        }
    }
}

/// The finding reported when a station is stale or has no records at all
pub fn staleness_finding(station: &Station, profile: &CheckProfile) -> Finding {
    Finding::new(
        station.display_name.clone(),
        profile.staleness.message_for(&station.display_name),
    )
}

/// Newest record older than the profile's reference instant
fn staleness(ctx: &RuleContext) -> Option<Finding> {
    let reference = ctx.profile.staleness.reference(ctx.now);
    if ctx.window.newest().timestamp < reference {
        Some(staleness_finding(ctx.station, ctx.profile))
    } else {
        None
    }
}

/// All channels whose present readings never change, as one finding
fn frozen_channels(ctx: &RuleContext) -> Option<Finding> {
    let frozen: Vec<&str> = ctx
        .window
        .channels()
        .into_iter()
        .filter(|channel| is_frozen(ctx.window, channel))
        .collect();

    if frozen.is_empty() {
        return None;
    }

    Some(ctx.finding(format!(
        "{} {}",
        ctx.profile.frozen_message,
        frozen.join("; ")
    )))
}

/// At least two present readings and every successive difference exactly zero
pub fn is_frozen(window: &StationWindow, channel: &str) -> bool {
    let readings: Vec<f64> = window.readings(channel).collect();
    readings.len() >= 2 && readings.windows(2).all(|pair| pair[1] - pair[0] == 0.0)
}

fn low_battery(ctx: &RuleContext) -> Option<Finding> {
    let threshold = ctx.profile.limits.battery_threshold;
    ctx.window
        .readings(&ctx.profile.channels.battery)
        .any(|volts| volts < threshold)
        .then(|| ctx.finding(format!("Battery is below {} volts", threshold)))
}

// Only the upper bound is checked; negative directions pass through.
fn wind_direction(ctx: &RuleContext) -> Option<Finding> {
    let max = ctx.profile.limits.wind_direction_max;
    ctx.window
        .readings(&ctx.profile.channels.wind_direction)
        .any(|degrees| degrees > max)
        .then(|| {
            ctx.finding(format!(
                "Wind direction sensor is outside of range 0-{}",
                max
            ))
        })
}

/// A calm anemometer while every air temperature is above thaw
fn frozen_wind_with_thaw(ctx: &RuleContext) -> Option<Finding> {
    let channels = &ctx.profile.channels;
    let thaw = ctx.profile.limits.thaw_temperature;

    let wind: Vec<f64> = ctx.window.readings(&channels.wind_speed).collect();
    let air: Vec<f64> = ctx.window.readings(&channels.air_temperature).collect();

    let calm = !wind.is_empty() && wind.iter().all(|speed| *speed == 0.0);
    let thawed = !air.is_empty() && air.iter().all(|temp| *temp > thaw);

    (calm && thawed).then(|| {
        ctx.finding(
            "Wind speed sensor is faulty (all values are 0 despite above-freezing temp)"
                .to_string(),
        )
    })
}

fn out_of_range(
    ctx: &RuleContext,
    channel: &str,
    range: ValueRange,
    issue: String,
) -> Option<Finding> {
    ctx.window
        .readings(channel)
        .any(|value| !range.contains(value))
        .then(|| ctx.finding(issue))
}
