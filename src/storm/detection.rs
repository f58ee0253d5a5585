//! Storm detection across a region's mountains
//!
//! A storm day is a date where the deepest mountain sees at least
//! [`STORM_DAY_MAX_INCHES`] or the regional mean reaches
//! [`STORM_DAY_MEAN_INCHES`]. Consecutive storm days form one storm.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{DailyForecast, MountainForecast};

pub const STORM_DAY_MAX_INCHES: f32 = 2.0;
pub const STORM_DAY_MEAN_INCHES: f32 = 1.0;

/// Storm size by its deepest mountain total
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StormIntensity {
    /// under 6 inches
    Light,
    /// 6 to 12 inches
    Moderate,
    /// 12 to 24 inches
    Heavy,
    /// 24 inches or more
    Major,
}

impl StormIntensity {
    #[must_use]
    pub fn from_total(inches: f32) -> Self {
        match inches {
            s if s >= 24.0 => StormIntensity::Major,
            s if s >= 12.0 => StormIntensity::Heavy,
            s if s >= 6.0 => StormIntensity::Moderate,
            _ => StormIntensity::Light,
        }
    }
}

impl std::fmt::Display for StormIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StormIntensity::Light => write!(f, "Light"),
            StormIntensity::Moderate => write!(f, "Moderate"),
            StormIntensity::Heavy => write!(f, "Heavy"),
            StormIntensity::Major => write!(f, "Major"),
        }
    }
}

/// Snowfall total for one mountain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountainSnowTotal {
    pub mountain_id: String,
    pub mountain_name: String,
    pub inches: f32,
}

/// A run of consecutive storm days
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storm {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
    /// Day with the highest regional mean snowfall
    pub peak_date: NaiveDate,
    pub intensity: StormIntensity,
    /// Deepest mountain total over the storm
    pub max_total_inches: f32,
    /// Mean total over mountains with data
    pub average_total_inches: f32,
    /// Per-mountain totals, deepest first
    pub mountain_totals: Vec<MountainSnowTotal>,
    pub max_wind_gust_mph: f32,
    /// Some mountain sees precipitation above freezing during the storm
    pub rain_risk: bool,
    /// 0.0-1.0, decreasing with lead time
    pub confidence: f32,
    pub description: String,
}

/// Forecast confidence based on days ahead
#[must_use]
pub fn confidence_for_lead(lead_days: i64) -> f32 {
    match lead_days {
        i64::MIN..=0 => 0.95,
        1 => 0.90,
        2 => 0.85,
        3..=4 => 0.75,
        5..=7 => 0.65,
        _ => 0.50,
    }
}

type DayEntries<'a> = Vec<(usize, &'a DailyForecast)>;

/// Group every mountain's records by date
fn by_date(forecasts: &[MountainForecast]) -> BTreeMap<NaiveDate, DayEntries<'_>> {
    let mut days: BTreeMap<NaiveDate, DayEntries<'_>> = BTreeMap::new();
    for (index, mountain_forecast) in forecasts.iter().enumerate() {
        for day in &mountain_forecast.forecast {
            days.entry(day.date).or_default().push((index, day));
        }
    }
    days
}

fn mean_snowfall(entries: &DayEntries<'_>) -> f32 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|(_, d)| d.snowfall_inches).sum::<f32>() / entries.len() as f32
}

fn max_snowfall(entries: &DayEntries<'_>) -> f32 {
    entries
        .iter()
        .map(|(_, d)| d.snowfall_inches)
        .fold(0.0f32, f32::max)
}

fn is_storm_day(entries: &DayEntries<'_>) -> bool {
    max_snowfall(entries) >= STORM_DAY_MAX_INCHES || mean_snowfall(entries) >= STORM_DAY_MEAN_INCHES
}

/// Find every storm in the merged forecasts, in date order
#[must_use]
pub fn detect_storms(forecasts: &[MountainForecast]) -> Vec<Storm> {
    let days = by_date(forecasts);
    let Some(first_date) = days.keys().next().copied() else {
        return Vec::new();
    };

    let mut runs: Vec<Vec<(NaiveDate, &DayEntries<'_>)>> = Vec::new();
    for (date, entries) in &days {
        if !is_storm_day(entries) {
            continue;
        }
        let extends_run = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|(prev, _)| *prev + Duration::days(1) == *date);

        if !extends_run {
            runs.push(Vec::new());
        }
        if let Some(run) = runs.last_mut() {
            run.push((*date, entries));
        }
    }

    runs.iter()
        .filter_map(|run| build_storm(run, forecasts, first_date))
        .collect()
}

fn build_storm(
    run: &[(NaiveDate, &DayEntries<'_>)],
    forecasts: &[MountainForecast],
    first_date: NaiveDate,
) -> Option<Storm> {
    let (start_date, _) = run.first()?;
    let (end_date, _) = run.last()?;

    let mut totals: BTreeMap<usize, f32> = BTreeMap::new();
    let mut max_wind_gust_mph = 0.0f32;
    let mut rain_risk = false;
    let mut peak: Option<(NaiveDate, f32)> = None;

    for (date, entries) in run {
        for (index, day) in entries.iter() {
            *totals.entry(*index).or_insert(0.0) += day.snowfall_inches;
            max_wind_gust_mph = max_wind_gust_mph.max(day.wind_gust_mph);
            rain_risk |= day.has_rain_risk();
        }
        let mean = mean_snowfall(entries);
        if peak.is_none_or(|(_, best)| mean > best) {
            peak = Some((*date, mean));
        }
    }

    let mut mountain_totals: Vec<MountainSnowTotal> = totals
        .iter()
        .map(|(index, inches)| MountainSnowTotal {
            mountain_id: forecasts[*index].mountain.id.clone(),
            mountain_name: forecasts[*index].mountain.name.clone(),
            inches: *inches,
        })
        .collect();
    mountain_totals.sort_by(|a, b| {
        b.inches
            .partial_cmp(&a.inches)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top = mountain_totals.first()?;
    let max_total_inches = top.inches;
    let average_total_inches =
        mountain_totals.iter().map(|t| t.inches).sum::<f32>() / mountain_totals.len() as f32;
    let intensity = StormIntensity::from_total(max_total_inches);
    let duration_days = u32::try_from(run.len()).unwrap_or(u32::MAX);
    let lead_days = (*start_date - first_date).num_days();

    let window = if start_date == end_date {
        format!("on {}", start_date.format("%a %b %-d"))
    } else {
        format!(
            "{} to {}",
            start_date.format("%a %b %-d"),
            end_date.format("%a %b %-d")
        )
    };
    let mut description = format!(
        "{} storm {}: up to {:.0}\" at {}",
        intensity, window, max_total_inches, top.mountain_name
    );
    if rain_risk {
        description.push_str(", rain possible at lower elevations");
    }

    Some(Storm {
        start_date: *start_date,
        end_date: *end_date,
        duration_days,
        peak_date: peak.map_or(*start_date, |(date, _)| date),
        intensity,
        max_total_inches,
        average_total_inches,
        mountain_totals,
        max_wind_gust_mph,
        rain_risk,
        confidence: confidence_for_lead(lead_days),
        description,
    })
}
