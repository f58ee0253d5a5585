//! Daily forecast record for a single mountain

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day at a mountain's summit elevation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// Local calendar date at the mountain
    pub date: NaiveDate,
    /// Daily high in Fahrenheit
    pub high_temp_f: f32,
    /// Daily low in Fahrenheit
    pub low_temp_f: f32,
    /// Snowfall in inches
    pub snowfall_inches: f32,
    /// Total precipitation (liquid equivalent) in inches
    pub precipitation_inches: f32,
    /// Maximum precipitation probability (0-100)
    pub precipitation_probability: u8,
    /// Maximum sustained wind in mph
    pub wind_speed_mph: f32,
    /// Maximum gust in mph
    pub wind_gust_mph: f32,
    /// WMO weather interpretation code
    pub weather_code: u8,
    /// Human-readable description of weather conditions
    pub conditions: String,
}

impl DailyForecast {
    /// Clear to partly cloudy skies
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.weather_code <= 2
    }

    /// Precipitation falling while too warm for dry snow
    #[must_use]
    pub fn has_rain_risk(&self) -> bool {
        self.precipitation_inches >= 0.1 && self.high_temp_f > 34.0
    }
}
