//! Forecast collections returned by the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DailyForecast, Mountain, Region};
use crate::storm::StormAnalysis;

/// A mountain together with its daily forecast (empty when the fetch failed)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MountainForecast {
    pub mountain: Mountain,
    pub forecast: Vec<DailyForecast>,
}

impl MountainForecast {
    #[must_use]
    pub fn new(mountain: Mountain, forecast: Vec<DailyForecast>) -> Self {
        Self { mountain, forecast }
    }

    /// Whether forecast data was retrieved for this mountain
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.forecast.is_empty()
    }

    /// Total snowfall over the whole forecast
    #[must_use]
    pub fn total_snowfall(&self) -> f32 {
        self.forecast.iter().map(|d| d.snowfall_inches).sum()
    }

    /// Snowfall over the first `days` forecast days
    #[must_use]
    pub fn snowfall_over(&self, days: usize) -> f32 {
        self.forecast
            .iter()
            .take(days)
            .map(|d| d.snowfall_inches)
            .sum()
    }
}

/// Synthesized summary for all mountains of one region
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegionalForecast {
    pub region: Region,
    pub region_name: String,
    pub generated_at: DateTime<Utc>,
    pub mountains: Vec<MountainForecast>,
    pub storm_analysis: StormAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Elevation;
    use chrono::NaiveDate;

    fn forecast_with(snow: &[f32]) -> MountainForecast {
        let mountain = Mountain {
            id: "stevens".to_string(),
            name: "Stevens Pass".to_string(),
            latitude: 47.745,
            longitude: -121.089,
            elevation: Elevation {
                base: 4061,
                summit: 5845,
            },
            region: Region::Washington,
            subregion: None,
            website: None,
        };
        let start = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let days = snow
            .iter()
            .enumerate()
            .map(|(i, &s)| DailyForecast {
                date: start + chrono::Duration::days(i as i64),
                high_temp_f: 30.0,
                low_temp_f: 20.0,
                snowfall_inches: s,
                precipitation_inches: s / 10.0,
                precipitation_probability: 50,
                wind_speed_mph: 10.0,
                wind_gust_mph: 15.0,
                weather_code: 73,
                conditions: "Moderate snow fall".to_string(),
            })
            .collect();
        MountainForecast::new(mountain, days)
    }

    #[test]
    fn test_snowfall_totals() {
        let forecast = forecast_with(&[2.0, 4.0, 1.0, 0.0]);
        assert!(forecast.has_data());
        assert_eq!(forecast.total_snowfall(), 7.0);
        assert_eq!(forecast.snowfall_over(2), 6.0);
        assert_eq!(forecast.snowfall_over(10), 7.0);
    }

    #[test]
    fn test_empty_forecast() {
        let forecast = forecast_with(&[]);
        assert!(!forecast.has_data());
        assert_eq!(forecast.total_snowfall(), 0.0);
    }
}
