//! Open-Meteo daily forecast client
//!
//! Requests summit-elevation daily aggregates in US units and converts them
//! into [`DailyForecast`] records. Transient failures are retried with
//! exponential backoff by the middleware stack.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::ForecastProvider;
use crate::config::WeatherConfig;
use crate::error::ForecastError;
use crate::models::{DailyForecast, Mountain};

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,snowfall_sum,precipitation_sum,precipitation_probability_max,wind_speed_10m_max,wind_gusts_10m_max,weather_code";

pub struct OpenMeteoProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OpenMeteoProvider {
    /// Create a new client from the weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skiforecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn forecast_url(&self, mountain: &Mountain, days: u8) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&elevation={:.0}&daily={}&temperature_unit=fahrenheit&wind_speed_unit=mph&precipitation_unit=inch&timezone=auto&forecast_days={}",
            self.base_url,
            mountain.latitude,
            mountain.longitude,
            mountain.elevation.summit_meters(),
            DAILY_FIELDS,
            days
        )
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    #[instrument(skip(self, mountain), fields(mountain = %mountain.id))]
    async fn fetch_forecast(&self, mountain: &Mountain, days: u8) -> Result<Vec<DailyForecast>> {
        let start_time = Instant::now();
        let url = self.forecast_url(mountain, days);
        debug!("OpenMeteo API request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Forecast request failed for {}", mountain.name))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::api(format!(
                "OpenMeteo returned {} for {}",
                status, mountain.id
            ))
            .into());
        }

        let body: ForecastResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse OpenMeteo forecast response")?;

        let forecast = body.into_daily_forecasts();
        let total_duration = start_time.elapsed();

        info!(
            "Retrieved {} forecast days for {} in {:.3}s",
            forecast.len(),
            mountain.name,
            total_duration.as_secs_f64()
        );

        if total_duration.as_secs() > 5 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(forecast)
    }

    fn name(&self) -> &'static str {
        "open-meteo"
    }
}

/// Forecast response from the `OpenMeteo` API
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub timezone: Option<String>,
    pub daily: Option<DailyData>,
}

/// Daily aggregates from `OpenMeteo`; every series may contain nulls
#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Option<Vec<Option<f32>>>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Option<Vec<Option<f32>>>,
    #[serde(rename = "snowfall_sum")]
    pub snowfall: Option<Vec<Option<f32>>>,
    #[serde(rename = "precipitation_sum")]
    pub precipitation: Option<Vec<Option<f32>>>,
    #[serde(rename = "precipitation_probability_max")]
    pub precipitation_probability: Option<Vec<Option<f32>>>,
    #[serde(rename = "wind_speed_10m_max")]
    pub wind_speed: Option<Vec<Option<f32>>>,
    #[serde(rename = "wind_gusts_10m_max")]
    pub wind_gusts: Option<Vec<Option<f32>>>,
    pub weather_code: Option<Vec<Option<u8>>>,
}

fn value_at<T: Copy>(series: Option<&Vec<Option<T>>>, index: usize) -> Option<T> {
    series.and_then(|values| values.get(index).copied().flatten())
}

impl ForecastResponse {
    /// Convert the daily series into records, skipping days with unparseable dates
    #[must_use]
    pub fn into_daily_forecasts(self) -> Vec<DailyForecast> {
        let Some(daily) = self.daily else {
            return Vec::new();
        };

        daily
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, raw_date)| {
                let date = match NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") {
                    Ok(date) => date,
                    Err(e) => {
                        warn!("Skipping forecast day with invalid date '{}': {}", raw_date, e);
                        return None;
                    }
                };

                let weather_code = value_at(daily.weather_code.as_ref(), i).unwrap_or(0);
                let probability = value_at(daily.precipitation_probability.as_ref(), i)
                    .unwrap_or(0.0)
                    .clamp(0.0, 100.0)
                    .round() as u8;

                Some(DailyForecast {
                    date,
                    high_temp_f: value_at(daily.temperature_max.as_ref(), i).unwrap_or(0.0),
                    low_temp_f: value_at(daily.temperature_min.as_ref(), i).unwrap_or(0.0),
                    snowfall_inches: value_at(daily.snowfall.as_ref(), i).unwrap_or(0.0),
                    precipitation_inches: value_at(daily.precipitation.as_ref(), i)
                        .unwrap_or(0.0),
                    precipitation_probability: probability,
                    wind_speed_mph: value_at(daily.wind_speed.as_ref(), i).unwrap_or(0.0),
                    wind_gust_mph: value_at(daily.wind_gusts.as_ref(), i).unwrap_or(0.0),
                    weather_code,
                    conditions: weather_code_to_description(weather_code).to_string(),
                })
            })
            .collect()
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}
