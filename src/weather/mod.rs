//! Weather forecast providers
//!
//! [`ForecastProvider`] is the seam between the aggregation pipeline and the
//! upstream weather API; [`open_meteo::OpenMeteoProvider`] is the production
//! implementation.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DailyForecast, Mountain};

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

/// Number of days fetched per mountain
pub const FORECAST_DAYS: u8 = 7;

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch `days` daily forecast records for a mountain, oldest first
    async fn fetch_forecast(&self, mountain: &Mountain, days: u8) -> Result<Vec<DailyForecast>>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
