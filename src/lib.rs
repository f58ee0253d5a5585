//! `skiforecast` - Regional ski forecast aggregation
//!
//! This library fetches per-mountain weather forecasts, merges them per
//! region and derives storm and powder-day summaries served over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod mountains;
pub mod regional_forecast;
pub mod storm;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::SkiForecastConfig;
pub use error::ForecastError;
pub use models::{DailyForecast, Mountain, MountainForecast, Region, RegionalForecast};
pub use mountains::MountainRegistry;
pub use regional_forecast::RegionalForecastService;
pub use storm::StormAnalysis;
pub use weather::{ForecastProvider, OpenMeteoProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
