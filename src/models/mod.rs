//! Data models for the skiforecast service
//!
//! This module contains the core domain models organized by concern:
//! - Region: the fixed set of regions and subregions
//! - Mountain: static resort configuration
//! - Weather: daily forecast records
//! - Forecast: per-mountain and regional forecast collections

pub mod forecast;
pub mod mountain;
pub mod region;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{MountainForecast, RegionalForecast};
pub use mountain::{Elevation, Mountain};
pub use region::{Region, RegionKind};
pub use weather::DailyForecast;
