//! Mountain configuration: static metadata for a single ski resort

use serde::{Deserialize, Serialize};

use super::Region;

const FEET_PER_METER: f64 = 3.280_84;

/// Base and summit elevation in feet
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Elevation {
    pub base: u32,
    pub summit: u32,
}

impl Elevation {
    /// Summit elevation converted to meters
    #[must_use]
    pub fn summit_meters(&self) -> f64 {
        f64::from(self.summit) / FEET_PER_METER
    }
}

/// A configured ski resort
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mountain {
    /// Stable identifier (e.g. "baker")
    pub id: String,
    /// Display name
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    pub elevation: Elevation,
    /// State or province level region
    pub region: Region,
    /// Optional finer grouping used by subregion requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Mountain {
    /// Whether this mountain belongs to the given region or subregion
    #[must_use]
    pub fn is_in(&self, region: Region) -> bool {
        self.region == region || self.subregion == Some(region)
    }

    /// Cache key for a forecast of this mountain
    #[must_use]
    pub fn forecast_cache_key(&self, days: u8) -> String {
        format!("forecast:{}:{days}", self.id)
    }
}
