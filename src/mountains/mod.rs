//! Mountain catalogue and region resolution
//!
//! The catalogue ships embedded in the binary and can be replaced by a JSON
//! file of the same shape named in the configuration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use haversine::{Location as HaversineLocation, Units, distance};
use tracing::{debug, info};

use crate::error::ForecastError;
use crate::models::{Mountain, Region};

const EMBEDDED_MOUNTAINS: &str = include_str!("mountains.json");

/// Read-only set of configured mountains
#[derive(Debug, Clone)]
pub struct MountainRegistry {
    mountains: Vec<Mountain>,
}

impl MountainRegistry {
    /// Build a registry, rejecting duplicate mountain ids
    pub fn new(mountains: Vec<Mountain>) -> Result<Self> {
        let mut seen = HashSet::new();
        for mountain in &mountains {
            if !seen.insert(mountain.id.as_str()) {
                return Err(anyhow!("Duplicate mountain id '{}'", mountain.id));
            }
        }
        Ok(Self { mountains })
    }

    /// The catalogue compiled into the binary
    pub fn embedded() -> Result<Self> {
        let mountains: Vec<Mountain> = serde_json::from_str(EMBEDDED_MOUNTAINS)
            .context("Failed to parse embedded mountain catalogue")?;
        Self::new(mountains)
    }

    /// Load a catalogue from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mountain file {}", path.display()))?;
        let mountains: Vec<Mountain> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse mountain file {}", path.display()))?;
        info!("Loaded {} mountains from {}", mountains.len(), path.display());
        Self::new(mountains)
    }

    /// Load from the given file, or fall back to the embedded catalogue
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    #[must_use]
    pub fn all(&self) -> &[Mountain] {
        &self.mountains
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Mountain> {
        self.mountains.iter().find(|m| m.id == id)
    }

    /// Mountains of a region or subregion in catalogue order
    #[must_use]
    pub fn for_region(&self, region: Region) -> Vec<&Mountain> {
        self.mountains.iter().filter(|m| m.is_in(region)).collect()
    }

    /// Resolve a raw region identifier to its mountains.
    ///
    /// Fails with [`ForecastError::UnknownRegion`] for an identifier outside the
    /// fixed set and [`ForecastError::EmptyRegion`] when nothing is configured.
    pub fn resolve(&self, raw: &str) -> std::result::Result<(Region, Vec<Mountain>), ForecastError> {
        let region: Region = raw.parse()?;
        let mountains: Vec<Mountain> = self.for_region(region).into_iter().cloned().collect();

        if mountains.is_empty() {
            return Err(ForecastError::EmptyRegion {
                region: region.id().to_string(),
            });
        }

        debug!("Resolved region {} to {} mountains", region, mountains.len());
        Ok((region, mountains))
    }

    /// Mountains within `radius_miles` of a point, closest first
    #[must_use]
    pub fn nearby(&self, latitude: f64, longitude: f64, radius_miles: f64) -> Vec<(Mountain, f64)> {
        let mut results: Vec<(Mountain, f64)> = self
            .mountains
            .iter()
            .map(|mountain| {
                let center = HaversineLocation {
                    latitude,
                    longitude,
                };
                let location = HaversineLocation {
                    latitude: mountain.latitude,
                    longitude: mountain.longitude,
                };
                (mountain.clone(), distance(center, location, Units::Miles))
            })
            .filter(|(_, miles)| *miles <= radius_miles)
            .collect();

        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        results
    }
}
