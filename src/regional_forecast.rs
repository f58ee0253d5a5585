//! Regional forecast aggregation
//!
//! Fans out one forecast fetch per mountain, substitutes an empty forecast
//! for every failed or timed-out fetch, and runs the storm analysis over the
//! merged result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::{StreamExt, stream};
use tracing::{debug, info, instrument, warn};

use crate::cache::{PersistentCache, ttl_with_jitter};
use crate::config::{CacheConfig, ForecastConfig};
use crate::error::ForecastError;
use crate::models::{DailyForecast, Mountain, MountainForecast, RegionalForecast};
use crate::mountains::MountainRegistry;
use crate::storm;
use crate::weather::{FORECAST_DAYS, ForecastProvider};

/// Builds regional and single-mountain forecasts
pub struct RegionalForecastService {
    registry: Arc<MountainRegistry>,
    provider: Arc<dyn ForecastProvider>,
    cache: Option<Arc<PersistentCache>>,
    max_concurrent_fetches: usize,
    fetch_timeout: Duration,
    cache_ttl: Duration,
}

impl RegionalForecastService {
    pub fn new(
        registry: Arc<MountainRegistry>,
        provider: Arc<dyn ForecastProvider>,
        cache: Option<Arc<PersistentCache>>,
        forecast: &ForecastConfig,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            registry,
            provider,
            cache,
            max_concurrent_fetches: forecast.max_concurrent_fetches.max(1),
            fetch_timeout: Duration::from_secs(forecast.fetch_timeout_seconds.into()),
            cache_ttl: Duration::from_secs(u64::from(cache_config.ttl_minutes) * 60),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &MountainRegistry {
        &self.registry
    }

    /// Forecast every mountain of `region` and summarize the region
    #[instrument(skip(self))]
    pub async fn regional_forecast(&self, region: &str) -> crate::Result<RegionalForecast> {
        let (region, mountains) = self.registry.resolve(region)?;
        info!(
            "Generating forecast for {} ({} mountains)",
            region,
            mountains.len()
        );

        let forecasts = self.fetch_all(mountains).await;
        let storm_analysis = storm::analyze(&forecasts);

        info!(
            "Forecast for {} ready: {}/{} mountains with data, {} storms",
            region,
            storm_analysis.mountains_with_data,
            storm_analysis.mountains_total,
            storm_analysis.storms.len()
        );

        Ok(RegionalForecast {
            region,
            region_name: region.display_name().to_string(),
            generated_at: Utc::now(),
            mountains: forecasts,
            storm_analysis,
        })
    }

    /// Forecast a single mountain by id
    #[instrument(skip(self))]
    pub async fn mountain_forecast(&self, id: &str) -> crate::Result<MountainForecast> {
        let mountain = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| ForecastError::UnknownMountain { id: id.to_string() })?;

        let forecast = self.fetch_or_empty(&mountain).await;
        Ok(MountainForecast::new(mountain, forecast))
    }

    /// Concurrent fetch of all mountains, results in input order
    async fn fetch_all(&self, mountains: Vec<Mountain>) -> Vec<MountainForecast> {
        stream::iter(mountains)
            .map(|mountain| async move {
                let forecast = self.fetch_or_empty(&mountain).await;
                MountainForecast::new(mountain, forecast)
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await
    }

    async fn fetch_or_empty(&self, mountain: &Mountain) -> Vec<DailyForecast> {
        let key = mountain.forecast_cache_key(FORECAST_DAYS);

        if let Some(cached) = self.cached(&key).await {
            debug!("Using cached forecast for {}", mountain.id);
            return cached;
        }

        let fetch = self.provider.fetch_forecast(mountain, FORECAST_DAYS);
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(forecast)) => {
                self.store(&key, &forecast).await;
                forecast
            }
            Ok(Err(e)) => {
                warn!(
                    "Failed to fetch forecast for {} from {}: {:#}",
                    mountain.id,
                    self.provider.name(),
                    e
                );
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "Forecast fetch for {} timed out after {:?}",
                    mountain.id, self.fetch_timeout
                );
                Vec::new()
            }
        }
    }

    async fn cached(&self, key: &str) -> Option<Vec<DailyForecast>> {
        let cache = self.cache.as_ref()?;
        match cache.get::<Vec<DailyForecast>>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache read failed for {}: {:#}", key, e);
                None
            }
        }
    }

    async fn store(&self, key: &str, forecast: &[DailyForecast]) {
        let Some(cache) = &self.cache else {
            return;
        };
        if forecast.is_empty() {
            return;
        }
        if let Err(e) = cache
            .put(key, forecast.to_vec(), ttl_with_jitter(self.cache_ttl))
            .await
        {
            warn!("Cache write failed for {}: {:#}", key, e);
        }
    }
}
