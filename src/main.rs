use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use skiforecast::api::AppState;
use skiforecast::{
    MountainRegistry, OpenMeteoProvider, PersistentCache, RegionalForecastService,
    SkiForecastConfig, telemetry, web,
};

fn open_cache(config: &SkiForecastConfig) -> Option<Arc<PersistentCache>> {
    if !config.cache.enabled {
        info!("Forecast cache disabled");
        return None;
    }
    match PersistentCache::open(&config.cache.location) {
        Ok(cache) => {
            info!("Forecast cache at {}", config.cache.location);
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!(
                "Failed to open cache at {}, continuing without: {:#}",
                config.cache.location, e
            );
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = SkiForecastConfig::load().context("Failed to load configuration")?;
    let telemetry = telemetry::init_tracing(&config.logging)?;

    let registry = MountainRegistry::load(config.mountains_file.as_deref().map(Path::new))?;
    info!("Loaded {} mountains", registry.all().len());

    let provider = OpenMeteoProvider::new(&config.weather)?;
    let service = RegionalForecastService::new(
        Arc::new(registry),
        Arc::new(provider),
        open_cache(&config),
        &config.forecast,
        &config.cache,
    );

    let state = AppState {
        service: Arc::new(service),
        cache_max_age_seconds: config.forecast.cache_max_age_seconds,
    };

    let result = web::run(&config.server, state).await;
    telemetry.shutdown();
    result
}
