//! HTTP-level tests for the forecast API

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use skiforecast::api::AppState;
use skiforecast::config::{CacheConfig, ForecastConfig};
use skiforecast::{
    DailyForecast, ForecastProvider, Mountain, MountainRegistry, RegionalForecastService, web,
};

/// Provider whose upstream is always down
struct FailingProvider;

#[async_trait]
impl ForecastProvider for FailingProvider {
    async fn fetch_forecast(&self, _: &Mountain, _: u8) -> anyhow::Result<Vec<DailyForecast>> {
        Err(anyhow!("connection refused"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Provider returning a three-day storm for every mountain
struct SnowyProvider;

#[async_trait]
impl ForecastProvider for SnowyProvider {
    async fn fetch_forecast(&self, _: &Mountain, days: u8) -> anyhow::Result<Vec<DailyForecast>> {
        let start = NaiveDate::from_ymd_opt(2027, 1, 20).unwrap();
        Ok((0..days)
            .map(|i| DailyForecast {
                date: start + chrono::Duration::days(i.into()),
                high_temp_f: 24.0,
                low_temp_f: 10.0,
                snowfall_inches: if (1..=3).contains(&i) { 9.0 } else { 0.0 },
                precipitation_inches: 0.5,
                precipitation_probability: 90,
                wind_speed_mph: 10.0,
                wind_gust_mph: 22.0,
                weather_code: 75,
                conditions: "Heavy snow fall".to_string(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "snowy"
    }
}

/// Provider with a bug that panics mid-request
struct PanickingProvider;

#[async_trait]
impl ForecastProvider for PanickingProvider {
    async fn fetch_forecast(
        &self,
        mountain: &Mountain,
        _: u8,
    ) -> anyhow::Result<Vec<DailyForecast>> {
        panic!("index out of bounds while parsing {}", mountain.id);
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

fn app(provider: Arc<dyn ForecastProvider>) -> axum::Router {
    let registry = Arc::new(MountainRegistry::embedded().unwrap());
    let service = RegionalForecastService::new(
        registry,
        provider,
        None,
        &ForecastConfig::default(),
        &CacheConfig::default(),
    );
    let state = AppState {
        service: Arc::new(service),
        cache_max_age_seconds: 900,
    };
    web::app(state, Duration::from_secs(30))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cache_control, body)
}

#[tokio::test]
async fn unknown_region_lists_valid_regions() {
    let (status, _, body) = get(app(Arc::new(SnowyProvider)), "/api/forecast/atlantis").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid region: atlantis");
    let valid: Vec<&str> = body["validRegions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(valid.len(), 20);
    assert!(valid.contains(&"washington"));
    assert!(valid.contains(&"wasatch"));
}

#[tokio::test]
async fn region_without_mountains_is_not_found() {
    let (status, cache_control, body) =
        get(app(Arc::new(SnowyProvider)), "/api/forecast/alaska").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["region"], "alaska");
    assert_eq!(body["error"], "No mountains found for region: alaska");
    assert!(cache_control.is_none());
}

#[tokio::test]
async fn all_fetches_failing_still_succeeds() {
    let (status, cache_control, body) =
        get(app(Arc::new(FailingProvider)), "/api/forecast/utah").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=900"));

    let mountains = body["mountains"].as_array().unwrap();
    assert_eq!(mountains.len(), 8);
    assert_eq!(mountains[0]["mountain"]["id"], "parkcity");
    assert!(
        mountains
            .iter()
            .all(|m| m["forecast"].as_array().unwrap().is_empty())
    );
    assert_eq!(
        body["stormAnalysis"]["headline"],
        "No forecast data available"
    );
    assert_eq!(body["stormAnalysis"]["mountainsWithData"], 0);
}

#[tokio::test]
async fn regional_forecast_carries_cache_header_and_analysis() {
    let (status, cache_control, body) =
        get(app(Arc::new(SnowyProvider)), "/api/forecast/Wasatch").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=900"));
    assert_eq!(body["region"], "wasatch");
    assert_eq!(body["regionName"], "Wasatch Range");
    assert!(body["generatedAt"].is_string());

    let analysis = &body["stormAnalysis"];
    assert_eq!(analysis["storms"].as_array().unwrap().len(), 1);
    assert_eq!(analysis["storms"][0]["intensity"], "major");
    assert_eq!(analysis["storms"][0]["durationDays"], 3);
    assert!(
        analysis["headline"]
            .as_str()
            .unwrap()
            .starts_with("Major storm")
    );
    assert!(!analysis["powderDays"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn mountain_forecast_endpoint() {
    let (status, cache_control, body) =
        get(app(Arc::new(SnowyProvider)), "/api/mountains/alta/forecast").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=900"));
    assert_eq!(body["mountain"]["name"], "Alta Ski Area");
    assert_eq!(body["forecast"].as_array().unwrap().len(), 7);

    let (status, _, body) =
        get(app(Arc::new(SnowyProvider)), "/api/mountains/everest/forecast").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["id"], "everest");
}

#[tokio::test]
async fn regions_endpoint_counts_mountains() {
    let (status, _, body) = get(app(Arc::new(SnowyProvider)), "/api/regions").await;
    assert_eq!(status, StatusCode::OK);

    let regions = body.as_array().unwrap();
    assert_eq!(regions.len(), 20);
    let count = |id: &str| {
        regions
            .iter()
            .find(|r| r["id"] == id)
            .map(|r| r["mountainCount"].as_u64().unwrap())
            .unwrap()
    };
    assert_eq!(count("utah"), 8);
    assert_eq!(count("alaska"), 0);
    assert_eq!(count("tahoe"), 4);
}

#[tokio::test]
async fn nearby_mountains_sorted_by_distance() {
    let (status, _, body) = get(
        app(Arc::new(SnowyProvider)),
        "/api/mountains?lat=40.6&lng=-111.6&radiusMiles=20",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mountains = body.as_array().unwrap();
    let ids: Vec<&str> = mountains
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"alta"));
    assert!(!ids.contains(&"snowbasin"));

    let distances: Vec<f64> = mountains
        .iter()
        .map(|m| m["distanceMiles"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(distances.iter().all(|d| *d <= 20.0));
}

#[tokio::test]
async fn mountain_catalogue_and_bad_queries() {
    let (status, _, body) = get(app(Arc::new(SnowyProvider)), "/api/mountains").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 53);
    assert!(body[0].get("distanceMiles").is_none());

    let (status, _, _) = get(app(Arc::new(SnowyProvider)), "/api/mountains?lat=40.6").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(
        app(Arc::new(SnowyProvider)),
        "/api/mountains?lat=40.6&lng=-111.6&radiusMiles=0",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_query_is_json_bad_request() {
    let (status, _, body) = get(
        app(Arc::new(SnowyProvider)),
        "/api/mountains?lat=north&lng=-111.6",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid input:")
    );
}

#[tokio::test]
async fn handler_panic_becomes_internal_error() {
    let (status, cache_control, body) =
        get(app(Arc::new(PanickingProvider)), "/api/forecast/utah").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate forecast");
    assert!(cache_control.is_none());
}

#[tokio::test]
async fn health_reports_version() {
    let (status, _, body) = get(app(Arc::new(FailingProvider)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], skiforecast::VERSION);
}
