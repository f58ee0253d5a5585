use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::{
    ForecastError,
    models::{Mountain, Region, RegionKind},
    regional_forecast::RegionalForecastService,
};

/// Radius used by `/mountains` when only a point is given
pub const DEFAULT_RADIUS_MILES: f64 = 100.0;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RegionalForecastService>,
    /// `max-age` for forecast responses
    pub cache_max_age_seconds: u32,
}

/// HTTP mapping of [`ForecastError`]
pub struct ApiError(ForecastError);

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        Self(err)
    }
}

/// Body of every 500 response
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to generate forecast";

/// 500 `{"error"}` response shared by handler failures and caught panics
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.user_message();
        match self.0 {
            ForecastError::UnknownRegion { .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": message, "validRegions": Region::valid_ids() })),
            )
                .into_response(),
            ForecastError::EmptyRegion { region } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": message, "region": region })),
            )
                .into_response(),
            ForecastError::UnknownMountain { id } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": message, "id": id })),
            )
                .into_response(),
            ForecastError::Validation { .. } => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                internal_error_response()
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegion {
    pub id: String,
    pub name: String,
    pub kind: RegionKind,
    pub mountain_count: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMountain {
    #[serde(flatten)]
    pub mountain: Mountain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountainQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_miles: Option<f64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/forecast/{region}", get(get_regional_forecast))
        .route("/regions", get(get_regions))
        .route("/mountains", get(get_mountains))
        .route("/mountains/{id}/forecast", get(get_mountain_forecast))
        .with_state(state)
}

fn with_cache_control<T: Serialize>(max_age: u32, body: T) -> Response {
    (
        [(header::CACHE_CONTROL, format!("public, max-age={max_age}"))],
        Json(body),
    )
        .into_response()
}

async fn get_regional_forecast(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Response, ApiError> {
    let forecast = state.service.regional_forecast(&region).await?;
    Ok(with_cache_control(state.cache_max_age_seconds, forecast))
}

async fn get_mountain_forecast(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let forecast = state.service.mountain_forecast(&id).await?;
    Ok(with_cache_control(state.cache_max_age_seconds, forecast))
}

async fn get_regions(State(state): State<AppState>) -> Json<Vec<ApiRegion>> {
    let registry = state.service.registry();
    let regions = Region::ALL
        .iter()
        .map(|region| ApiRegion {
            id: region.id().to_string(),
            name: region.display_name().to_string(),
            kind: region.kind(),
            mountain_count: registry.for_region(*region).len(),
        })
        .collect();
    Json(regions)
}

async fn get_mountains(
    State(state): State<AppState>,
    query: Result<Query<MountainQuery>, QueryRejection>,
) -> Result<Json<Vec<ApiMountain>>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| ForecastError::validation(rejection.body_text()))?;
    let registry = state.service.registry();

    let mountains = match (query.lat, query.lng) {
        (None, None) => registry
            .all()
            .iter()
            .map(|mountain| ApiMountain {
                mountain: mountain.clone(),
                distance_miles: None,
            })
            .collect(),
        (Some(lat), Some(lng)) => {
            let radius = query.radius_miles.unwrap_or(DEFAULT_RADIUS_MILES);
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(ForecastError::validation("lat/lng out of range").into());
            }
            if radius <= 0.0 || !radius.is_finite() {
                return Err(ForecastError::validation("radiusMiles must be positive").into());
            }
            registry
                .nearby(lat, lng, radius)
                .into_iter()
                .map(|(mountain, miles)| ApiMountain {
                    mountain,
                    distance_miles: Some(miles),
                })
                .collect()
        }
        _ => {
            return Err(ForecastError::validation("lat and lng must be given together").into());
        }
    };

    Ok(Json(mountains))
}
