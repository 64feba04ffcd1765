use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};

use crate::{
    ClimateApiError,
    models::{DateRangeSummary, RangeFromSummary},
    service::{DateSeries, QueryService},
};

/// Version prefix the routes below are mounted under
pub const API_PREFIX: &str = "/api/v1.0";

type ApiResult<T> = Result<Json<T>, ClimateApiError>;

pub fn router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/precipitation", get(get_precipitation))
        .route("/stations", get(get_stations))
        .route("/tobs", get(get_tobs))
        .route("/{start}", get(get_range_from))
        .route("/{start}/{end}", get(get_range))
        .with_state(service)
}

async fn get_precipitation(State(service): State<Arc<QueryService>>) -> ApiResult<DateSeries> {
    Ok(Json(service.precipitation().await?))
}

async fn get_stations(State(service): State<Arc<QueryService>>) -> ApiResult<Vec<String>> {
    Ok(Json(service.stations().await?))
}

async fn get_tobs(State(service): State<Arc<QueryService>>) -> ApiResult<DateSeries> {
    Ok(Json(service.prior_year_temperatures().await?))
}

async fn get_range_from(
    State(service): State<Arc<QueryService>>,
    Path(start): Path<String>,
) -> ApiResult<RangeFromSummary> {
    Ok(Json(service.range_from(&start).await?))
}

async fn get_range(
    State(service): State<Arc<QueryService>>,
    Path((start, end)): Path<(String, String)>,
) -> ApiResult<DateRangeSummary> {
    Ok(Json(service.range(&start, &end).await?))
}
