//! Safety report endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use securepaths_core::{NewSafetyReport, SafetyReport};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::routes::{json_body, query_params};
use crate::state::AppState;

/// Radius in raw degrees used when the query omits one.
pub const DEFAULT_RADIUS: f64 = 1.0;

const INVALID_REPORT: &str = "Invalid report data";

/// Submit a new safety report.
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SafetyReport>, ApiError> {
    let body = json_body(body, INVALID_REPORT)?;
    let new_report = NewSafetyReport::from_json(&body)
        .map_err(|errors| ApiError::validation(INVALID_REPORT, errors))?;

    let report = state
        .storage()
        .create_safety_report(new_report)
        .map_err(|err| ApiError::storage("Failed to submit safety report", err))?;

    tracing::info!(
        "Stored {} report '{}' at ({}, {})",
        report.report_type,
        report.id,
        report.latitude,
        report.longitude
    );
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// An omitted or empty radius means the default. Anything else that does
/// not parse becomes NaN, which no distance compares within.
fn parse_radius(value: Option<&str>) -> f64 {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_RADIUS,
        Some(raw) => raw.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// List reports within a radius of a point.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReportsQuery>, QueryRejection>,
) -> Result<Json<Vec<SafetyReport>>, ApiError> {
    const MISSING_COORDINATES: &str = "Latitude and longitude are required";
    let query = query_params(query, MISSING_COORDINATES)?;
    let (Some(lat), Some(lng)) = (
        parse_coordinate(query.lat.as_deref()),
        parse_coordinate(query.lng.as_deref()),
    ) else {
        return Err(ApiError::BadRequest(MISSING_COORDINATES));
    };
    let radius = parse_radius(query.radius.as_deref());

    state
        .storage()
        .get_safety_reports(lat, lng, radius)
        .map(Json)
        .map_err(|err| ApiError::storage("Failed to get safety reports", err))
}
