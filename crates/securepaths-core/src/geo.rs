//! Planar distance helpers for safety report lookups.

use crate::models::SafetyReport;

/// Euclidean distance in raw degrees. No projection or earth-curvature
/// correction is applied, so this is only meaningful for small radii.
pub fn degree_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    ((lat2 - lat1).powi(2) + (lng2 - lng1).powi(2)).sqrt()
}

/// Inclusive radius check used by report queries.
pub fn within_radius(lat: f64, lng: f64, report: &SafetyReport, radius: f64) -> bool {
    degree_distance(lat, lng, report.latitude, report.longitude) <= radius
}
