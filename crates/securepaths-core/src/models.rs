//! Core data models for the SecurePaths system.
//!
//! Records are flat: nothing references another record by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Opaque credential, never echoed back to clients
    #[serde(skip_serializing)]
    pub password: String,
}

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// A scored candidate route between two free-text locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub start_location: String,
    pub end_location: String,
    /// Serialized provider response for this alternative
    pub route_data: String,
    /// 0-100
    pub safety_score: u8,
    /// Kilometers
    pub distance: f64,
    /// Minutes
    pub duration: u32,
    pub well_lit: bool,
    pub crowded: bool,
    pub has_police_presence: bool,
    pub created_at: DateTime<Utc>,
}

/// Route fields before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub start_location: String,
    pub end_location: String,
    pub route_data: String,
    pub safety_score: u8,
    pub distance: f64,
    pub duration: u32,
    pub well_lit: bool,
    pub crowded: bool,
    pub has_police_presence: bool,
}

impl NewRoute {
    pub fn into_route(self, id: String, created_at: DateTime<Utc>) -> Route {
        Route {
            id,
            start_location: self.start_location,
            end_location: self.end_location,
            route_data: self.route_data,
            safety_score: self.safety_score,
            distance: self.distance,
            duration: self.duration,
            well_lit: self.well_lit,
            crowded: self.crowded,
            has_police_presence: self.has_police_presence,
            created_at,
        }
    }
}

/// A user-submitted, point-located observation about an area.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub id: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Usually "safe", "unsafe" or "incident"; not a closed set
    pub report_type: String,
    pub description: Option<String>,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSafetyReport {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub report_type: String,
    pub description: Option<String>,
}

impl NewSafetyReport {
    pub fn into_report(self, id: String, reported_at: DateTime<Utc>) -> SafetyReport {
        SafetyReport {
            id,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            report_type: self.report_type,
            description: self.description,
            reported_at,
        }
    }
}

/// Search preferences. Accepted and echoed to logs, not used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePreferences {
    pub prioritize_well_lit: bool,
    pub avoid_isolated: bool,
    pub prefer_public_transport: bool,
}

impl Default for RoutePreferences {
    fn default() -> Self {
        Self {
            prioritize_well_lit: true,
            avoid_isolated: true,
            prefer_public_transport: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSearchRequest {
    pub start_location: String,
    pub end_location: String,
    pub preferences: Option<RoutePreferences>,
}

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Where the routes in a search result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Upstream directions provider
    Provider,
    /// Synthetic route generated after an upstream failure
    Fallback,
}
