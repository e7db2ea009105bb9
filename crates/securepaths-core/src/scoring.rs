//! Safety scoring heuristics.
//!
//! The score is a placeholder derived from a single random draw; it does not
//! reflect measured lighting, crowd or police data.

use rand::Rng;
use serde_json::Value;

use crate::models::NewRoute;

pub const BASE_SCORE: i32 = 70;
pub const MIN_SCORE: u8 = 10;
pub const MAX_SCORE: u8 = 100;

pub const WELL_LIT_THRESHOLD: u8 = 80;
pub const CROWDED_THRESHOLD: u8 = 70;
pub const POLICE_THRESHOLD: u8 = 85;

/// Score assigned to synthetic fallback routes.
pub const MOCK_ROUTE_SCORE: u8 = 90;

/// Map a draw in `[0, 1)` to a score in `[MIN_SCORE, MAX_SCORE]`.
pub fn safety_score_from_draw(draw: f64) -> u8 {
    let mut score = BASE_SCORE;
    if draw > 0.7 {
        score += 20;
    }
    if draw > 0.5 {
        score += 10;
    }
    if draw < 0.3 {
        score -= 25;
    }
    score.clamp(MIN_SCORE as i32, MAX_SCORE as i32) as u8
}

pub fn draw_safety_score<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    safety_score_from_draw(rng.random::<f64>())
}

/// Route attributes inferred from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyFlags {
    pub well_lit: bool,
    pub crowded: bool,
    pub has_police_presence: bool,
}

impl SafetyFlags {
    pub fn from_score(score: u8) -> Self {
        Self {
            well_lit: score > WELL_LIT_THRESHOLD,
            crowded: score > CROWDED_THRESHOLD,
            has_police_presence: score > POLICE_THRESHOLD,
        }
    }
}

/// Build a scored route record from one provider leg.
pub fn route_from_leg(
    start_location: &str,
    end_location: &str,
    raw: &Value,
    distance_m: f64,
    duration_s: f64,
    safety_score: u8,
) -> NewRoute {
    let flags = SafetyFlags::from_score(safety_score);
    NewRoute {
        start_location: start_location.to_string(),
        end_location: end_location.to_string(),
        route_data: raw.to_string(),
        safety_score,
        distance: distance_m.max(0.0) / 1000.0,
        duration: (duration_s.max(0.0) / 60.0).round() as u32,
        well_lit: flags.well_lit,
        crowded: flags.crowded,
        has_police_presence: flags.has_police_presence,
    }
}

/// Synthetic route used when the directions provider is unavailable.
pub fn mock_route<R: Rng + ?Sized>(
    start_location: &str,
    end_location: &str,
    rng: &mut R,
) -> NewRoute {
    let distance = 5.0 + rng.random::<f64>() * 10.0;
    let duration = (distance * 4.0 + rng.random::<f64>() * 10.0).round() as u32;
    NewRoute {
        start_location: start_location.to_string(),
        end_location: end_location.to_string(),
        route_data: serde_json::json!({ "mock": true, "path": "safest_route" }).to_string(),
        safety_score: MOCK_ROUTE_SCORE,
        distance,
        duration,
        well_lit: true,
        crowded: true,
        has_police_presence: true,
    }
}
