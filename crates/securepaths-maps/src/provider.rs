//! Provider seam between the server and the upstream mapping API.

use anyhow::{anyhow, Context, Result};
use futures::future::BoxFuture;
use securepaths_core::Coordinates;
use serde::Deserialize;
use serde_json::Value;

/// Upstream mapping operations used by route search and autocomplete.
///
/// Futures are boxed so implementations can sit behind `Arc<dyn MapsProvider>`.
pub trait MapsProvider: Send + Sync {
    /// First geocoding match for a free-text location, if any.
    fn geocode<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<Option<Coordinates>>>;

    /// Route alternatives between two points. Alternatives are always requested.
    fn directions<'a>(
        &'a self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> BoxFuture<'a, Result<Vec<DirectionsAlternative>>>;

    /// Raw autocomplete payload, relayed to clients unmodified.
    fn autocomplete<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<Value>>;
}

/// One candidate route, measured from its first leg.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsAlternative {
    /// The provider's route object as received
    pub raw: Value,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Leg measurements arrive either as `{ "value": n, "text": "..." }` or as a
/// bare number depending on the API version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Measure {
    Detailed { value: f64 },
    Plain(f64),
}

impl Measure {
    fn value(&self) -> f64 {
        match self {
            Measure::Detailed { value } => *value,
            Measure::Plain(value) => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Measure,
    duration: Measure,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default, alias = "geocodingResults")]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

/// Extract the first geocoding match from a places response.
pub fn parse_geocode(body: Value) -> Result<Option<Coordinates>> {
    let response: GeocodeResponse =
        serde_json::from_value(body).context("Failed to parse geocode response")?;
    Ok(response
        .results
        .into_iter()
        .next()
        .map(|result| result.geometry.location))
}

/// Split a directions response into measured alternatives.
///
/// Every route must carry at least one leg; a malformed route fails the whole
/// response rather than being skipped.
pub fn parse_directions(body: Value) -> Result<Vec<DirectionsAlternative>> {
    let routes = match body.get("routes") {
        Some(Value::Array(routes)) => routes,
        _ => return Err(anyhow!("Directions response missing routes array")),
    };

    routes
        .iter()
        .enumerate()
        .map(|(index, route)| {
            let leg_value = route
                .get("legs")
                .and_then(|legs| legs.get(0))
                .ok_or_else(|| anyhow!("Route {} has no legs", index))?;
            let leg: Leg = serde_json::from_value(leg_value.clone())
                .with_context(|| format!("Route {} has a malformed leg", index))?;
            Ok(DirectionsAlternative {
                raw: route.clone(),
                distance_m: leg.distance.value(),
                duration_s: leg.duration.value(),
            })
        })
        .collect()
}
