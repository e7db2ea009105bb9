//! Route search: geocode both ends, fetch alternatives, score, store.

use anyhow::{anyhow, Result};
use futures::future::try_join;
use securepaths_core::{
    draw_safety_score, mock_route, route_from_leg, NewRoute, Route, RouteSearchRequest,
    RouteSource, StoreResult,
};
use securepaths_maps::MapsProvider;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct RouteSearchResponse {
    pub routes: Vec<Route>,
    /// `fallback` when the upstream failed and a synthetic route was served
    pub source: RouteSource,
}

/// Run a search. Upstream failures fall back to a single mock route; only a
/// storage failure fails the search.
pub async fn search_routes(
    state: &AppState,
    request: &RouteSearchRequest,
) -> StoreResult<RouteSearchResponse> {
    if let Some(preferences) = request.preferences {
        tracing::debug!("Search preferences (not applied): {:?}", preferences);
    }

    let (candidates, source) = match fetch_candidates(state.maps(), request).await {
        Ok(candidates) => (candidates, RouteSource::Provider),
        Err(err) => {
            tracing::warn!("Maps provider failed, using mock route: {:#}", err);
            let mock = mock_route(
                &request.start_location,
                &request.end_location,
                &mut rand::rng(),
            );
            (vec![mock], RouteSource::Fallback)
        }
    };

    // Writes are not transactional: routes stored before a failed write stay
    // stored and are visible to later lookups.
    let routes = candidates
        .into_iter()
        .map(|candidate| state.storage().create_route(candidate))
        .collect::<StoreResult<Vec<_>>>()?;

    tracing::info!(
        "Route search '{}' -> '{}' returned {} route(s) from {:?}",
        request.start_location,
        request.end_location,
        routes.len(),
        source
    );

    Ok(RouteSearchResponse { routes, source })
}

async fn fetch_candidates(
    maps: &dyn MapsProvider,
    request: &RouteSearchRequest,
) -> Result<Vec<NewRoute>> {
    let (start, end) = try_join(
        maps.geocode(&request.start_location),
        maps.geocode(&request.end_location),
    )
    .await?;

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(anyhow!("Geocoding failed for start or end location")),
    };

    let alternatives = maps.directions(start, end).await?;
    if alternatives.is_empty() {
        return Err(anyhow!("Directions returned no routes"));
    }

    let mut rng = rand::rng();
    Ok(alternatives
        .iter()
        .map(|alternative| {
            route_from_leg(
                &request.start_location,
                &request.end_location,
                &alternative.raw,
                alternative.distance_m,
                alternative.duration_s,
                draw_safety_score(&mut rng),
            )
        })
        .collect())
}
