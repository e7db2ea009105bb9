use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::future::{ready, BoxFuture, FutureExt};
use securepaths_core::{Coordinates, KeyValueStore, MemoryStore, Route, StoreError, StoreResult};
use securepaths_maps::{DirectionsAlternative, MapsProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{
    build_app,
    config::Config,
    state::{AppState, Storage},
};

const API_KEY: &str = "test-api-key";

/// Provider whose every call fails, as when the upstream is unreachable.
struct UnavailableMaps;

impl MapsProvider for UnavailableMaps {
    fn geocode<'a>(
        &'a self,
        _input: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<Coordinates>>> {
        ready(Err(anyhow::anyhow!("connection refused"))).boxed()
    }

    fn directions<'a>(
        &'a self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> BoxFuture<'a, anyhow::Result<Vec<DirectionsAlternative>>> {
        ready(Err(anyhow::anyhow!("connection refused"))).boxed()
    }

    fn autocomplete<'a>(&'a self, _input: &'a str) -> BoxFuture<'a, anyhow::Result<Value>> {
        ready(Err(anyhow::anyhow!("Autocomplete request failed: 503"))).boxed()
    }
}

/// Provider answering from fixed data.
struct FixedMaps {
    geocode: Option<Coordinates>,
    alternatives: Vec<DirectionsAlternative>,
    predictions: Value,
}

impl MapsProvider for FixedMaps {
    fn geocode<'a>(
        &'a self,
        _input: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<Coordinates>>> {
        ready(Ok(self.geocode)).boxed()
    }

    fn directions<'a>(
        &'a self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> BoxFuture<'a, anyhow::Result<Vec<DirectionsAlternative>>> {
        ready(Ok(self.alternatives.clone())).boxed()
    }

    fn autocomplete<'a>(&'a self, _input: &'a str) -> BoxFuture<'a, anyhow::Result<Value>> {
        ready(Ok(self.predictions.clone())).boxed()
    }
}

fn two_alternatives() -> FixedMaps {
    FixedMaps {
        geocode: Some(Coordinates::new(12.9352, 77.6245)),
        alternatives: vec![
            DirectionsAlternative {
                raw: json!({ "summary": "via 100 Feet Rd" }),
                distance_m: 5_200.0,
                duration_s: 1_260.0,
            },
            DirectionsAlternative {
                raw: json!({ "summary": "via Intermediate Ring Rd" }),
                distance_m: 6_900.0,
                duration_s: 1_530.0,
            },
        ],
        predictions: json!({
            "predictions": [{ "description": "Koramangala, Bengaluru" }],
            "status": "ok"
        }),
    }
}

/// Route store that accepts `capacity` records, then reports the backend gone.
struct FailingRouteStore {
    inner: MemoryStore<Route>,
    capacity: usize,
}

impl FailingRouteStore {
    fn accepting(capacity: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            capacity,
        }
    }
}

impl KeyValueStore<Route> for FailingRouteStore {
    fn get(&self, key: &str) -> StoreResult<Option<Route>> {
        self.inner.get(key)
    }

    fn set(&self, key: String, value: Route) -> StoreResult<()> {
        if self.inner.len()? >= self.capacity {
            return Err(StoreError::Unavailable("disk gone".to_string()));
        }
        self.inner.set(key, value)
    }

    fn scan(&self, predicate: &dyn Fn(&Route) -> bool) -> StoreResult<Vec<Route>> {
        self.inner.scan(predicate)
    }

    fn len(&self) -> StoreResult<usize> {
        self.inner.len()
    }
}

fn setup_app(maps: impl MapsProvider + 'static) -> (Router, Arc<AppState>) {
    setup_app_with_storage(maps, Storage::in_memory())
}

fn setup_app_with_storage(
    maps: impl MapsProvider + 'static,
    storage: Storage,
) -> (Router, Arc<AppState>) {
    let mut config = Config::from_env();
    config.api_key = API_KEY.to_string();
    config.cors_origin = "http://localhost:5001".to_string();

    let state = Arc::new(AppState::with_storage(config.clone(), storage, Arc::new(maps)));
    let app = build_app(&config, state.clone()).expect("build app");
    (app, state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", API_KEY))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", API_KEY))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn search_body() -> Value {
    json!({ "startLocation": "Koramangala", "endLocation": "Indiranagar" })
}

#[tokio::test]
async fn search_falls_back_to_mock_route_when_upstream_fails() {
    let (app, state) = setup_app(UnavailableMaps);

    let res = app
        .oneshot(post_json("/api/routes/search", search_body()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;

    assert_eq!(body["source"], json!("fallback"));
    let routes = body["routes"].as_array().expect("routes array");
    assert_eq!(routes.len(), 1);
    let route = &routes[0];
    assert_eq!(route["safetyScore"], json!(90));
    assert_eq!(route["wellLit"], json!(true));
    assert_eq!(route["crowded"], json!(true));
    assert_eq!(route["hasPolicePresence"], json!(true));
    assert_eq!(route["startLocation"], json!("Koramangala"));
    let route_data: Value =
        serde_json::from_str(route["routeData"].as_str().unwrap()).unwrap();
    assert_eq!(route_data["mock"], json!(true));

    assert_eq!(state.storage().route_count().unwrap(), 1);
}

#[tokio::test]
async fn search_scores_each_provider_alternative() {
    let (app, state) = setup_app(two_alternatives());

    let res = app
        .clone()
        .oneshot(post_json(
            "/api/routes/search",
            json!({
                "startLocation": "Koramangala",
                "endLocation": "Indiranagar",
                "preferences": { "prioritizeWellLit": false }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["source"], json!("provider"));

    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0]["distance"].as_f64(), Some(5.2));
    assert_eq!(routes[0]["duration"], json!(21));
    assert_eq!(routes[1]["duration"], json!(26));
    for route in routes {
        let score = route["safetyScore"].as_u64().unwrap();
        assert!((10..=100).contains(&score));
        assert_eq!(route["wellLit"], json!(score > 80));
        assert_eq!(route["crowded"], json!(score > 70));
        assert_eq!(route["hasPolicePresence"], json!(score > 85));
    }
    assert_ne!(routes[0]["id"], routes[1]["id"]);
    assert_eq!(state.storage().route_count().unwrap(), 2);

    let listed = app
        .oneshot(get("/api/routes?startLocation=Koramangala&endLocation=Indiranagar"))
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(read_json(listed).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_with_no_alternatives_falls_back() {
    let mut maps = two_alternatives();
    maps.alternatives.clear();
    let (app, _state) = setup_app(maps);

    let res = app
        .oneshot(post_json("/api/routes/search", search_body()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["source"], json!("fallback"));
    assert_eq!(body["routes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_with_ungeocodable_location_falls_back() {
    let mut maps = two_alternatives();
    maps.geocode = None;
    let (app, _state) = setup_app(maps);

    let res = app
        .oneshot(post_json("/api/routes/search", search_body()))
        .await
        .unwrap();
    let body = read_json(res).await;
    assert_eq!(body["source"], json!("fallback"));
    assert_eq!(body["routes"][0]["safetyScore"], json!(90));
}

fn storage_with_failing_routes(capacity: usize) -> Storage {
    Storage::new(
        Box::new(MemoryStore::new()),
        Box::new(FailingRouteStore::accepting(capacity)),
        Box::new(MemoryStore::new()),
    )
}

#[tokio::test]
async fn search_storage_failure_is_a_server_error() {
    let (app, _state) = setup_app_with_storage(UnavailableMaps, storage_with_failing_routes(0));

    let res = app
        .oneshot(post_json("/api/routes/search", search_body()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(res).await;
    assert_eq!(body["message"], json!("Failed to search routes"));
    assert_eq!(body["error"], json!("store unavailable: disk gone"));
}

#[tokio::test]
async fn search_failing_mid_write_keeps_earlier_routes() {
    let (app, state) =
        setup_app_with_storage(two_alternatives(), storage_with_failing_routes(1));

    let res = app
        .clone()
        .oneshot(post_json("/api/routes/search", search_body()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.storage().route_count().unwrap(), 1);

    let listed = app
        .oneshot(get("/api/routes?startLocation=Koramangala&endLocation=Indiranagar"))
        .await
        .unwrap();
    assert_eq!(read_json(listed).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_rejects_missing_end_location() {
    let (app, state) = setup_app(UnavailableMaps);

    let res = app
        .oneshot(post_json(
            "/api/routes/search",
            json!({ "startLocation": "Koramangala" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["message"], json!("Invalid search request"));
    assert_eq!(body["errors"][0]["field"], json!("endLocation"));
    assert_eq!(state.storage().route_count().unwrap(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let (app, _state) = setup_app(UnavailableMaps);

    let req = Request::builder()
        .method("POST")
        .uri("/api/safety/report")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", API_KEY))
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["errors"][0]["field"], json!("body"));
}

#[tokio::test]
async fn api_requires_bearer_key() {
    let (app, _state) = setup_app(UnavailableMaps);

    let missing = Request::builder()
        .method("GET")
        .uri("/api/safety/reports?lat=1&lng=1")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(missing).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let wrong = Request::builder()
        .method("GET")
        .uri("/api/safety/reports?lat=1&lng=1")
        .header("authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(res).await["error"], json!("Invalid API key"));

    let raw_key = Request::builder()
        .method("GET")
        .uri("/api/safety/reports?lat=1&lng=1")
        .header("authorization", API_KEY)
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(raw_key).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let health = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(health).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn reports_are_found_within_degree_radius() {
    let (app, _state) = setup_app(UnavailableMaps);

    for (lat, lng) in [(12.93, 77.61), (13.93, 77.61)] {
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/safety/report",
                json!({
                    "location": "Koramangala 5th Block",
                    "latitude": lat,
                    "longitude": lng,
                    "reportType": "unsafe",
                    "description": "Streetlights out"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let report = read_json(res).await;
        assert!(report["id"].is_string());
        assert!(report["reportedAt"].is_string());
    }

    let res = app
        .clone()
        .oneshot(get("/api/safety/reports?lat=12.93&lng=77.61&radius=0.01"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let reports = read_json(res).await;
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["latitude"].as_f64(), Some(12.93));

    // Default radius of 1 degree, half a degree from each report.
    let res = app
        .oneshot(get("/api/safety/reports?lat=13.43&lng=77.61"))
        .await
        .unwrap();
    assert_eq!(read_json(res).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn report_without_type_is_not_stored() {
    let (app, _state) = setup_app(UnavailableMaps);

    let res = app
        .clone()
        .oneshot(post_json(
            "/api/safety/report",
            json!({ "location": "Ejipura", "latitude": 12.94, "longitude": 77.63 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["message"], json!("Invalid report data"));
    assert_eq!(body["errors"][0]["field"], json!("reportType"));

    let res = app
        .oneshot(get("/api/safety/reports?lat=12.94&lng=77.63&radius=0"))
        .await
        .unwrap();
    assert!(read_json(res).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn report_query_requires_coordinates() {
    let (app, _state) = setup_app(UnavailableMaps);

    let res = app
        .clone()
        .oneshot(get("/api/safety/reports?lat=12.93"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(res).await["message"],
        json!("Latitude and longitude are required")
    );

    let res = app
        .clone()
        .oneshot(get("/api/safety/reports?lat=12.93&lng&radius=1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_or_unparsable_radius_matches_nothing() {
    let (app, _state) = setup_app(UnavailableMaps);

    let res = app
        .clone()
        .oneshot(post_json(
            "/api/safety/report",
            json!({
                "location": "Koramangala 5th Block",
                "latitude": 12.93,
                "longitude": 77.61,
                "reportType": "unsafe"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for radius in ["-1", "abc", "NaN"] {
        let res = app
            .clone()
            .oneshot(get(&format!(
                "/api/safety/reports?lat=12.93&lng=77.61&radius={}",
                radius
            )))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "radius={}", radius);
        assert_eq!(read_json(res).await, json!([]), "radius={}", radius);
    }
}

#[tokio::test]
async fn suggestions_are_relayed_verbatim() {
    let maps = two_alternatives();
    let expected = maps.predictions.clone();
    let (app, _state) = setup_app(maps);

    let res = app
        .clone()
        .oneshot(get("/api/locations/suggest?query=Kora"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await, expected);

    let res = app
        .oneshot(get("/api/locations/suggest?query="))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(res).await["message"],
        json!("Query parameter is required")
    );
}

#[tokio::test]
async fn repeated_query_keys_get_json_errors() {
    let (app, _state) = setup_app(two_alternatives());

    let res = app
        .clone()
        .oneshot(get("/api/locations/suggest?query=a&query=b"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(res).await,
        json!({ "message": "Query parameter is required" })
    );

    let res = app
        .clone()
        .oneshot(get("/api/safety/reports?lat=1&lat=2&lng=3"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(res).await["message"],
        json!("Latitude and longitude are required")
    );

    let res = app
        .oneshot(get("/api/routes?startLocation=a&startLocation=b&endLocation=c"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(res).await["message"],
        json!("Start and end locations are required")
    );
}

#[tokio::test]
async fn suggestion_upstream_failure_is_a_server_error() {
    let (app, _state) = setup_app(UnavailableMaps);

    let res = app
        .oneshot(get("/api/locations/suggest?query=Kora"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(res).await;
    assert_eq!(body["message"], json!("Failed to get location suggestions"));
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn usernames_are_unique_and_passwords_hidden() {
    let (app, _state) = setup_app(UnavailableMaps);
    let body = json!({ "username": "asha", "password": "s3cret" });

    let res = app
        .clone()
        .oneshot(post_json("/api/users/register", body.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let user = read_json(res).await;
    assert!(user.get("password").is_none());
    let id = user["id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(post_json("/api/users/register", body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(get(&format!("/api/users/{}", id)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(read_json(res).await["username"], json!("asha"));

    let res = app.oneshot(get("/api/users/unknown")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let (app, _state) = setup_app(UnavailableMaps);

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-123");

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/routes/search")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", API_KEY))
        .header("x-request-id", "  search-7  ")
        .body(Body::from(search_body().to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "search-7");
}
