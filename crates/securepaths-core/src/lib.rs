pub mod geo;
pub mod models;
pub mod scoring;
pub mod store;
pub mod validation;

pub use geo::{degree_distance, within_radius};
pub use models::{
    Coordinates, NewRoute, NewSafetyReport, NewUser, Route, RoutePreferences, RouteSearchRequest,
    RouteSource, SafetyReport, User,
};
pub use scoring::{
    draw_safety_score, mock_route, route_from_leg, safety_score_from_draw, SafetyFlags,
};
pub use store::{KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use validation::{FieldError, ValidationErrors};
