//! Record storage for users, routes and safety reports.

use chrono::Utc;
use securepaths_core::geo::within_radius;
use securepaths_core::{
    KeyValueStore, MemoryStore, NewRoute, NewSafetyReport, NewUser, Route, SafetyReport,
    StoreError, StoreResult, User,
};
use std::sync::Mutex;
use uuid::Uuid;

/// Typed collections over the key-value store abstraction.
pub struct Storage {
    users: Box<dyn KeyValueStore<User>>,
    routes: Box<dyn KeyValueStore<Route>>,
    safety_reports: Box<dyn KeyValueStore<SafetyReport>>,
    /// Serializes the username check and insert
    registration: Mutex<()>,
}

impl Storage {
    pub fn new(
        users: Box<dyn KeyValueStore<User>>,
        routes: Box<dyn KeyValueStore<Route>>,
        safety_reports: Box<dyn KeyValueStore<SafetyReport>>,
    ) -> Self {
        Self {
            users,
            routes,
            safety_reports,
            registration: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
        )
    }

    pub fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        self.users.get(id)
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .scan(&|user| user.username == username)?
            .into_iter()
            .next())
    }

    pub fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let _guard = self
            .registration
            .lock()
            .map_err(|_| StoreError::Unavailable("registration lock poisoned".to_string()))?;

        if self.get_user_by_username(&new_user.username)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                new_user.username
            )));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new_user.username,
            password: new_user.password,
        };
        self.users.set(user.id.clone(), user.clone())?;
        Ok(user)
    }

    pub fn create_route(&self, new_route: NewRoute) -> StoreResult<Route> {
        let route = new_route.into_route(Uuid::new_v4().to_string(), Utc::now());
        self.routes.set(route.id.clone(), route.clone())?;
        Ok(route)
    }

    /// Stored routes for an exact (start, end) text pair.
    pub fn get_routes(&self, start_location: &str, end_location: &str) -> StoreResult<Vec<Route>> {
        let mut routes = self.routes.scan(&|route| {
            route.start_location == start_location && route.end_location == end_location
        })?;
        routes.sort_by_key(|route| route.created_at);
        Ok(routes)
    }

    pub fn create_safety_report(&self, new_report: NewSafetyReport) -> StoreResult<SafetyReport> {
        let report = new_report.into_report(Uuid::new_v4().to_string(), Utc::now());
        self.safety_reports.set(report.id.clone(), report.clone())?;
        Ok(report)
    }

    /// Reports within `radius` raw degrees of the query point.
    pub fn get_safety_reports(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> StoreResult<Vec<SafetyReport>> {
        let mut reports = self
            .safety_reports
            .scan(&|report| within_radius(latitude, longitude, report, radius))?;
        reports.sort_by_key(|report| report.reported_at);
        Ok(reports)
    }

    pub fn route_count(&self) -> StoreResult<usize> {
        self.routes.len()
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::in_memory()
    }
}
