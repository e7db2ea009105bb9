//! Field-level validation of incoming JSON bodies.
//!
//! Bodies are checked as raw `serde_json::Value`s so every problem can be
//! reported against the field it belongs to.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{NewSafetyReport, NewUser, RoutePreferences, RouteSearchRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed on {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn new(body: &'a Value) -> Result<Self, ValidationErrors> {
        body.as_object()
            .map(|object| Self {
                object,
                errors: Vec::new(),
            })
            .ok_or_else(|| ValidationErrors::single("body", "Expected a JSON object"))
    }

    fn string(&mut self, field: &str, non_empty: bool) -> Option<String> {
        match self.object.get(field) {
            None | Some(Value::Null) => {
                self.errors.push(FieldError::new(field, "Required"));
                None
            }
            Some(Value::String(s)) if non_empty && s.is_empty() => {
                self.errors
                    .push(FieldError::new(field, "Must contain at least 1 character"));
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.errors.push(FieldError::new(field, "Expected string"));
                None
            }
        }
    }

    fn optional_string(&mut self, field: &str) -> Option<String> {
        match self.object.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.errors.push(FieldError::new(field, "Expected string"));
                None
            }
        }
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        match self.object.get(field) {
            None | Some(Value::Null) => {
                self.errors.push(FieldError::new(field, "Required"));
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => Some(v),
                _ => {
                    self.errors.push(FieldError::new(field, "Expected finite number"));
                    None
                }
            },
            Some(_) => {
                self.errors.push(FieldError::new(field, "Expected number"));
                None
            }
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.errors.is_empty() {
            return Err(ValidationErrors(self.errors));
        }
        value().ok_or_else(|| ValidationErrors::single("body", "Invalid body"))
    }
}

fn preferences_from_json(
    value: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<RoutePreferences> {
    let Some(object) = value.as_object() else {
        errors.push(FieldError::new("preferences", "Expected object"));
        return None;
    };

    let mut preferences = RoutePreferences::default();
    let slots: [(&str, &mut bool); 3] = [
        ("prioritizeWellLit", &mut preferences.prioritize_well_lit),
        ("avoidIsolated", &mut preferences.avoid_isolated),
        ("preferPublicTransport", &mut preferences.prefer_public_transport),
    ];
    for (key, slot) in slots {
        match object.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Bool(b)) => *slot = *b,
            Some(_) => errors.push(FieldError::new(
                format!("preferences.{key}"),
                "Expected boolean",
            )),
        }
    }
    Some(preferences)
}

impl RouteSearchRequest {
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body)?;
        let start_location = fields.string("startLocation", true);
        let end_location = fields.string("endLocation", true);
        let preferences = match fields.object.get("preferences") {
            None | Some(Value::Null) => None,
            Some(value) => preferences_from_json(value, &mut fields.errors),
        };

        fields.finish(|| {
            Some(Self {
                start_location: start_location?,
                end_location: end_location?,
                preferences,
            })
        })
    }
}

impl NewSafetyReport {
    /// Shape checks only; coordinates outside the valid lat/lng range are kept.
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body)?;
        let location = fields.string("location", false);
        let latitude = fields.number("latitude");
        let longitude = fields.number("longitude");
        let report_type = fields.string("reportType", true);
        let description = fields.optional_string("description");

        fields.finish(|| {
            Some(Self {
                location: location?,
                latitude: latitude?,
                longitude: longitude?,
                report_type: report_type?,
                description,
            })
        })
    }
}

impl NewUser {
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(body)?;
        let username = fields.string("username", true);
        let password = fields.string("password", true);

        fields.finish(|| {
            Some(Self {
                username: username?,
                password: password?,
            })
        })
    }
}
