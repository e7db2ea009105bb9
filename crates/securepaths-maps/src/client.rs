//! Ola Maps HTTP client.

use anyhow::{anyhow, Context, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use securepaths_core::Coordinates;
use serde_json::Value;
use std::time::Duration;

use crate::provider::{parse_directions, parse_geocode, DirectionsAlternative, MapsProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.olamaps.io";

/// HTTP client for the Ola Maps places and routing APIs.
pub struct OlaMapsClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    /// Key for routing and autocomplete
    pub(crate) api_key: String,
    pub(crate) geocoding_api_key: String,
}

impl OlaMapsClient {
    /// Create a new client. Geocoding uses its own key when the provider
    /// issues one; pass the same key twice otherwise.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        geocoding_api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            geocoding_api_key: geocoding_api_key.into(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)], what: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} request failed: {} {}", what, status, body));
        }

        response
            .json::<Value>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }

    /// Geocode a free-text location to its first match.
    pub async fn geocode(&self, input: &str) -> Result<Option<Coordinates>> {
        let body = self
            .get_json(
                "/places/v1/geocode",
                &[("input", input), ("api_key", self.geocoding_api_key.as_str())],
                "Geocode",
            )
            .await?;
        parse_geocode(body)
    }

    /// Fetch directions with alternatives between two coordinates.
    pub async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<DirectionsAlternative>> {
        let origin = origin.to_string();
        let destination = destination.to_string();
        let body = self
            .get_json(
                "/routing/v1/directions",
                &[
                    ("origin", origin.as_str()),
                    ("destination", destination.as_str()),
                    ("alternatives", "true"),
                    ("api_key", self.api_key.as_str()),
                ],
                "Directions",
            )
            .await?;
        let alternatives = parse_directions(body)?;
        tracing::debug!(
            "Directions {} -> {} returned {} alternative(s)",
            origin,
            destination,
            alternatives.len()
        );
        Ok(alternatives)
    }

    /// Fetch place predictions for a partial query.
    pub async fn autocomplete(&self, input: &str) -> Result<Value> {
        self.get_json(
            "/places/v1/autocomplete",
            &[("input", input), ("api_key", self.api_key.as_str())],
            "Autocomplete",
        )
        .await
    }
}

impl MapsProvider for OlaMapsClient {
    fn geocode<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<Option<Coordinates>>> {
        OlaMapsClient::geocode(self, input).boxed()
    }

    fn directions<'a>(
        &'a self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> BoxFuture<'a, Result<Vec<DirectionsAlternative>>> {
        OlaMapsClient::directions(self, origin, destination).boxed()
    }

    fn autocomplete<'a>(&'a self, input: &'a str) -> BoxFuture<'a, Result<Value>> {
        OlaMapsClient::autocomplete(self, input).boxed()
    }
}
