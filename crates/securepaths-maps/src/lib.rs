//! SecurePaths Maps - upstream mapping provider client
//!
//! Handles all communication with the Ola Maps places and routing APIs.

pub mod client;
pub mod provider;

pub use client::OlaMapsClient;
pub use provider::{DirectionsAlternative, MapsProvider};
