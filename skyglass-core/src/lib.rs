//! Core library for the `skyglass` weather card.
//!
//! This crate defines:
//! - The condition classifier (weather code + local hour -> theme)
//! - The OpenWeatherMap gateway and its HTTP transport seam
//! - The request state machine that drives the card
//! - Geolocation, clock and text rendering helpers
//! - Configuration & credentials handling
//!
//! It is used by `skyglass-cli`, but can also be embedded by other front ends.

pub mod clock;
pub mod condition;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod render;
pub mod shell;

#[cfg(test)]
mod test_support;

pub use condition::{Condition, classify};
pub use config::{Config, HomeLocation};
pub use error::{FailureKind, LookupKind, ShellError};
pub use geolocation::{FixedGeolocator, GeolocationError, Geolocator, NoGeolocator};
pub use model::{Coordinates, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use shell::{Outcome, RequestState, WeatherShell};
