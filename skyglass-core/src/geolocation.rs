//! Where-am-I capability used by the shell on start and retry.
//!
//! There is no portable system location API, so the host decides which
//! [`Geolocator`] to hand the shell: fixed coordinates from flags or config,
//! or [`NoGeolocator`] when nothing is known.

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::{Config, model::Coordinates};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeolocationError {
    /// The host has no way to determine a position.
    #[error("Geolocation capability unavailable")]
    Unavailable,

    /// A lookup was attempted and refused or failed.
    #[error("Geolocation failed: {0}")]
    Denied(String),
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    coordinates: Coordinates,
}

impl FixedGeolocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        if !self.coordinates.is_valid() {
            return Err(GeolocationError::Denied(format!(
                "coordinates out of range: {}, {}",
                self.coordinates.latitude, self.coordinates.longitude
            )));
        }
        Ok(self.coordinates)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocator;

#[async_trait]
impl Geolocator for NoGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Explicit coordinates win, then the configured home, else unavailable.
pub fn geolocator_for(explicit: Option<Coordinates>, config: &Config) -> Box<dyn Geolocator> {
    match explicit.or_else(|| config.home_coordinates()) {
        Some(coordinates) => Box::new(FixedGeolocator::new(coordinates)),
        None => Box::new(NoGeolocator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HomeLocation;

    #[tokio::test]
    async fn fixed_geolocator_returns_position() {
        let geo = FixedGeolocator::new(Coordinates::new(48.85, 2.35));
        assert_eq!(geo.locate().await.unwrap(), Coordinates::new(48.85, 2.35));
    }

    #[tokio::test]
    async fn out_of_range_position_is_denied() {
        let geo = FixedGeolocator::new(Coordinates::new(120.0, 2.35));
        assert!(matches!(
            geo.locate().await,
            Err(GeolocationError::Denied(_))
        ));
    }

    #[tokio::test]
    async fn no_geolocator_is_unavailable() {
        assert_eq!(
            NoGeolocator.locate().await,
            Err(GeolocationError::Unavailable)
        );
    }

    #[tokio::test]
    async fn explicit_coordinates_beat_configured_home() {
        let mut cfg = Config::default();
        cfg.home = Some(HomeLocation {
            latitude: 1.0,
            longitude: 1.0,
        });

        let geo = geolocator_for(Some(Coordinates::new(2.0, 2.0)), &cfg);
        assert_eq!(geo.locate().await.unwrap(), Coordinates::new(2.0, 2.0));

        let geo = geolocator_for(None, &cfg);
        assert_eq!(geo.locate().await.unwrap(), Coordinates::new(1.0, 1.0));

        let geo = geolocator_for(None, &Config::default());
        assert_eq!(geo.locate().await, Err(GeolocationError::Unavailable));
    }
}
