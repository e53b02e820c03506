use async_trait::async_trait;
use chrono::{Local, Timelike};
use serde::Deserialize;
use std::{fmt, sync::Arc};

use crate::{
    condition::classify,
    error::{LookupKind, ShellError},
    model::{Coordinates, WeatherSnapshot},
};

use super::{HttpReply, Transport, WeatherProvider};

pub const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Supplies the local hour (0–23) used for day/night classification.
pub type HourSource = Arc<dyn Fn() -> u32 + Send + Sync>;

pub fn local_hour() -> u32 {
    Local::now().hour()
}

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    transport: Arc<dyn Transport>,
    hour_source: HourSource,
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key,
            transport,
            hour_source: Arc::new(local_hour),
        }
    }

    pub fn with_hour_source(mut self, hour_source: HourSource) -> Self {
        self.hour_source = hour_source;
        self
    }

    fn api_key(&self) -> Result<&str, ShellError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ShellError::MissingCredential),
        }
    }

    async fn fetch_current(
        &self,
        lookup: LookupKind,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<WeatherSnapshot, ShellError> {
        let api_key = self.api_key()?;

        query.push(("appid", api_key.to_string()));
        query.push(("units", "metric".to_string()));

        let reply = self
            .transport
            .get(CURRENT_WEATHER_PATH, &query)
            .await
            .map_err(|e| {
                tracing::warn!("OpenWeather {:?} request did not complete: {:#}", lookup, e);
                ShellError::request_failed(lookup, None, format!("{e:#}"))
            })?;

        if !reply.is_success() {
            tracing::warn!(
                "OpenWeather {:?} request failed with status {}: {}",
                lookup,
                reply.status,
                truncate_body(&reply.body),
            );
            return Err(ShellError::request_failed(
                lookup,
                Some(reply.status),
                truncate_body(&reply.body),
            ));
        }

        let hour = (self.hour_source)();
        let snapshot = normalize(&reply, hour)?;

        tracing::debug!(
            "OpenWeather {:?} lookup resolved to {} (code {}, {})",
            lookup,
            snapshot.display_location(),
            snapshot.weather_code,
            snapshot.condition,
        );

        Ok(snapshot)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    visibility: Option<u32>,
    #[serde(default)]
    sys: OwSys,
}

/// Parse a successful current-weather body and classify it at `hour`.
fn normalize(reply: &HttpReply, hour: u32) -> Result<WeatherSnapshot, ShellError> {
    let parsed: OwCurrentResponse = serde_json::from_str(&reply.body).map_err(|e| {
        tracing::warn!("Failed to parse OpenWeather current JSON: {}", e);
        ShellError::invalid_response(format!("Failed to parse OpenWeather current JSON: {e}"))
    })?;

    let primary = parsed.weather.into_iter().next().ok_or_else(|| {
        ShellError::invalid_response("OpenWeather response contained no weather entries")
    })?;

    Ok(WeatherSnapshot {
        location_name: parsed.name,
        country: parsed.sys.country.unwrap_or_default(),
        weather_code: primary.id,
        description: primary.description,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        temp_min_c: parsed.main.temp_min,
        temp_max_c: parsed.main.temp_max,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        wind_speed_mps: parsed.wind.speed,
        visibility_m: parsed.visibility,
        observation_hour: hour,
        condition: classify(primary.id, hour),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, ShellError> {
        let query = vec![
            ("lat", coordinates.latitude.to_string()),
            ("lon", coordinates.longitude.to_string()),
        ];
        self.fetch_current(LookupKind::Coordinates, query).await
    }

    async fn current_by_city(&self, city: &str) -> Result<WeatherSnapshot, ShellError> {
        self.fetch_current(LookupKind::City, vec![("q", city.to_string())])
            .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        condition::Condition,
        test_support::{ScriptedTransport, sample_body},
    };

    fn provider(key: Option<&str>, transport: Arc<ScriptedTransport>) -> OpenWeatherProvider {
        OpenWeatherProvider::new(key.map(str::to_string), transport)
            .with_hour_source(Arc::new(|| 12))
    }

    #[tokio::test]
    async fn missing_api_key_never_touches_transport() {
        let transport = Arc::new(ScriptedTransport::default());

        for key in [None, Some(""), Some("   ")] {
            let p = provider(key, transport.clone());

            let by_city = p.current_by_city("Oslo").await.unwrap_err();
            let by_coords = p
                .current_by_coordinates(Coordinates::new(59.9, 10.7))
                .await
                .unwrap_err();

            assert_eq!(by_city, ShellError::MissingCredential);
            assert_eq!(by_coords, ShellError::MissingCredential);
        }

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn city_lookup_sends_metric_query() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_ok(sample_body(500, Some(8000)));

        let snap = provider(Some("KEY"), transport.clone())
            .current_by_city("São Paulo")
            .await
            .unwrap();

        assert_eq!(snap.condition, Condition::Rainy);
        assert_eq!(snap.observation_hour, 12);

        let (path, query) = transport.last_request().unwrap();
        assert_eq!(path, CURRENT_WEATHER_PATH);
        assert!(query.contains(&("q".to_string(), "São Paulo".to_string())));
        assert!(query.contains(&("appid".to_string(), "KEY".to_string())));
        assert!(query.contains(&("units".to_string(), "metric".to_string())));
    }

    #[tokio::test]
    async fn coordinate_lookup_sends_lat_lon() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_ok(sample_body(800, None));

        let snap = provider(Some("KEY"), transport.clone())
            .current_by_coordinates(Coordinates::new(51.5, -0.12))
            .await
            .unwrap();

        assert_eq!(snap.condition, Condition::Sunny);
        assert_eq!(snap.visibility_display(), "N/A");

        let (_, query) = transport.last_request().unwrap();
        assert!(query.contains(&("lat".to_string(), "51.5".to_string())));
        assert!(query.contains(&("lon".to_string(), "-0.12".to_string())));
    }

    #[tokio::test]
    async fn non_success_status_maps_to_lookup_message() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_status(404, r#"{"cod":"404","message":"city not found"}"#);
        transport.push_status(500, "oops");

        let p = provider(Some("KEY"), transport.clone());

        let city_err = p.current_by_city("Atlantis").await.unwrap_err();
        assert_eq!(city_err.to_string(), "City not found. Please try again.");
        assert!(matches!(
            city_err,
            ShellError::ProviderRequestFailed {
                status: Some(404),
                ..
            }
        ));

        let coords_err = p
            .current_by_coordinates(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert_eq!(coords_err.to_string(), "Failed to fetch weather data");
    }

    #[tokio::test]
    async fn transport_failure_has_no_status() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_transport_error("connection refused");

        let err = provider(Some("KEY"), transport)
            .current_by_city("Oslo")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShellError::ProviderRequestFailed { status: None, .. }
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_ok("not json".to_string());
        transport.push_ok(r#"{"name":"X","main":{"temp":1,"feels_like":1,"temp_min":1,"temp_max":1,"humidity":1,"pressure":1},"weather":[],"wind":{"speed":1}}"#.to_string());

        let p = provider(Some("KEY"), transport);

        let err = p.current_by_city("Oslo").await.unwrap_err();
        assert!(matches!(err, ShellError::ProviderResponseInvalid { .. }));

        let err = p.current_by_city("Oslo").await.unwrap_err();
        assert!(matches!(err, ShellError::ProviderResponseInvalid { .. }));
    }

    #[test]
    fn normalize_extracts_fields() {
        let reply = HttpReply {
            status: 200,
            body: sample_body(601, Some(8000)),
        };

        let snap = normalize(&reply, 22).unwrap();

        assert_eq!(snap.display_location(), "Reykjavik, IS");
        assert_eq!(snap.weather_code, 601);
        assert_eq!(snap.description, "snow");
        assert_eq!(snap.condition, Condition::Night);
        assert_eq!(snap.wind_kmh(), 36);
        assert_eq!(snap.visibility_km(), Some(8));
        assert_eq!(snap.humidity_pct, 81);
    }

    #[test]
    fn missing_sys_block_leaves_country_empty() {
        let body = r#"{"name":"","main":{"temp":1.2,"feels_like":0.4,"temp_min":1,"temp_max":2,"humidity":50,"pressure":1009},"weather":[{"id":804,"description":"overcast clouds"}],"wind":{"speed":3.3}}"#;
        let reply = HttpReply {
            status: 200,
            body: body.to_string(),
        };

        let snap = normalize(&reply, 10).unwrap();
        assert_eq!(snap.country, "");
        assert_eq!(snap.condition, Condition::Cloudy);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }
}
