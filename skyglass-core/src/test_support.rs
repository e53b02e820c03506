//! Fakes shared by the unit tests.

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::Notify;

use crate::{
    condition::classify,
    error::{LookupKind, ShellError},
    model::{Coordinates, WeatherSnapshot},
    provider::{HttpReply, Transport, WeatherProvider},
};

/// Transport that replays queued replies and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<anyhow::Result<HttpReply>>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn push_ok(&self, body: String) {
        self.replies
            .lock()
            .push_back(Ok(HttpReply { status: 200, body }));
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.replies.lock().push_back(Ok(HttpReply {
            status,
            body: body.to_string(),
        }));
    }

    pub fn push_transport_error(&self, message: &str) {
        self.replies.lock().push_back(Err(anyhow!(message.to_string())));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, Vec<(String, String)>)> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<HttpReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((
            path.to_string(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ));

        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted reply left")))
    }
}

type Gate = (Arc<Notify>, Result<WeatherSnapshot, ShellError>);

/// Provider whose city lookups block until the test releases them.
#[derive(Debug, Default)]
pub struct GatedProvider {
    gates: Mutex<HashMap<String, Gate>>,
}

impl GatedProvider {
    pub fn gate(&self, city: &str, result: Result<WeatherSnapshot, ShellError>) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .insert(city.to_string(), (notify.clone(), result));
        notify
    }
}

#[async_trait]
impl WeatherProvider for GatedProvider {
    async fn current_by_coordinates(
        &self,
        _coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, ShellError> {
        Ok(snapshot_for("Here", 800))
    }

    async fn current_by_city(&self, city: &str) -> Result<WeatherSnapshot, ShellError> {
        let gate = self.gates.lock().get(city).cloned();

        match gate {
            Some((notify, result)) => {
                notify.notified().await;
                result
            }
            None => Err(ShellError::request_failed(LookupKind::City, Some(404), "ungated")),
        }
    }
}

pub fn snapshot_for(name: &str, code: i32) -> WeatherSnapshot {
    WeatherSnapshot {
        location_name: name.to_string(),
        country: "XX".to_string(),
        weather_code: code,
        description: "test weather".to_string(),
        temperature_c: 15.0,
        feels_like_c: 14.0,
        temp_min_c: 10.0,
        temp_max_c: 18.0,
        humidity_pct: 50,
        pressure_hpa: 1013.0,
        wind_speed_mps: 2.0,
        visibility_m: Some(10_000),
        observation_hour: 12,
        condition: classify(code, 12),
    }
}

/// A current-weather body in the provider's shape.
pub fn sample_body(code: i32, visibility: Option<u32>) -> String {
    let description = match code {
        500..=599 => "light rain",
        600..=699 => "snow",
        800 => "clear sky",
        _ => "overcast clouds",
    };

    let mut body = serde_json::json!({
        "weather": [{ "id": code, "main": "X", "description": description, "icon": "01d" }],
        "main": {
            "temp": 4.6,
            "feels_like": 1.2,
            "temp_min": 3.5,
            "temp_max": 5.49,
            "pressure": 1002,
            "humidity": 81
        },
        "wind": { "speed": 10.0, "deg": 250 },
        "sys": { "country": "IS" },
        "name": "Reykjavik",
        "cod": 200
    });

    if let Some(v) = visibility {
        body["visibility"] = serde_json::json!(v);
    }

    body.to_string()
}
