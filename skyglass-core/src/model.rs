use serde::{Deserialize, Serialize};

use crate::condition::{self, Condition};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Normalized result of one successful fetch. Temperatures keep full
/// precision; the `*_display` helpers round for the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: String,
    pub weather_code: i32,
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub visibility_m: Option<u32>,
    pub observation_hour: u32,
    pub condition: Condition,
}

impl WeatherSnapshot {
    /// "Name, CC", or just the name when the provider gave no country.
    pub fn display_location(&self) -> String {
        if self.country.is_empty() {
            self.location_name.clone()
        } else {
            format!("{}, {}", self.location_name, self.country)
        }
    }

    pub fn temperature_display(&self) -> i64 {
        round_half_up(self.temperature_c)
    }

    pub fn feels_like_display(&self) -> i64 {
        round_half_up(self.feels_like_c)
    }

    pub fn temp_min_display(&self) -> i64 {
        round_half_up(self.temp_min_c)
    }

    pub fn temp_max_display(&self) -> i64 {
        round_half_up(self.temp_max_c)
    }

    pub fn pressure_display(&self) -> i64 {
        round_half_up(self.pressure_hpa)
    }

    pub fn wind_kmh(&self) -> i64 {
        wind_kmh(self.wind_speed_mps)
    }

    pub fn visibility_km(&self) -> Option<i64> {
        visibility_km(self.visibility_m)
    }

    /// Visibility as shown on the card: a number of kilometres or `N/A`.
    pub fn visibility_display(&self) -> String {
        match self.visibility_km() {
            Some(km) => km.to_string(),
            None => "N/A".to_string(),
        }
    }

    pub fn icon(&self) -> &'static str {
        condition::icon(self.weather_code, self.condition)
    }
}

/// Round halves towards positive infinity, so -2.5 becomes -2.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Provider wind speed (m/s) to whole km/h.
pub fn wind_kmh(speed_mps: f64) -> i64 {
    round_half_up(speed_mps * 3.6)
}

/// Provider visibility (m) to whole km. `None` when the field was omitted or
/// reported as zero.
pub fn visibility_km(visibility_m: Option<u32>) -> Option<i64> {
    visibility_m
        .filter(|m| *m > 0)
        .map(|m| round_half_up(f64::from(m) / 1000.0))
}
