use serde::{Deserialize, Serialize};

/// Display category derived from a provider weather code and the local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Snow,
    Night,
}

impl Condition {
    pub const fn all() -> &'static [Condition] {
        &[
            Condition::Sunny,
            Condition::Cloudy,
            Condition::Rainy,
            Condition::Snow,
            Condition::Night,
        ]
    }

    /// Background theme name for this condition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloudy",
            Condition::Rainy => "rainy",
            Condition::Snow => "snow",
            Condition::Night => "night",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True outside 06:00..=20:59 local time.
pub fn is_night(hour: u32) -> bool {
    hour < 6 || hour > 20
}

/// Map an OpenWeatherMap condition code and the local hour to a [`Condition`].
///
/// The night check runs first and overrides every code band.
/// See: https://openweathermap.org/weather-conditions
pub fn classify(code: i32, hour: u32) -> Condition {
    if is_night(hour) {
        return Condition::Night;
    }

    match code {
        200..=599 => Condition::Rainy,
        600..=699 => Condition::Snow,
        700..=799 => Condition::Cloudy,
        800 => Condition::Sunny,
        801.. => Condition::Cloudy,
        _ => Condition::Sunny,
    }
}

/// Card icon for a code, with night taking precedence.
pub fn icon(code: i32, condition: Condition) -> &'static str {
    if condition == Condition::Night {
        return "🌙";
    }

    match code {
        200..=299 => "⛈️",
        300..=499 => "🌦️",
        500..=599 => "🌧️",
        600..=699 => "❄️",
        700..=799 => "🌫️",
        800 => "☀️",
        801.. => "☁️",
        _ => "☀️",
    }
}
