//! Text rendering of the weather card.

use chrono::NaiveDateTime;

use crate::{
    clock::{format_date, format_time},
    error::ShellError,
    model::WeatherSnapshot,
    shell::RequestState,
};

pub const TITLE: &str = "Weather App";
pub const TAGLINE: &str = "Beautiful weather, beautiful day";
pub const LOADING_MESSAGE: &str = "Loading weather data...";
pub const RETRY_HINT: &str = "[ Try Again ]";

const API_KEY_STEPS: &[&str] = &[
    "Get a free API key from OpenWeatherMap (https://openweathermap.org/api)",
    "Run `skyglass configure` or set SKYGLASS_API_KEY",
    "Start enjoying beautiful weather updates!",
];

/// Full screen for `state` with the clock showing `now`.
pub fn render(state: &RequestState, now: &NaiveDateTime) -> String {
    let mut lines = vec![
        format!("{TITLE}  [{}]", state.theme()),
        TAGLINE.to_string(),
        String::new(),
    ];

    match state {
        RequestState::Loading => lines.push(LOADING_MESSAGE.to_string()),
        RequestState::Error(err) => lines.extend(error_lines(err)),
        RequestState::Ready(snapshot) => lines.extend(card_lines(snapshot, now)),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn error_lines(err: &ShellError) -> Vec<String> {
    let mut lines = vec![err.to_string()];

    if matches!(err, ShellError::MissingCredential) {
        lines.push(String::new());
        lines.push("To use this weather app:".to_string());
        lines.extend(
            API_KEY_STEPS
                .iter()
                .enumerate()
                .map(|(i, step)| format!("  {}. {step}", i + 1)),
        );
    }

    lines.push(String::new());
    lines.push(RETRY_HINT.to_string());
    lines
}

fn card_lines(snapshot: &WeatherSnapshot, now: &NaiveDateTime) -> Vec<String> {
    vec![
        snapshot.display_location(),
        format_time(now),
        format_date(now),
        String::new(),
        format!("{}  {}°", snapshot.icon(), snapshot.temperature_display()),
        capitalize_words(&snapshot.description),
        format!("Feels like {}°", snapshot.feels_like_display()),
        String::new(),
        format!("💧 Humidity    {}%", snapshot.humidity_pct),
        format!("💨 Wind        {} km/h", snapshot.wind_kmh()),
        format!("🌡️ Pressure    {} hPa", snapshot.pressure_display()),
        format!("👁️ Visibility  {} km", snapshot.visibility_display()),
        String::new(),
        format!(
            "Min {}°   Max {}°",
            snapshot.temp_min_display(),
            snapshot.temp_max_display()
        ),
    ]
}

/// Uppercase the first letter of every word.
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
