use thiserror::Error;

pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Please add your OpenWeatherMap API key to use this app";
pub const GEOLOCATION_UNAVAILABLE_MESSAGE: &str = "Geolocation is not supported on this system.";
pub const GEOLOCATION_DENIED_MESSAGE: &str =
    "Unable to get your location. Please search for a city.";
pub const COORDINATES_FAILED_MESSAGE: &str = "Failed to fetch weather data";
pub const CITY_NOT_FOUND_MESSAGE: &str = "City not found. Please try again.";
pub const INVALID_RESPONSE_MESSAGE: &str =
    "Received an unexpected response from the weather service.";

/// Which lookup a provider failure came from. Picks the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Coordinates,
    City,
}

impl LookupKind {
    /// User-facing message when this lookup fails at the provider.
    pub fn failure_message(&self) -> &'static str {
        match self {
            LookupKind::Coordinates => COORDINATES_FAILED_MESSAGE,
            LookupKind::City => CITY_NOT_FOUND_MESSAGE,
        }
    }
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.failure_message())
    }
}

/// Coarse reason behind a non-success provider status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Unauthorized,
    RateLimited,
    Server,
    /// No HTTP status: DNS, connect, timeout.
    Transport,
    Other,
}

impl FailureKind {
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            None => FailureKind::Transport,
            Some(404) => FailureKind::NotFound,
            Some(401) | Some(403) => FailureKind::Unauthorized,
            Some(429) => FailureKind::RateLimited,
            Some(500..=599) => FailureKind::Server,
            Some(_) => FailureKind::Other,
        }
    }
}

/// Everything that can end a weather request. None of these are fatal; the
/// shell shows the message and stays interactive.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShellError {
    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    MissingCredential,

    #[error("{}", GEOLOCATION_UNAVAILABLE_MESSAGE)]
    GeolocationUnavailable,

    #[error("{}", GEOLOCATION_DENIED_MESSAGE)]
    GeolocationDenied { reason: String },

    #[error("{lookup}")]
    ProviderRequestFailed {
        lookup: LookupKind,
        status: Option<u16>,
        detail: String,
    },

    #[error("{}", INVALID_RESPONSE_MESSAGE)]
    ProviderResponseInvalid { detail: String },
}

impl ShellError {
    pub fn request_failed(lookup: LookupKind, status: Option<u16>, detail: impl Into<String>) -> Self {
        ShellError::ProviderRequestFailed {
            lookup,
            status,
            detail: detail.into(),
        }
    }

    pub fn invalid_response(detail: impl Into<String>) -> Self {
        ShellError::ProviderResponseInvalid {
            detail: detail.into(),
        }
    }

    /// Status classification for provider failures, `None` for everything else.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ShellError::ProviderRequestFailed { status, .. } => {
                Some(FailureKind::from_status(*status))
            }
            _ => None,
        }
    }

    /// Extra context for `--verbose` output; the display message stays fixed.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            ShellError::GeolocationDenied { reason } => Some(reason.clone()),
            ShellError::ProviderRequestFailed { status, detail, .. } => Some(match status {
                Some(code) => format!("HTTP {code}: {detail}"),
                None => detail.clone(),
            }),
            ShellError::ProviderResponseInvalid { detail } => Some(detail.clone()),
            _ => None,
        }
    }
}
