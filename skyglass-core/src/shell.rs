//! Presentation state machine.
//!
//! A [`WeatherShell`] owns exactly one [`RequestState`]. Every user action
//! (start, retry, search) takes a fresh generation number and cancels the
//! request before it; a result is only committed while its generation is
//! still the newest, so late responses from abandoned requests are dropped.

use parking_lot::Mutex;
use std::{future::Future, sync::Arc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    condition::Condition,
    error::ShellError,
    geolocation::{GeolocationError, Geolocator},
    model::WeatherSnapshot,
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Loading,
    Error(ShellError),
    Ready(WeatherSnapshot),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            RequestState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ShellError> {
        match self {
            RequestState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Background theme; sunny until a snapshot says otherwise.
    pub fn theme(&self) -> Condition {
        self.snapshot()
            .map(|snapshot| snapshot.condition)
            .unwrap_or_default()
    }
}

/// What happened to the result of one shell action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result became the visible state.
    Committed,
    /// A newer action started first; the result was discarded.
    Superseded,
    /// Nothing to do (blank search).
    Ignored,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Debug)]
pub struct WeatherShell {
    provider: Arc<dyn WeatherProvider>,
    geolocator: Arc<dyn Geolocator>,
    state: watch::Sender<RequestState>,
    inflight: Mutex<InFlight>,
}

impl WeatherShell {
    pub fn new(provider: Arc<dyn WeatherProvider>, geolocator: Arc<dyn Geolocator>) -> Self {
        let (state, _) = watch::channel(RequestState::Loading);

        Self {
            provider,
            geolocator,
            state,
            inflight: Mutex::new(InFlight {
                generation: 0,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Receive every committed transition, including `Loading`.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Generation of the newest action.
    pub fn current_generation(&self) -> u64 {
        self.inflight.lock().generation
    }

    /// Initial load: look up the current position and fetch its weather.
    pub async fn start(&self) -> Outcome {
        self.locate_and_fetch().await
    }

    /// Manual retry after an error. Same path as [`WeatherShell::start`].
    pub async fn retry(&self) -> Outcome {
        self.locate_and_fetch().await
    }

    /// Fetch weather for a free-text city name, superseding anything in flight.
    pub async fn search(&self, city: &str) -> Outcome {
        let city = city.trim();
        if city.is_empty() {
            return Outcome::Ignored;
        }

        let (generation, cancel) = self.begin();
        tracing::info!("Request #{} searching for city '{}'", generation, city);

        let provider = self.provider.clone();
        let work = async move { provider.current_by_city(city).await };

        self.run(generation, cancel, work).await
    }

    async fn locate_and_fetch(&self) -> Outcome {
        let (generation, cancel) = self.begin();
        tracing::info!("Request #{} looking up current position", generation);

        let provider = self.provider.clone();
        let geolocator = self.geolocator.clone();
        let work = async move {
            let coordinates = geolocator.locate().await.map_err(|e| match e {
                GeolocationError::Unavailable => ShellError::GeolocationUnavailable,
                GeolocationError::Denied(reason) => ShellError::GeolocationDenied { reason },
            })?;
            provider.current_by_coordinates(coordinates).await
        };

        self.run(generation, cancel, work).await
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut inflight = self.inflight.lock();

        inflight.cancel.cancel();
        inflight.generation += 1;
        inflight.cancel = CancellationToken::new();

        self.state.send_replace(RequestState::Loading);

        (inflight.generation, inflight.cancel.clone())
    }

    async fn run<F>(&self, generation: u64, cancel: CancellationToken, work: F) -> Outcome
    where
        F: Future<Output = Result<WeatherSnapshot, ShellError>>,
    {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Request #{} cancelled", generation);
                Outcome::Superseded
            }
            result = work => self.commit(generation, result),
        }
    }

    fn commit(&self, generation: u64, result: Result<WeatherSnapshot, ShellError>) -> Outcome {
        let inflight = self.inflight.lock();

        if inflight.generation != generation {
            tracing::debug!(
                "Dropping result of request #{} (current is #{})",
                generation,
                inflight.generation
            );
            return Outcome::Superseded;
        }

        let next = match result {
            Ok(snapshot) => {
                tracing::info!(
                    "Request #{} ready: {} ({})",
                    generation,
                    snapshot.display_location(),
                    snapshot.condition
                );
                RequestState::Ready(snapshot)
            }
            Err(err) => {
                tracing::warn!("Request #{} failed: {}", generation, err);
                RequestState::Error(err)
            }
        };

        self.state.send_replace(next);
        Outcome::Committed
    }
}
