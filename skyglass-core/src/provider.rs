use crate::{Config, Coordinates, ShellError, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod openweather;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Status and raw body of one provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP seam. `Err` means no response arrived at all.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<HttpReply>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    http: Client,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<HttpReply> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .context("Failed to read weather response body")?;

        Ok(HttpReply { status, body })
    }
}

/// Current-weather lookups, normalized into a [`WeatherSnapshot`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, ShellError>;

    async fn current_by_city(&self, city: &str) -> Result<WeatherSnapshot, ShellError>;
}

/// Construct the OpenWeatherMap provider from config.
///
/// A missing API key is not an error here: the provider reports
/// [`ShellError::MissingCredential`] on every lookup instead.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let transport = ReqwestTransport::new(config.base_url(), config.timeout())?;

    Ok(Arc::new(OpenWeatherProvider::new(
        config.resolved_api_key(),
        Arc::new(transport),
    )))
}
