//! HTTP data providers behind small async traits.
//!
//! Every implementation reports deviations (transport errors, non-2xx,
//! unexpected payloads) as [`ProviderError`]; callers treat all of them as
//! "provider unavailable" and fall back to estimates.

use async_trait::async_trait;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use wayfarer_core::{DayForecast, FareQuote, SocialPlace};

mod flights;
mod places;
mod weather;

pub use flights::{
    AviationStackClient, SkyScrapperClient, AVIATIONSTACK_BASE_URL, SKY_SCRAPPER_BASE_URL,
};
pub use places::{GooglePlacesClient, DEFAULT_BASE_URL as GOOGLE_PLACES_BASE_URL};
pub use weather::{OpenWeatherClient, DEFAULT_BASE_URL as OPENWEATHER_BASE_URL};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider transport failed: {0}")]
    Transport(String),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected provider payload: {0}")]
    Parse(String),
    #[error("provider has no answer: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub condition: String,
}

/// Short-range forecast: one entry per calendar day plus the mean
/// precipitation probability (percent) across those days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub days: Vec<DayForecast>,
    pub rain_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFlight {
    pub status: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub gate: String,
    pub delay_minutes: i64,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> ProviderResult<CurrentWeather>;

    async fn forecast(&self, city: &str, days: usize) -> ProviderResult<ForecastReport>;
}

#[async_trait]
pub trait FlightStatusProvider: Send + Sync {
    async fn status(&self, flight_code: &str) -> ProviderResult<LiveFlight>;
}

#[async_trait]
pub trait FareProvider: Send + Sync {
    /// Cheapest one-way fare on `date` (`YYYY-MM-DD`).
    async fn cheapest(&self, from: &str, to: &str, date: &str) -> ProviderResult<FareQuote>;
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Places matching `keyword` in `location`, most-reviewed first.
    async fn top_rated(
        &self,
        keyword: &str,
        location: &str,
        limit: usize,
    ) -> ProviderResult<Vec<SocialPlace>>;
}

pub(crate) async fn ensure_success(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    debug!(url = %response.url(), status = status.as_u16(), "provider answered with an error status");
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: body.chars().take(512).collect(),
    })
}
