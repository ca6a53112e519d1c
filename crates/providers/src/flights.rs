use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use wayfarer_core::FareQuote;

use crate::{
    ensure_success, FareProvider, FlightStatusProvider, LiveFlight, ProviderError, ProviderResult,
};

pub const AVIATIONSTACK_BASE_URL: &str = "https://api.aviationstack.com/v1";
pub const SKY_SCRAPPER_BASE_URL: &str = "https://sky-scrapper.p.rapidapi.com/api/v1";
const SKY_SCRAPPER_HOST: &str = "sky-scrapper.p.rapidapi.com";

/// Live flight status from AviationStack.
#[derive(Clone)]
pub struct AviationStackClient {
    access_key: String,
    base_url: String,
    client: Client,
}

impl AviationStackClient {
    pub fn new(access_key: impl Into<String>, base_url: impl Into<String>, client: Client) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    #[serde(default)]
    data: Vec<FlightRecord>,
}

#[derive(Debug, Deserialize)]
struct FlightRecord {
    #[serde(default)]
    flight_status: Option<String>,
    #[serde(default)]
    departure: Endpoint,
    #[serde(default)]
    arrival: Endpoint,
}

#[derive(Debug, Default, Deserialize)]
struct Endpoint {
    #[serde(default)]
    scheduled: Option<String>,
    #[serde(default)]
    gate: Option<String>,
    #[serde(default)]
    delay: Option<i64>,
}

#[async_trait]
impl FlightStatusProvider for AviationStackClient {
    async fn status(&self, flight_code: &str) -> ProviderResult<LiveFlight> {
        let response = self
            .client
            .get(format!("{}/flights", self.base_url))
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("flight_iata", flight_code),
            ])
            .send()
            .await?;

        let payload: StatusPayload = ensure_success(response).await?.json().await?;
        live_flight_from(payload)
    }
}

fn live_flight_from(payload: StatusPayload) -> ProviderResult<LiveFlight> {
    let record = payload
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Unavailable("flight not found".to_string()))?;

    let delay_minutes = record.departure.delay.unwrap_or(0).max(0);
    let status = if delay_minutes > 0 {
        "delayed".to_string()
    } else {
        record
            .flight_status
            .filter(|status| !status.trim().is_empty())
            .unwrap_or_else(|| "scheduled".to_string())
    };

    Ok(LiveFlight {
        status,
        departure_time: record.departure.scheduled.unwrap_or_default(),
        arrival_time: record.arrival.scheduled.unwrap_or_default(),
        gate: record.departure.gate.unwrap_or_default(),
        delay_minutes,
    })
}

/// Cheapest-fare search through the Sky-Scrapper RapidAPI.
#[derive(Clone)]
pub struct SkyScrapperClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl SkyScrapperClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl FareProvider for SkyScrapperClient {
    async fn cheapest(&self, from: &str, to: &str, date: &str) -> ProviderResult<FareQuote> {
        let response = self
            .client
            .get(format!("{}/flights/searchFlights", self.base_url))
            .query(&[
                ("originSkyId", from),
                ("destinationSkyId", to),
                ("originEntityId", from),
                ("destinationEntityId", to),
                ("date", date),
                ("adults", "1"),
                ("currency", "THB"),
                ("market", "TH"),
                ("locale", "en-US"),
            ])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", SKY_SCRAPPER_HOST)
            .send()
            .await?;

        let payload: Value = ensure_success(response).await?.json().await?;
        cheapest_itinerary(&payload)
    }
}

/// Lowest positive price across itineraries, with its first marketing
/// carrier. Malformed itineraries are skipped.
fn cheapest_itinerary(payload: &Value) -> ProviderResult<FareQuote> {
    let itineraries = payload
        .pointer("/data/itineraries")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Parse("missing data.itineraries".to_string()))?;

    itineraries
        .iter()
        .filter_map(|itinerary| {
            let price = itinerary.pointer("/price/raw").and_then(Value::as_f64)?.trunc();
            if price <= 0.0 {
                return None;
            }
            let airline = itinerary
                .pointer("/legs/0/carriers/marketing/0/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(FareQuote { price, airline })
        })
        .min_by(|a, b| a.price.total_cmp(&b.price))
        .ok_or_else(|| ProviderError::Unavailable("no priced itineraries".to_string()))
}
