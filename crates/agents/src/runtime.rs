use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use wayfarer_llm::{CompletionRequest, LanguageModel, OpenAiChatModel, OpenAiConfig};
use wayfarer_observability::AppMetrics;
use wayfarer_providers::{
    AviationStackClient, FareProvider, FlightStatusProvider, GooglePlacesClient,
    OpenWeatherClient, PlacesProvider, ProviderResult, SkyScrapperClient, WeatherProvider,
};
use wayfarer_storage::{Cache, CacheStore};

use crate::deadline::Deadline;
use crate::settings::Settings;

pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// The optional external dependencies, resolved once at startup. `None`
/// means "not configured" and routes every caller to its fallback.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub llm: Option<Arc<dyn LanguageModel>>,
    pub weather: Option<Arc<dyn WeatherProvider>>,
    pub flights: Option<Arc<dyn FlightStatusProvider>>,
    pub fares: Option<Arc<dyn FareProvider>>,
    pub places: Option<Arc<dyn PlacesProvider>>,
    pub cache: Option<Arc<dyn Cache>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub llm: bool,
    pub weather: bool,
    pub flights: bool,
    pub fares: bool,
    pub places: bool,
    pub cache: bool,
}

impl Collaborators {
    pub fn none() -> Self {
        Self::default()
    }

    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed building shared http client")?;

        let mut collaborators = Self::none();

        if let Some(key) = &settings.openai_api_key {
            let config = OpenAiConfig {
                api_key: key.clone(),
                model: settings.openai_model.clone(),
                base_url: settings.openai_base_url.clone(),
            };
            collaborators.llm = Some(Arc::new(OpenAiChatModel::new(config, client.clone())));
        }
        if let Some(key) = &settings.weather_api_key {
            collaborators.weather = Some(Arc::new(OpenWeatherClient::new(
                key.clone(),
                settings.weather_base_url.clone(),
                client.clone(),
            )));
        }
        if let Some(key) = &settings.flight_api_key {
            collaborators.flights = Some(Arc::new(AviationStackClient::new(
                key.clone(),
                settings.flight_base_url.clone(),
                client.clone(),
            )));
        }
        if let Some(key) = &settings.fare_api_key {
            collaborators.fares = Some(Arc::new(SkyScrapperClient::new(
                key.clone(),
                settings.fare_base_url.clone(),
                client.clone(),
            )));
        }
        if let Some(key) = &settings.places_api_key {
            collaborators.places = Some(Arc::new(GooglePlacesClient::new(
                key.clone(),
                settings.places_base_url.clone(),
                client,
            )));
        }

        let store = match settings.cache_url.as_deref() {
            None => None,
            Some("memory") => Some(CacheStore::memory()),
            Some(url) => Some(CacheStore::sqlite(url).await?),
        };
        if let Some(store) = store {
            info!(backend = store.backend(), "cache configured");
            collaborators.cache = Some(Arc::new(store));
        }

        Ok(collaborators)
    }

    pub fn with_llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_flights(mut self, flights: Arc<dyn FlightStatusProvider>) -> Self {
        self.flights = Some(flights);
        self
    }

    pub fn with_fares(mut self, fares: Arc<dyn FareProvider>) -> Self {
        self.fares = Some(fares);
        self
    }

    pub fn with_places(mut self, places: Arc<dyn PlacesProvider>) -> Self {
        self.places = Some(places);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            llm: self.llm.is_some(),
            weather: self.weather.is_some(),
            flights: self.flights.is_some(),
            fares: self.fares.is_some(),
            places: self.places.is_some(),
            cache: self.cache.is_some(),
        }
    }
}

/// Shared by every agent: the collaborators plus the helpers that turn their
/// failures into `None`.
pub struct Runtime {
    pub collaborators: Collaborators,
    pub metrics: Arc<AppMetrics>,
    provider_timeout: Duration,
    llm_timeout: Duration,
}

impl Runtime {
    pub fn new(collaborators: Collaborators, metrics: Arc<AppMetrics>, settings: &Settings) -> Self {
        Self {
            collaborators,
            metrics,
            provider_timeout: settings.provider_timeout,
            llm_timeout: settings.llm_timeout,
        }
    }

    pub fn has_llm(&self) -> bool {
        self.collaborators.llm.is_some()
    }

    /// Runs one completion. Unconfigured, failed and timed-out calls all come
    /// back as `None`.
    pub async fn ask_llm(
        &self,
        deadline: Deadline,
        purpose: &'static str,
        request: CompletionRequest,
    ) -> Option<String> {
        let llm = self.collaborators.llm.as_ref()?;
        if deadline.is_expired() {
            debug!(purpose, "request deadline spent, skipping language model");
            return None;
        }
        self.metrics.inc_llm_call();

        match deadline.run(self.llm_timeout, llm.complete(&request)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(err)) => {
                self.metrics.inc_llm_failure();
                warn!(purpose, model = llm.name(), error = %err, "language model call failed");
                None
            }
            Err(_) => {
                self.metrics.inc_llm_failure();
                warn!(purpose, model = llm.name(), "language model call timed out");
                None
            }
        }
    }

    pub async fn call_provider<T, F>(&self, deadline: Deadline, what: &'static str, call: F) -> Option<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        match deadline.run(self.provider_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                self.metrics.inc_provider_failure();
                warn!(provider = what, error = %err, "provider call failed");
                None
            }
            Err(_) => {
                self.metrics.inc_provider_failure();
                warn!(provider = what, "provider call timed out");
                None
            }
        }
    }

    /// Periodically drops expired cache entries. `None` without a cache.
    pub fn spawn_cache_purge(&self, every: Duration) -> Option<JoinHandle<()>> {
        let cache = self.collaborators.cache.clone()?;

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match cache.purge_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "purged expired cache entries"),
                    Err(err) => warn!(error = %err, "cache purge failed"),
                }
            }
        }))
    }

    pub async fn cache_get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.collaborators.cache.as_ref()?;

        match cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.metrics.inc_cache_hit();
                    Some(value)
                }
                Err(err) => {
                    self.metrics.inc_cache_miss();
                    warn!(key, error = %err, "discarding unreadable cache entry");
                    None
                }
            },
            Ok(None) => {
                self.metrics.inc_cache_miss();
                debug!(key, "cache miss");
                None
            }
            Err(err) => {
                self.metrics.inc_cache_miss();
                warn!(key, error = %err, "cache read failed");
                None
            }
        }
    }

    pub async fn cache_put_json<T: Serialize>(&self, key: &str, value: &T) {
        let Some(cache) = self.collaborators.cache.as_ref() else {
            return;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "could not serialize cache entry");
                return;
            }
        };

        if let Err(err) = cache.set(key, &raw, CACHE_TTL).await {
            warn!(key, error = %err, "cache write failed");
        }
    }
}
