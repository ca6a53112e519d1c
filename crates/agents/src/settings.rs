use std::env;
use std::time::Duration;

use wayfarer_llm::{OPENAI_BASE_URL, OPENAI_MODEL};
use wayfarer_providers::{
    AVIATIONSTACK_BASE_URL, GOOGLE_PLACES_BASE_URL, OPENWEATHER_BASE_URL, SKY_SCRAPPER_BASE_URL,
};

/// Runtime configuration. Every credential is optional; a missing key simply
/// disables that collaborator.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub flight_api_key: Option<String>,
    pub flight_base_url: String,
    pub fare_api_key: Option<String>,
    pub fare_base_url: String,
    pub places_api_key: Option<String>,
    pub places_base_url: String,
    /// `memory`, a sqlite URL, or unset for no cache.
    pub cache_url: Option<String>,
    pub request_deadline: Duration,
    pub provider_timeout: Duration,
    pub llm_timeout: Duration,
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::offline()
    }
}

impl Settings {
    /// No credentials and no cache: every answer comes from the estimators.
    pub fn offline() -> Self {
        Self {
            openai_api_key: None,
            openai_model: OPENAI_MODEL.to_string(),
            openai_base_url: OPENAI_BASE_URL.to_string(),
            weather_api_key: None,
            weather_base_url: OPENWEATHER_BASE_URL.to_string(),
            flight_api_key: None,
            flight_base_url: AVIATIONSTACK_BASE_URL.to_string(),
            fare_api_key: None,
            fare_base_url: SKY_SCRAPPER_BASE_URL.to_string(),
            places_api_key: None,
            places_base_url: GOOGLE_PLACES_BASE_URL.to_string(),
            cache_url: None,
            request_deadline: Duration::from_secs(30),
            provider_timeout: Duration::from_secs(10),
            llm_timeout: Duration::from_secs(20),
            rng_seed: None,
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::offline();

        Self {
            openai_api_key: secret("WAYFARER_OPENAI_API_KEY"),
            openai_model: env::var("WAYFARER_OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: env::var("WAYFARER_OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            weather_api_key: secret("WAYFARER_WEATHER_API_KEY"),
            weather_base_url: env::var("WAYFARER_WEATHER_URL").unwrap_or(defaults.weather_base_url),
            flight_api_key: secret("WAYFARER_FLIGHT_API_KEY"),
            flight_base_url: env::var("WAYFARER_FLIGHT_URL").unwrap_or(defaults.flight_base_url),
            fare_api_key: secret("WAYFARER_FARE_API_KEY"),
            fare_base_url: env::var("WAYFARER_FARE_URL").unwrap_or(defaults.fare_base_url),
            places_api_key: secret("WAYFARER_PLACES_API_KEY"),
            places_base_url: env::var("WAYFARER_PLACES_URL").unwrap_or(defaults.places_base_url),
            cache_url: secret("WAYFARER_CACHE_URL"),
            request_deadline: seconds("WAYFARER_DEADLINE_SECS", defaults.request_deadline),
            provider_timeout: seconds("WAYFARER_PROVIDER_TIMEOUT_SECS", defaults.provider_timeout),
            llm_timeout: seconds("WAYFARER_LLM_TIMEOUT_SECS", defaults.llm_timeout),
            rng_seed: env::var("WAYFARER_RNG_SEED")
                .ok()
                .and_then(|value| value.trim().parse().ok()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

fn secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn seconds(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}
