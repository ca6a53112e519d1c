use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use wayfarer_core::DayForecast;

use crate::{
    ensure_success, CurrentWeather, ForecastReport, ProviderError, ProviderResult,
    WeatherProvider,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// OpenWeatherMap current conditions and 5-day/3-hour forecast.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str, city: &str) -> ProviderResult<T> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        Ok(ensure_success(response).await?.json::<T>().await?)
    }
}

#[derive(Debug, Deserialize)]
struct Conditions {
    main: MainBlock,
    #[serde(default)]
    weather: Vec<WeatherBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherBlock {
    main: String,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    #[serde(default)]
    list: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    dt: i64,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<WeatherBlock>,
    #[serde(default)]
    pop: f64,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> ProviderResult<CurrentWeather> {
        let payload: Conditions = self.get("weather", city).await?;
        Ok(CurrentWeather {
            temperature: payload.main.temp,
            condition: first_condition(&payload.weather),
        })
    }

    async fn forecast(&self, city: &str, days: usize) -> ProviderResult<ForecastReport> {
        let payload: ForecastPayload = self.get("forecast", city).await?;
        summarize_forecast(&payload.list, days)
    }
}

fn first_condition(blocks: &[WeatherBlock]) -> String {
    blocks
        .first()
        .map(|block| block.main.clone())
        .unwrap_or_else(|| "Clear".to_string())
}

/// Keeps the first slot of each calendar day, up to `days` days.
fn summarize_forecast(slots: &[ForecastSlot], days: usize) -> ProviderResult<ForecastReport> {
    let mut picked: Vec<DayForecast> = Vec::with_capacity(days);

    for slot in slots {
        if picked.len() >= days {
            break;
        }

        let Some(at) = DateTime::from_timestamp(slot.dt, 0) else {
            continue;
        };
        let date = at.format("%Y-%m-%d").to_string();
        if picked.iter().any(|day| day.date == date) {
            continue;
        }

        picked.push(DayForecast {
            date,
            temperature: slot.main.temp,
            condition: first_condition(&slot.weather),
            rain_prob: slot.pop * 100.0,
        });
    }

    if picked.is_empty() {
        return Err(ProviderError::Unavailable("forecast list is empty".to_string()));
    }

    let rain_probability =
        picked.iter().map(|day| day.rain_prob).sum::<f64>() / picked.len() as f64;

    Ok(ForecastReport {
        days: picked,
        rain_probability,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn slots(value: serde_json::Value) -> Vec<ForecastSlot> {
        serde_json::from_value::<ForecastPayload>(value).unwrap().list
    }

    #[test]
    fn keeps_first_slot_per_day_and_averages_rain() {
        // 2026-06-01 00:00 UTC = 1780272000
        let list = slots(json!({
            "list": [
                { "dt": 1780272000, "main": { "temp": 24.0 }, "weather": [{ "main": "Rain" }], "pop": 0.9 },
                { "dt": 1780282800, "main": { "temp": 27.0 }, "weather": [{ "main": "Clouds" }], "pop": 0.1 },
                { "dt": 1780358400, "main": { "temp": 25.0 }, "weather": [], "pop": 0.5 },
                { "dt": 1780444800, "main": { "temp": 26.0 }, "weather": [{ "main": "Clear" }], "pop": 0.1 },
                { "dt": 1780531200, "main": { "temp": 30.0 }, "weather": [{ "main": "Clear" }], "pop": 0.0 }
            ]
        }));

        let report = summarize_forecast(&list, 3).unwrap();
        assert_eq!(report.days.len(), 3);
        assert_eq!(report.days[0].date, "2026-06-01");
        assert_eq!(report.days[0].condition, "Rain");
        assert_eq!(report.days[1].condition, "Clear");
        assert_eq!(report.days[2].temperature, 26.0);
        assert!((report.rain_probability - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_list_is_unavailable() {
        let result = summarize_forecast(&[], 3);
        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
    }
}
