use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration as ChronoDuration, Local};
use tracing::{info, instrument};
use wayfarer_core::climate::{estimate_condition, estimate_temperature, month_name, DEFAULT_TEMPERATURE};
use wayfarer_core::compose::RAIN_ALERT_THRESHOLD;
use wayfarer_core::{estimate_weather, normalize_month, DayForecast, WeatherForecast, WeatherSummary};
use wayfarer_llm::CompletionRequest;

use crate::deadline::Deadline;
use crate::error::AgentError;
use crate::runtime::Runtime;

const FORECAST_DAYS: usize = 3;
const SUGGESTION_SYSTEM: &str =
    "You are a helpful weather advisor. Provide brief, friendly indoor activity suggestions.";
const FAIR_WEATHER_SUGGESTION: &str = "Weather looks good for outdoor activities!";

#[async_trait]
pub trait WeatherForecaster: Send + Sync {
    async fn get_forecast(&self, city: &str, deadline: Deadline) -> Result<WeatherForecast, AgentError>;

    async fn weather_summary(
        &self,
        city: &str,
        month: &str,
        deadline: Deadline,
    ) -> Result<WeatherSummary, AgentError>;
}

pub struct WeatherAgent {
    runtime: Arc<Runtime>,
}

impl WeatherAgent {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    async fn live_forecast(&self, city: &str, deadline: Deadline) -> Option<(Vec<DayForecast>, f64)> {
        let provider = self.runtime.collaborators.weather.as_ref()?;
        let report = self
            .runtime
            .call_provider(deadline, "weather_forecast", provider.forecast(city, FORECAST_DAYS))
            .await?;

        if report.days.is_empty() {
            return None;
        }
        Some((report.days, report.rain_probability))
    }

    async fn suggestion(&self, city: &str, rain_prob: f64, deadline: Deadline) -> String {
        if rain_prob <= RAIN_ALERT_THRESHOLD {
            return FAIR_WEATHER_SUGGESTION.to_string();
        }

        let prompt = format!(
            "You are WeatherAgent. There's a {rain_prob:.0}% chance of rain in {city}.\n\
             Recommend 2-3 indoor activities suitable for rainy weather. Keep it brief and friendly."
        );
        let request = CompletionRequest::new(SUGGESTION_SYSTEM, prompt)
            .temperature(0.7)
            .max_tokens(150);

        match self.runtime.ask_llm(deadline, "rain_suggestion", request).await {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => format!(
                "High chance of rain ({rain_prob:.0}%). Consider indoor activities like museums, shopping malls, or indoor entertainment."
            ),
        }
    }
}

#[async_trait]
impl WeatherForecaster for WeatherAgent {
    #[instrument(skip(self, deadline))]
    async fn get_forecast(&self, city: &str, deadline: Deadline) -> Result<WeatherForecast, AgentError> {
        let (days, rain_prob) = match self.live_forecast(city, deadline).await {
            Some(live) => live,
            None => {
                self.runtime.metrics.inc_fallback();
                estimated_forecast(city)
            }
        };

        let (temperature, condition) = days
            .first()
            .map(|day| (day.temperature, day.condition.clone()))
            .unwrap_or((DEFAULT_TEMPERATURE, String::new()));
        let suggestion = self.suggestion(city, rain_prob, deadline).await;

        info!(rain_probability = rain_prob, "forecast ready");
        Ok(WeatherForecast {
            city: city.to_string(),
            temperature,
            condition,
            rain_prob,
            forecast: days,
            suggestion,
        })
    }

    #[instrument(skip(self, deadline))]
    async fn weather_summary(
        &self,
        city: &str,
        month: &str,
        deadline: Deadline,
    ) -> Result<WeatherSummary, AgentError> {
        if city.trim().is_empty() {
            return Ok(estimate_weather("", month));
        }

        let month = normalize_month(month);
        let key = format!("weather:{}:{}", city.trim().to_lowercase(), month);
        if let Some(summary) = self.runtime.cache_get_json::<WeatherSummary>(&key).await {
            return Ok(summary);
        }

        let mut summary = None;
        if let Some(provider) = self.runtime.collaborators.weather.as_ref() {
            summary = self
                .runtime
                .call_provider(deadline, "weather_current", provider.current(city))
                .await
                .map(|current| WeatherSummary {
                    avg_temp: current.temperature,
                    condition: current.condition,
                });
        }

        let summary = match summary {
            Some(summary) => summary,
            None => {
                self.runtime.metrics.inc_fallback();
                estimate_weather(city, month)
            }
        };

        self.runtime.cache_put_json(&key, &summary).await;
        Ok(summary)
    }
}

/// Three days from today around the current month's average temperature.
fn estimated_forecast(city: &str) -> (Vec<DayForecast>, f64) {
    let today = Local::now().date_naive();
    let month = month_name(today.month());
    let base = estimate_temperature(city, month);
    let condition = estimate_condition(city, month);
    let rain_prob = condition.rain_probability();

    let days = (0..FORECAST_DAYS)
        .map(|offset| DayForecast {
            date: (today + ChronoDuration::days(offset as i64)).format("%Y-%m-%d").to_string(),
            temperature: base + offset as f64 - 1.0,
            condition: condition.as_str().to_string(),
            rain_prob,
        })
        .collect();

    (days, rain_prob)
}
