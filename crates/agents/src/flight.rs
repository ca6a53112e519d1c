use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use tracing::{info, instrument};
use wayfarer_core::{estimate_fare, FareQuote, FlightStatus};
use wayfarer_llm::CompletionRequest;
use wayfarer_providers::LiveFlight;

use crate::deadline::Deadline;
use crate::error::AgentError;
use crate::runtime::Runtime;

const NOTIFICATION_SYSTEM: &str =
    "You are a professional airline notification system. Generate polite, brief delay notifications.";

#[async_trait]
pub trait FlightTracker: Send + Sync {
    async fn check_flight(&self, code: &str, deadline: Deadline) -> Result<FlightStatus, AgentError>;

    async fn cheapest_fare(
        &self,
        from: &str,
        to: &str,
        date: &str,
        deadline: Deadline,
    ) -> Result<FareQuote, AgentError>;
}

pub struct FlightAgent {
    runtime: Arc<Runtime>,
}

impl FlightAgent {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    async fn live_status(&self, code: &str, deadline: Deadline) -> Option<FlightStatus> {
        let provider = self.runtime.collaborators.flights.as_ref()?;
        let live = self
            .runtime
            .call_provider(deadline, "flight_status", provider.status(code))
            .await?;
        Some(from_live(code, live))
    }

    async fn notification(&self, status: &FlightStatus, deadline: Deadline) -> String {
        if !status.is_delayed() {
            return format!("Flight {} is {}.", status.flight_code, status.status);
        }

        let prompt = format!(
            "You are FlightAgent. Flight {} is delayed by {} minutes.\n\
             Write a polite, brief notification for the passenger with the flight code, \
             the delay, an apology and one line of advice.",
            status.flight_code, status.delay_minutes
        );
        let request = CompletionRequest::new(NOTIFICATION_SYSTEM, prompt)
            .temperature(0.7)
            .max_tokens(100);

        match self.runtime.ask_llm(deadline, "delay_notification", request).await {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => delay_template(status),
        }
    }
}

#[async_trait]
impl FlightTracker for FlightAgent {
    #[instrument(skip(self, deadline))]
    async fn check_flight(&self, code: &str, deadline: Deadline) -> Result<FlightStatus, AgentError> {
        let mut status = match self.live_status(code, deadline).await {
            Some(status) => status,
            None => {
                self.runtime.metrics.inc_fallback();
                mock_status(code)
            }
        };

        status.notification = self.notification(&status, deadline).await;
        info!(
            flight = %status.flight_code,
            status = %status.status,
            delay_minutes = status.delay_minutes,
            "flight checked"
        );

        Ok(status)
    }

    #[instrument(skip(self, deadline))]
    async fn cheapest_fare(
        &self,
        from: &str,
        to: &str,
        date: &str,
        deadline: Deadline,
    ) -> Result<FareQuote, AgentError> {
        let key = format!(
            "fare:{}:{}:{}",
            from.trim().to_lowercase(),
            to.trim().to_lowercase(),
            date.trim()
        );
        if let Some(quote) = self.runtime.cache_get_json::<FareQuote>(&key).await {
            return Ok(quote);
        }

        let mut quote = None;
        if let Some(provider) = self.runtime.collaborators.fares.as_ref() {
            if is_searchable(from, to, date) {
                quote = self
                    .runtime
                    .call_provider(deadline, "fare_search", provider.cheapest(from, to, date))
                    .await
                    .filter(|quote| quote.price > 0.0 && !quote.airline.is_empty());
            }
        }

        let quote = match quote {
            Some(quote) => quote,
            None => {
                self.runtime.metrics.inc_fallback();
                estimate_fare(from, to)
            }
        };

        self.runtime.cache_put_json(&key, &quote).await;
        Ok(quote)
    }
}

fn is_searchable(from: &str, to: &str, date: &str) -> bool {
    !from.trim().is_empty()
        && !to.trim().is_empty()
        && NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").is_ok()
}

fn from_live(code: &str, live: LiveFlight) -> FlightStatus {
    FlightStatus {
        flight_code: code.to_string(),
        status: live.status,
        departure_time: live.departure_time,
        arrival_time: live.arrival_time,
        gate: live.gate,
        delay_minutes: live.delay_minutes,
        notification: String::new(),
    }
}

/// Codes starting at `J` or later are reported 30 minutes late.
fn mock_status(code: &str) -> FlightStatus {
    let delayed = code.as_bytes().first().is_some_and(|first| *first >= b'J');
    let now = Local::now();

    FlightStatus {
        flight_code: code.to_string(),
        status: if delayed { "delayed" } else { "on-time" }.to_string(),
        departure_time: (now + ChronoDuration::hours(2)).format("%Y-%m-%d %H:%M").to_string(),
        arrival_time: (now + ChronoDuration::hours(6)).format("%Y-%m-%d %H:%M").to_string(),
        gate: "A12".to_string(),
        delay_minutes: if delayed { 30 } else { 0 },
        notification: String::new(),
    }
}

fn delay_template(status: &FlightStatus) -> String {
    format!(
        "Your flight {} is delayed by {} minutes. New departure time: {}. Please check the gate information.",
        status.flight_code, status.delay_minutes, status.departure_time
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use wayfarer_providers::{FareProvider, FlightStatusProvider, ProviderError, ProviderResult};
    use wayfarer_storage::MemoryCache;

    use super::*;
    use crate::runtime::test_support::{runtime, ScriptedModel};
    use crate::runtime::Collaborators;

    struct FixedFlight;

    #[async_trait]
    impl FlightStatusProvider for FixedFlight {
        async fn status(&self, _code: &str) -> ProviderResult<LiveFlight> {
            Ok(LiveFlight {
                status: "delayed".to_string(),
                departure_time: "2026-11-01T10:00:00+00:00".to_string(),
                arrival_time: "2026-11-01T16:00:00+00:00".to_string(),
                gate: "C3".to_string(),
                delay_minutes: 45,
            })
        }
    }

    struct DownFares;

    #[async_trait]
    impl FareProvider for DownFares {
        async fn cheapest(&self, _from: &str, _to: &str, _date: &str) -> ProviderResult<FareQuote> {
            Err(ProviderError::Status {
                status: 503,
                body: "maintenance".to_string(),
            })
        }
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn mock_marks_late_letters_as_delayed() {
        let agent = FlightAgent::new(runtime(Collaborators::none()));

        let delayed = agent.check_flight("JL708", deadline()).await.unwrap();
        assert_eq!(delayed.status, "delayed");
        assert_eq!(delayed.delay_minutes, 30);
        assert_eq!(delayed.gate, "A12");
        assert!(delayed.notification.starts_with("Your flight JL708 is delayed by 30 minutes."));

        let on_time = agent.check_flight("CX700", deadline()).await.unwrap();
        assert_eq!(on_time.status, "on-time");
        assert_eq!(on_time.notification, "Flight CX700 is on-time.");
    }

    #[tokio::test]
    async fn live_status_wins_and_uses_model_notification() {
        let model = ScriptedModel::replying(vec!["We're sorry, TG640 leaves 45 minutes late."]);
        let agent = FlightAgent::new(runtime(
            Collaborators::none()
                .with_flights(Arc::new(FixedFlight))
                .with_llm(model),
        ));

        let status = agent.check_flight("TG640", deadline()).await.unwrap();
        assert_eq!(status.gate, "C3");
        assert_eq!(status.delay_minutes, 45);
        assert_eq!(status.notification, "We're sorry, TG640 leaves 45 minutes late.");
    }

    #[tokio::test]
    async fn fare_falls_back_to_route_table() {
        let agent = FlightAgent::new(runtime(
            Collaborators::none().with_fares(Arc::new(DownFares)),
        ));

        let quote = agent.cheapest_fare("BKK", "NRT", "2026-11-16", deadline()).await.unwrap();
        assert_eq!(quote.price, 15_000.0);
        assert_eq!(quote.airline, "Thai Airways");
    }

    #[tokio::test]
    async fn fare_is_cached_under_normalized_key() {
        let cache = Arc::new(MemoryCache::new());
        let agent = FlightAgent::new(runtime(Collaborators::none().with_cache(cache.clone())));

        agent.cheapest_fare("BKK", "ICN", "2026-11-16", deadline()).await.unwrap();
        assert_eq!(cache.len(), 1);
        let again = agent.cheapest_fare("bkk", "icn", "2026-11-16", deadline()).await.unwrap();
        assert_eq!(again.price, 12_000.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn search_requires_iso_date() {
        assert!(is_searchable("BKK", "NRT", "2026-11-16"));
        assert!(!is_searchable("BKK", "NRT", "16/11/2026"));
        assert!(!is_searchable("", "NRT", "2026-11-16"));
    }
}
