use chrono::{Datelike, Duration as ChronoDuration, Local};
use tracing::{info, instrument};
use uuid::Uuid;
use wayfarer_core::airports::HOME_AIRPORT;
use wayfarer_core::climate::month_name;
use wayfarer_core::{airport_code, split_budget, TripQuote};

use crate::error::OrchestratorError;
use crate::orchestrator::{Orchestrator, DEFAULT_BUDGET, DEFAULT_DESTINATION, DEFAULT_DURATION_DAYS};

/// Days between today and the assumed departure.
const DEPARTURE_LEAD_DAYS: i64 = 30;

impl Orchestrator {
    /// One-shot cost estimate: return fare from home, hotel for the whole
    /// stay and the expected weather in the departure month.
    #[instrument(skip(self, text), fields(request_id = %Uuid::new_v4()))]
    pub async fn quote_trip(&self, text: &str) -> Result<TripQuote, OrchestratorError> {
        self.within_deadline(self.quote(text)).await
    }

    async fn quote(&self, text: &str) -> Result<TripQuote, OrchestratorError> {
        let deadline = self.deadline();
        let detection = self.extractor.detect(text, deadline).await;
        let entities = &detection.entities;

        let destination = entities.destination_or(DEFAULT_DESTINATION);
        let duration = entities.duration_or(DEFAULT_DURATION_DAYS);
        let budget = entities.budget_or(DEFAULT_BUDGET);

        let departure = Local::now().date_naive() + ChronoDuration::days(DEPARTURE_LEAD_DAYS);
        let departure_date = departure.format("%Y-%m-%d").to_string();
        let code = airport_code(&destination);
        let mut rng = self.request_rng();

        let fare = self
            .flights
            .cheapest_fare(HOME_AIRPORT, code, &departure_date, deadline)
            .await
            .map_err(OrchestratorError::required("flight"))?;
        let hotel = self
            .hotels
            .hotel_price(&destination, i64::from(duration), &mut rng)
            .await
            .map_err(OrchestratorError::required("hotel"))?;
        let weather = self
            .weather
            .weather_summary(&destination, month_name(departure.month()), deadline)
            .await
            .map_err(OrchestratorError::required("weather"))?;

        let total = fare.price + hotel.price;
        let message = format!(
            "{duration}-day trip to {destination}: {} flight from {HOME_AIRPORT} to {code} at {:.0} THB, \
             {} for {:.0} THB, expected {:.0}°C and {}. Estimated total {total:.0} THB.",
            fare.airline,
            fare.price,
            hotel.name,
            hotel.price,
            weather.avg_temp,
            weather.condition.to_lowercase()
        );
        info!(destination = %destination, total, "trip quoted");

        Ok(TripQuote {
            destination,
            airport_code: code.to_string(),
            duration,
            budget: split_budget(budget as i64),
            flight_price: fare.price,
            airline: fare.airline,
            departure_date,
            hotel_total: hotel.price,
            hotel_per_night: hotel.price / f64::from(duration.max(1)),
            hotel_name: hotel.name,
            weather,
            total,
            message,
        })
    }
}
