use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use wayfarer_core::compose::{
    compose_budget, compose_flight, compose_hotels, compose_local, compose_trip_plan,
    compose_weather, TripSections, GENERAL_CHAT_REPLY, MISSING_FLIGHT_CODE_REPLY,
    PLAN_UPDATE_REPLY,
};
use wayfarer_core::{
    split_budget, BudgetPlan, Detection, DetectionSource, EntityBag, FareQuote, GeoPoint, HotelQuote,
    Intent, VisaRequirement, WeatherSummary,
};
use wayfarer_observability::AppMetrics;

use crate::deadline::Deadline;
use crate::error::{AgentError, OrchestratorError};
use crate::extractor::IntentExtractor;
use crate::flight::{FlightAgent, FlightTracker};
use crate::hotel::{HotelAgent, HotelFinder};
use crate::local::{LocalAgent, PlaceRecommender};
use crate::planner::{Planner, PlannerAgent};
use crate::runtime::{Capabilities, Collaborators, Runtime};
use crate::settings::Settings;
use crate::visa::{VisaAdvisor, VisaAgent};
use crate::weather::{WeatherAgent, WeatherForecaster};

pub const DEFAULT_DESTINATION: &str = "Unknown";
pub const DEFAULT_CITY: &str = "Bangkok";
pub const DEFAULT_DURATION_DAYS: u32 = 7;
pub const DEFAULT_BUDGET: f64 = 50_000.0;
pub const DEFAULT_NIGHTLY_BUDGET: f64 = 3_000.0;
pub const DEFAULT_INTEREST: &str = "restaurant";

const TRIP_PLACES_KEYWORD: &str = "tourist attractions";
const TRIP_PLACES_LIMIT: usize = 5;
const LOCAL_PLACES_LIMIT: usize = 3;
/// Slack on top of the request deadline before the whole request is abandoned.
const DEADLINE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub intent: Intent,
    pub entities: EntityBag,
    pub source: DetectionSource,
}

/// Routes a message to the agents its intent needs and renders one reply.
pub struct Orchestrator {
    pub(crate) runtime: Arc<Runtime>,
    pub(crate) extractor: IntentExtractor,
    pub(crate) planner: Arc<dyn Planner>,
    pub(crate) weather: Arc<dyn WeatherForecaster>,
    pub(crate) hotels: Arc<dyn HotelFinder>,
    pub(crate) flights: Arc<dyn FlightTracker>,
    local: Arc<dyn PlaceRecommender>,
    visa: Arc<dyn VisaAdvisor>,
    request_deadline: Duration,
    branch_timeout: Duration,
    rng_seed: Option<u64>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, metrics: Arc<AppMetrics>, settings: &Settings) -> Self {
        let runtime = Arc::new(Runtime::new(collaborators, metrics, settings));

        Self {
            extractor: IntentExtractor::new(runtime.clone()),
            planner: Arc::new(PlannerAgent::new(runtime.clone())),
            weather: Arc::new(WeatherAgent::new(runtime.clone())),
            hotels: Arc::new(HotelAgent::new(runtime.clone())),
            flights: Arc::new(FlightAgent::new(runtime.clone())),
            local: Arc::new(LocalAgent::new(runtime.clone())),
            visa: Arc::new(VisaAgent::new(runtime.clone())),
            runtime,
            request_deadline: settings.request_deadline,
            branch_timeout: settings.llm_timeout.max(settings.provider_timeout),
            rng_seed: settings.rng_seed,
        }
    }

    /// Wires every collaborator the settings carry credentials for.
    pub async fn from_settings(settings: &Settings, metrics: Arc<AppMetrics>) -> anyhow::Result<Self> {
        let collaborators = Collaborators::from_settings(settings).await?;
        Ok(Self::new(collaborators, metrics, settings))
    }

    /// Offline orchestrator: estimators only.
    pub fn offline(settings: &Settings) -> Self {
        Self::new(Collaborators::none(), AppMetrics::shared(), settings)
    }

    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherForecaster>) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_hotels(mut self, hotels: Arc<dyn HotelFinder>) -> Self {
        self.hotels = hotels;
        self
    }

    pub fn with_flights(mut self, flights: Arc<dyn FlightTracker>) -> Self {
        self.flights = flights;
        self
    }

    pub fn with_local(mut self, local: Arc<dyn PlaceRecommender>) -> Self {
        self.local = local;
        self
    }

    pub fn with_visa(mut self, visa: Arc<dyn VisaAdvisor>) -> Self {
        self.visa = visa;
        self
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.runtime.metrics
    }

    pub fn spawn_cache_purge(&self, every: Duration) -> Option<JoinHandle<()>> {
        self.runtime.spawn_cache_purge(every)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.runtime.collaborators.capabilities()
    }

    pub(crate) fn deadline(&self) -> Deadline {
        Deadline::after(self.request_deadline)
    }

    pub(crate) fn request_rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub async fn process_message(&self, text: &str) -> Result<String, OrchestratorError> {
        self.handle(text).await.map(|outcome| outcome.reply)
    }

    #[instrument(skip(self, text), fields(request_id = %Uuid::new_v4()))]
    pub async fn handle(&self, text: &str) -> Result<ChatOutcome, OrchestratorError> {
        let started = Instant::now();
        self.runtime.metrics.inc_request();
        debug!(state = "received", chars = text.chars().count());

        let deadline = self.deadline();
        let outcome = self.within_deadline(self.route(text, deadline)).await;

        self.runtime.metrics.observe_latency(started.elapsed());
        let outcome = outcome?;
        info!(
            state = "composed",
            intent = %outcome.intent,
            source = ?outcome.source,
            latency_ms = started.elapsed().as_millis() as u64,
            "chat handled"
        );

        Ok(outcome)
    }

    /// Abandons `call` once the request deadline plus grace has passed.
    pub(crate) async fn within_deadline<T, F>(&self, call: F) -> Result<T, OrchestratorError>
    where
        F: Future<Output = Result<T, OrchestratorError>>,
    {
        tokio::time::timeout(self.request_deadline + DEADLINE_GRACE, call)
            .await
            .map_err(|_| OrchestratorError::DeadlineExceeded(self.request_deadline))?
    }

    async fn route(&self, text: &str, deadline: Deadline) -> Result<ChatOutcome, OrchestratorError> {
        let detection = self.extractor.detect(text, deadline).await;
        debug!(
            state = "classified",
            intent = %detection.intent,
            source = ?detection.source,
            has_entities = !detection.entities.is_empty()
        );

        let mut rng = self.request_rng();
        debug!(state = "dispatched", intent = %detection.intent);
        let reply = self.dispatch(&detection, deadline, &mut rng).await?;

        Ok(ChatOutcome {
            reply,
            intent: detection.intent,
            entities: detection.entities,
            source: detection.source,
        })
    }

    async fn dispatch(
        &self,
        detection: &Detection,
        deadline: Deadline,
        rng: &mut StdRng,
    ) -> Result<String, OrchestratorError> {
        let entities = &detection.entities;

        match detection.intent {
            Intent::PlanTrip => self.plan_trip(entities, deadline, rng).await,
            Intent::WeatherCheck => {
                let city = entities.destination_or(DEFAULT_CITY);
                let forecast = self
                    .weather
                    .get_forecast(&city, deadline)
                    .await
                    .map_err(OrchestratorError::required("weather"))?;
                Ok(compose_weather(&city, &forecast))
            }
            Intent::FlightCheck => {
                let Some(code) = entities.flight_code() else {
                    return Ok(MISSING_FLIGHT_CODE_REPLY.to_string());
                };
                let status = self
                    .flights
                    .check_flight(code, deadline)
                    .await
                    .map_err(OrchestratorError::required("flight"))?;
                Ok(compose_flight(&status))
            }
            Intent::HotelSearch => {
                let destination = entities.destination_or(DEFAULT_CITY);
                let nightly_budget = entities.budget_or(DEFAULT_NIGHTLY_BUDGET);
                let hotels = self
                    .hotels
                    .search_hotels(&destination, nightly_budget, rng, deadline)
                    .await
                    .map_err(OrchestratorError::required("hotel"))?;
                Ok(compose_hotels(&destination, nightly_budget, &hotels))
            }
            Intent::LocalRecommendation => {
                let interest = entities.interest_or(DEFAULT_INTEREST);
                let point = entities.location_or(GeoPoint::DEFAULT);
                let places = self
                    .local
                    .get_recommendations(point, &interest, deadline)
                    .await
                    .map_err(OrchestratorError::required("local"))?;

                let destination = entities.destination();
                let popular = match destination {
                    Some(destination) => self
                        .best_effort(
                            "popular_places",
                            deadline,
                            self.local
                                .popular_places(&interest, destination, LOCAL_PLACES_LIMIT, deadline),
                        )
                        .await
                        .unwrap_or_default(),
                    None => Vec::new(),
                };
                Ok(compose_local(&interest, &places, destination, &popular))
            }
            Intent::BudgetInquiry => {
                let total = entities.budget_or(DEFAULT_BUDGET);
                Ok(compose_budget(total, &self.budget(total)))
            }
            Intent::PlanUpdate => Ok(PLAN_UPDATE_REPLY.to_string()),
            Intent::GeneralChat => Ok(GENERAL_CHAT_REPLY.to_string()),
        }
    }

    async fn plan_trip(
        &self,
        entities: &EntityBag,
        deadline: Deadline,
        rng: &mut StdRng,
    ) -> Result<String, OrchestratorError> {
        let destination = entities.destination_or(DEFAULT_DESTINATION);
        let duration = entities.duration_or(DEFAULT_DURATION_DAYS);
        let budget = entities.budget_or(DEFAULT_BUDGET);
        let nightly_budget = budget / f64::from(duration);
        let mut hotel_rng = StdRng::seed_from_u64(rng.gen());

        let (plan, weather, hotels, places) = tokio::join!(
            self.planner.create_plan(&destination, duration, budget, deadline),
            self.best_effort("weather", deadline, self.weather.get_forecast(&destination, deadline)),
            self.best_effort(
                "hotels",
                deadline,
                self.hotels
                    .search_hotels(&destination, nightly_budget, &mut hotel_rng, deadline),
            ),
            self.best_effort(
                "popular_places",
                deadline,
                self.local
                    .popular_places(TRIP_PLACES_KEYWORD, &destination, TRIP_PLACES_LIMIT, deadline),
            ),
        );
        let plan = plan.map_err(OrchestratorError::required("planner"))?;

        let hotels = hotels.unwrap_or_default();
        let places = places.unwrap_or_default();
        Ok(compose_trip_plan(&TripSections {
            destination: &destination,
            duration,
            budget,
            plan: &plan,
            weather: weather.as_ref(),
            hotels: &hotels,
            places: &places,
        }))
    }

    /// Runs an optional branch under its own timeout; failure only drops the
    /// branch's section.
    async fn best_effort<T, F>(&self, branch: &'static str, deadline: Deadline, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, AgentError>>,
    {
        match deadline.run(self.branch_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                warn!(branch, error = %err, "optional branch failed");
                None
            }
            Err(_) => {
                warn!(branch, "optional branch timed out");
                None
            }
        }
    }

    pub fn budget(&self, total: f64) -> BudgetPlan {
        split_budget(total as i64)
    }

    pub async fn visa(
        &self,
        nationality: &str,
        destination: &str,
        stay_days: u32,
        purpose: &str,
    ) -> Result<VisaRequirement, OrchestratorError> {
        self.within_deadline(async {
            self.visa
                .check_visa(nationality, destination, stay_days, purpose, self.deadline())
                .await
                .map_err(OrchestratorError::required("visa"))
        })
        .await
    }

    pub async fn fare(&self, from: &str, to: &str, date: &str) -> Result<FareQuote, OrchestratorError> {
        self.within_deadline(async {
            self.flights
                .cheapest_fare(from, to, date, self.deadline())
                .await
                .map_err(OrchestratorError::required("flight"))
        })
        .await
    }

    pub async fn hotel_price(&self, city: &str, nights: i64) -> Result<HotelQuote, OrchestratorError> {
        let mut rng = self.request_rng();
        self.within_deadline(async {
            self.hotels
                .hotel_price(city, nights, &mut rng)
                .await
                .map_err(OrchestratorError::required("hotel"))
        })
        .await
    }

    pub async fn weather_summary(
        &self,
        city: &str,
        month: &str,
    ) -> Result<WeatherSummary, OrchestratorError> {
        self.within_deadline(async {
            self.weather
                .weather_summary(city, month, self.deadline())
                .await
                .map_err(OrchestratorError::required("weather"))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> Orchestrator {
        Orchestrator::offline(&Settings::offline().with_seed(42))
    }

    #[tokio::test]
    async fn every_intent_gets_a_reply() {
        let orchestrator = offline();
        let messages = [
            "Plan a trip to Tokyo",
            "Is flight JL708 on time?",
            "Will it rain in Bangkok?",
            "Find a hotel in Seoul",
            "Any good ramen nearby?",
            "What can I do with 50000 baht budget?",
            "Please change my itinerary",
            "hello",
        ];

        for message in messages {
            let reply = orchestrator.process_message(message).await.unwrap();
            assert!(!reply.is_empty(), "empty reply for {message}");
        }
    }

    #[tokio::test]
    async fn flight_check_without_code_asks_for_one() {
        let reply = offline().process_message("please check flight").await.unwrap();
        assert_eq!(reply, MISSING_FLIGHT_CODE_REPLY);
    }

    #[tokio::test]
    async fn budget_inquiry_uses_default_total() {
        let outcome = offline().handle("how much does it cost?").await.unwrap();
        assert_eq!(outcome.intent, Intent::BudgetInquiry);
        assert!(outcome.reply.starts_with("# Budget Breakdown for 50000 THB"));
    }

    #[tokio::test]
    async fn seeded_requests_are_reproducible() {
        let orchestrator = offline();
        let first = orchestrator.process_message("Find a hotel in Tokyo").await.unwrap();
        let second = orchestrator.process_message("Find a hotel in Tokyo").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn requests_are_counted() {
        let orchestrator = offline();
        orchestrator.process_message("hello").await.unwrap();
        assert_eq!(orchestrator.metrics().snapshot().requests_total, 1);
    }
}
