use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wayfarer_agents::{
    AgentError, Collaborators, Deadline, Orchestrator, OrchestratorError, Planner, Settings,
    WeatherForecaster,
};
use wayfarer_core::{DetectionSource, Intent, TripPlan, WeatherForecast, WeatherSummary};
use wayfarer_llm::{CompletionRequest, LanguageModel, LlmError};
use wayfarer_observability::AppMetrics;

/// Answers intent-detection prompts with a fixed JSON body and fails every
/// other prompt so the agents fall back to their estimators.
struct DetectionOnlyModel {
    detection: String,
    calls: AtomicUsize,
}

impl DetectionOnlyModel {
    fn new(detection: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            detection: detection.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LanguageModel for DetectionOnlyModel {
    fn name(&self) -> &str {
        "detection-only"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.system.contains("intent detection") {
            Ok(self.detection.clone())
        } else {
            Err(LlmError::Transport("offline".to_string()))
        }
    }
}

struct BrokenPlanner;

#[async_trait]
impl Planner for BrokenPlanner {
    async fn create_plan(
        &self,
        _destination: &str,
        _duration: u32,
        _budget: f64,
        _deadline: Deadline,
    ) -> Result<TripPlan, AgentError> {
        Err(AgentError::unavailable("planner", "backend down"))
    }

    async fn update_plan(
        &self,
        current: &TripPlan,
        _condition: &str,
        _deadline: Deadline,
    ) -> Result<TripPlan, AgentError> {
        Ok(current.clone())
    }
}

/// Weather backend that either errors or never answers.
enum BadWeather {
    Failing,
    Stalled,
}

impl BadWeather {
    async fn answer<T>(&self) -> Result<T, AgentError> {
        match self {
            Self::Failing => Err(AgentError::unavailable("weather", "upstream 503")),
            Self::Stalled => std::future::pending().await,
        }
    }
}

#[async_trait]
impl WeatherForecaster for BadWeather {
    async fn get_forecast(&self, _city: &str, _deadline: Deadline) -> Result<WeatherForecast, AgentError> {
        self.answer().await
    }

    async fn weather_summary(
        &self,
        _city: &str,
        _month: &str,
        _deadline: Deadline,
    ) -> Result<WeatherSummary, AgentError> {
        self.answer().await
    }
}

fn day_sections(reply: &str) -> usize {
    reply.lines().filter(|line| line.starts_with("**Day ")).count()
}

fn settings() -> Settings {
    Settings::offline().with_seed(11)
}

fn offline() -> Orchestrator {
    Orchestrator::offline(&settings())
}

fn with_model(model: Arc<DetectionOnlyModel>) -> Orchestrator {
    Orchestrator::new(
        Collaborators::none().with_llm(model),
        AppMetrics::shared(),
        &settings(),
    )
}

#[tokio::test]
async fn rules_route_every_intent() {
    let orchestrator = offline();
    let cases = [
        ("Plan a trip to Tokyo", Intent::PlanTrip),
        ("Is flight JL708 on time?", Intent::FlightCheck),
        ("Will it rain in Bangkok?", Intent::WeatherCheck),
        ("Find a hotel in Seoul", Intent::HotelSearch),
        ("Any good restaurant nearby?", Intent::LocalRecommendation),
        ("How much does it cost?", Intent::BudgetInquiry),
        ("Please change my itinerary", Intent::PlanUpdate),
        ("hello there", Intent::GeneralChat),
    ];

    for (text, expected) in cases {
        let outcome = orchestrator.handle(text).await.unwrap();
        assert_eq!(outcome.intent, expected, "wrong intent for {text}");
        assert_eq!(outcome.source, DetectionSource::Rules);
        assert!(!outcome.reply.is_empty(), "empty reply for {text}");
    }
}

#[tokio::test]
async fn empty_message_is_general_chat() {
    let outcome = offline().handle("").await.unwrap();
    assert_eq!(outcome.intent, Intent::GeneralChat);
    assert!(!outcome.reply.is_empty());
}

#[tokio::test]
async fn budget_inquiry_breaks_down_default_total() {
    let reply = offline()
        .process_message("What is the price range?")
        .await
        .unwrap();

    assert!(reply.starts_with("# Budget Breakdown for 50000 THB"));
    assert!(reply.contains("22500"));
}

#[tokio::test]
async fn model_detection_drives_trip_plan() {
    let model = DetectionOnlyModel::new(serde_json::json!({
        "intent": "plan_trip",
        "entities": { "destination": "Tokyo", "duration": 3, "budget": 60000 }
    }));
    let orchestrator = with_model(model.clone());

    let outcome = orchestrator
        .handle("I'd love three days in Tokyo")
        .await
        .unwrap();

    assert_eq!(outcome.intent, Intent::PlanTrip);
    assert_eq!(outcome.source, DetectionSource::Model);
    assert!(outcome.reply.starts_with("# 3-Day Trip to Tokyo"));
    assert!(outcome.reply.contains("**Day 3:**"));
    assert!(!outcome.reply.contains("**Day 4:**"));
    assert!(model.calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn unknown_model_intent_falls_back_to_rules() {
    let model = DetectionOnlyModel::new(serde_json::json!({
        "intent": "book_spaceship",
        "entities": {}
    }));
    let orchestrator = with_model(model);

    let outcome = orchestrator
        .handle("Please change my itinerary")
        .await
        .unwrap();

    assert_eq!(outcome.intent, Intent::PlanUpdate);
    assert_eq!(outcome.source, DetectionSource::Rules);
    assert_eq!(orchestrator.metrics().snapshot().fallback_total, 1);
}

#[tokio::test]
async fn failing_planner_fails_the_trip_request() {
    let orchestrator = offline().with_planner(Arc::new(BrokenPlanner));

    let err = orchestrator.handle("Plan a trip").await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::RequiredAgent { agent: "planner", .. }
    ));

    let reply = orchestrator.process_message("hello").await.unwrap();
    assert!(!reply.is_empty());
}

#[tokio::test]
async fn same_seed_same_reply() {
    let first = offline().process_message("Plan a trip").await.unwrap();
    let second = offline().process_message("Plan a trip").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn quote_combines_fare_and_hotel() {
    let quote = offline().quote_trip("hello").await.unwrap();

    assert_eq!(quote.destination, "Unknown");
    assert_eq!(quote.duration, 7);
    assert!((quote.flight_price + quote.hotel_total - quote.total).abs() < 1e-6);
    assert!(quote.message.contains("THB"));
}

#[tokio::test]
async fn tokyo_request_on_keyword_path_plans_default_week() {
    let reply = offline()
        .process_message("I want to visit Tokyo for 5 days with 80000 baht")
        .await
        .unwrap();

    assert_eq!(day_sections(&reply), 7);
    assert!(reply.contains("**Budget:** 50000 THB"));
    assert_eq!(reply.matches("*Daily Budget: 7143 THB*").count(), 7);
}

#[tokio::test]
async fn tokyo_request_with_model_entities_plans_five_days() {
    let model = DetectionOnlyModel::new(serde_json::json!({
        "intent": "plan_trip",
        "entities": { "destination": "Tokyo", "duration": 5, "budget": 80000 }
    }));
    let reply = with_model(model)
        .process_message("I want to visit Tokyo for 5 days with 80000 baht")
        .await
        .unwrap();

    assert!(reply.starts_with("# 5-Day Trip to Tokyo"));
    assert_eq!(day_sections(&reply), 5);
    assert!(reply.contains("**Budget:** 80000 THB"));
    assert_eq!(reply.matches("*Daily Budget: 16000 THB*").count(), 5);
}

#[tokio::test]
async fn budget_question_gets_exact_breakdown() {
    let reply = offline()
        .process_message("What can I do with 50000 baht budget?")
        .await
        .unwrap();

    assert_eq!(
        reply,
        "# Budget Breakdown for 50000 THB\n\n\
         - **Flights:** 22500 THB (45%)\n\
         - **Hotels:** 12500 THB (25%)\n\
         - **Food:** 7500 THB (15%)\n\
         - **Transport:** 5000 THB (10%)\n\
         - **Miscellaneous:** 2500 THB (5%)\n\
         \n**Total:** 50000 THB\n"
    );
}

#[tokio::test]
async fn failed_weather_branch_drops_only_its_section() {
    let orchestrator = offline().with_weather(Arc::new(BadWeather::Failing));

    let reply = orchestrator.process_message("Plan a trip").await.unwrap();

    assert!(!reply.contains("## Weather Forecast"));
    let itinerary = reply.find("## Itinerary").unwrap();
    let hotels = reply.find("## Recommended Hotels").unwrap();
    let summary = reply.rfind("## 7-Day Trip to Unknown").unwrap();
    assert!(itinerary < hotels && hotels < summary);
}

#[tokio::test(start_paused = true)]
async fn stalled_weather_branch_times_out_quietly() {
    let orchestrator = offline().with_weather(Arc::new(BadWeather::Stalled));

    let reply = orchestrator.process_message("Plan a trip").await.unwrap();

    assert!(!reply.contains("## Weather Forecast"));
    assert!(reply.contains("## Recommended Hotels"));
    assert_eq!(day_sections(&reply), 7);
}

#[tokio::test(start_paused = true)]
async fn stalled_required_agent_exceeds_the_deadline() {
    let mut settings = settings();
    settings.request_deadline = Duration::from_secs(5);
    let orchestrator = Orchestrator::offline(&settings).with_weather(Arc::new(BadWeather::Stalled));

    let err = orchestrator.handle("Will it rain in Bangkok?").await.unwrap_err();

    assert!(matches!(err, OrchestratorError::DeadlineExceeded(limit) if limit == Duration::from_secs(5)));
    assert_eq!(orchestrator.metrics().snapshot().requests_total, 1);
}
