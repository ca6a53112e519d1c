//! Per-domain travel agents and the orchestrator that routes chat messages
//! to them.
//!
//! Every agent tries its optional collaborators first (data provider, cache,
//! language model) and falls back to the deterministic estimators in
//! `wayfarer-core`, so a fully offline [`Orchestrator`] still answers every
//! intent.

pub mod deadline;
pub mod error;
pub mod extractor;
pub mod flight;
pub mod hotel;
pub mod local;
pub mod orchestrator;
pub mod planner;
mod quote;
pub mod runtime;
pub mod settings;
pub mod visa;
pub mod weather;

pub use deadline::Deadline;
pub use error::{AgentError, OrchestratorError};
pub use extractor::IntentExtractor;
pub use flight::{FlightAgent, FlightTracker};
pub use hotel::{HotelAgent, HotelFinder};
pub use local::{LocalAgent, PlaceRecommender};
pub use orchestrator::{ChatOutcome, Orchestrator};
pub use planner::{Planner, PlannerAgent};
pub use runtime::{Capabilities, Collaborators, Runtime};
pub use settings::Settings;
pub use visa::{VisaAdvisor, VisaAgent};
pub use weather::{WeatherAgent, WeatherForecaster};
