use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use wayfarer_core::entities::MAX_DURATION_DAYS;
use wayfarer_core::planner::{check_plan, rebalance_budget, PlanCheck};
use wayfarer_core::{build_trip_plan, TripPlan};
use wayfarer_llm::{parse_json, CompletionRequest};

use crate::deadline::Deadline;
use crate::error::AgentError;
use crate::runtime::Runtime;

const CREATE_SYSTEM: &str =
    "You are an expert travel planner. Create detailed itineraries and return ONLY valid JSON.";
const UPDATE_SYSTEM: &str =
    "You are an expert travel planner. Update itineraries based on new conditions and return ONLY valid JSON.";

#[async_trait]
pub trait Planner: Send + Sync {
    async fn create_plan(
        &self,
        destination: &str,
        duration: u32,
        budget: f64,
        deadline: Deadline,
    ) -> Result<TripPlan, AgentError>;

    async fn update_plan(
        &self,
        current: &TripPlan,
        condition: &str,
        deadline: Deadline,
    ) -> Result<TripPlan, AgentError>;
}

pub struct PlannerAgent {
    runtime: Arc<Runtime>,
}

impl PlannerAgent {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    async fn ask_for_plan(
        &self,
        purpose: &'static str,
        request: CompletionRequest,
        deadline: Deadline,
    ) -> Option<TripPlan> {
        let raw = self.runtime.ask_llm(deadline, purpose, request).await?;
        match parse_json::<TripPlan>(&raw) {
            Ok(plan) => Some(plan),
            Err(err) => {
                warn!(purpose, error = %err, "plan from model unusable");
                None
            }
        }
    }
}

#[async_trait]
impl Planner for PlannerAgent {
    #[instrument(skip(self, deadline))]
    async fn create_plan(
        &self,
        destination: &str,
        duration: u32,
        budget: f64,
        deadline: Deadline,
    ) -> Result<TripPlan, AgentError> {
        if duration == 0 || duration > MAX_DURATION_DAYS {
            return Err(AgentError::InvalidPlan {
                destination: destination.to_string(),
                reason: format!("duration must be 1..={MAX_DURATION_DAYS} days, got {duration}"),
            });
        }
        if !budget.is_finite() || budget < 0.0 {
            return Err(AgentError::InvalidPlan {
                destination: destination.to_string(),
                reason: format!("budget must be a non-negative amount, got {budget}"),
            });
        }

        let prompt = format!(
            r#"You are PlannerAgent, an expert travel planner.

Create a detailed itinerary for:
- Destination: {destination}
- Duration: {duration} days
- Budget: {budget:.0} THB

Return ONLY valid JSON:
{{
  "destination": "...",
  "duration": 0,
  "total_budget": 0,
  "itinerary": [
    {{"day": 1, "activities": ["Activity 1", "Activity 2"], "budget": 15000}}
  ],
  "summary": "Brief overview in markdown"
}}"#
        );
        let request = CompletionRequest::new(CREATE_SYSTEM, prompt)
            .temperature(0.7)
            .max_tokens(1500);

        if let Some(mut plan) = self.ask_for_plan("create_plan", request, deadline).await {
            plan.destination = destination.to_string();
            plan.duration = duration;
            plan.total_budget = budget;

            match check_plan(&plan, duration) {
                PlanCheck::Valid => return Ok(plan),
                PlanCheck::Unbalanced => {
                    rebalance_budget(&mut plan);
                    return Ok(plan);
                }
                PlanCheck::Invalid(reason) => warn!(%reason, "discarding model plan"),
            }
        }

        self.runtime.metrics.inc_fallback();
        let plan = build_trip_plan(destination, duration, budget);
        info!(days = plan.itinerary.len(), "built default plan");
        Ok(plan)
    }

    #[instrument(skip(self, current, deadline), fields(destination = %current.destination))]
    async fn update_plan(
        &self,
        current: &TripPlan,
        condition: &str,
        deadline: Deadline,
    ) -> Result<TripPlan, AgentError> {
        if !self.runtime.has_llm() {
            return Ok(current.clone());
        }

        let current_json = serde_json::to_string(current).map_err(|err| AgentError::InvalidPlan {
            destination: current.destination.clone(),
            reason: err.to_string(),
        })?;
        let prompt = format!(
            "You are PlannerAgent. The traveller currently has this plan:\n{current_json}\n\n\
             Update it for this condition: {condition}\n\n\
             Return the revised plan as JSON in the same shape, with activities for each day."
        );
        let request = CompletionRequest::new(UPDATE_SYSTEM, prompt)
            .temperature(0.7)
            .max_tokens(1500);

        let Some(mut revised) = self.ask_for_plan("update_plan", request, deadline).await else {
            return Ok(current.clone());
        };
        revised.total_budget = current.total_budget;

        match check_plan(&revised, current.duration) {
            PlanCheck::Valid => Ok(revised),
            PlanCheck::Unbalanced => {
                rebalance_budget(&mut revised);
                Ok(revised)
            }
            PlanCheck::Invalid(reason) => {
                warn!(%reason, "keeping current plan");
                Ok(current.clone())
            }
        }
    }
}
