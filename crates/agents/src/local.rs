use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use wayfarer_core::{GeoPoint, PlaceRecommendation, SocialPlace};
use wayfarer_llm::{parse_json, CompletionRequest};

use crate::deadline::Deadline;
use crate::error::AgentError;
use crate::runtime::Runtime;

const RECOMMEND_SYSTEM: &str =
    "You are a local recommendations expert. Provide realistic place recommendations and return ONLY valid JSON array.";

#[async_trait]
pub trait PlaceRecommender: Send + Sync {
    async fn get_recommendations(
        &self,
        point: GeoPoint,
        interest: &str,
        deadline: Deadline,
    ) -> Result<Vec<PlaceRecommendation>, AgentError>;

    /// Community favourites for `keyword` in `location`. Empty when no
    /// places collaborator is configured.
    async fn popular_places(
        &self,
        keyword: &str,
        location: &str,
        limit: usize,
        deadline: Deadline,
    ) -> Result<Vec<SocialPlace>, AgentError>;
}

pub struct LocalAgent {
    runtime: Arc<Runtime>,
}

impl LocalAgent {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl PlaceRecommender for LocalAgent {
    #[instrument(skip(self, deadline))]
    async fn get_recommendations(
        &self,
        point: GeoPoint,
        interest: &str,
        deadline: Deadline,
    ) -> Result<Vec<PlaceRecommendation>, AgentError> {
        let prompt = format!(
            r#"You are LocalAgent.
Given the current location (lat: {:.6}, lng: {:.6}) and preference: {interest},
recommend 3 options within 3 km.

Return ONLY a valid JSON array:
[
  {{"name": "...", "type": "cafe", "rating": 4.6, "distance_km": 1.2, "address": "..."}}
]"#,
            point.lat, point.lng
        );
        let request = CompletionRequest::new(RECOMMEND_SYSTEM, prompt)
            .temperature(0.7)
            .max_tokens(500);

        if let Some(raw) = self.runtime.ask_llm(deadline, "local_recommendation", request).await {
            match parse_json::<Vec<PlaceRecommendation>>(&raw) {
                Ok(places) if !places.is_empty() => return Ok(places),
                Ok(_) => warn!("model returned no places"),
                Err(err) => warn!(error = %err, "place list from model unusable"),
            }
        }

        self.runtime.metrics.inc_fallback();
        Ok(placeholder_places(interest))
    }

    #[instrument(skip(self, deadline))]
    async fn popular_places(
        &self,
        keyword: &str,
        location: &str,
        limit: usize,
        deadline: Deadline,
    ) -> Result<Vec<SocialPlace>, AgentError> {
        let Some(provider) = self.runtime.collaborators.places.as_ref() else {
            debug!("no places provider configured");
            return Ok(Vec::new());
        };

        let places = self
            .runtime
            .call_provider(deadline, "popular_places", provider.top_rated(keyword, location, limit))
            .await
            .unwrap_or_default();
        Ok(places)
    }
}

fn placeholder_places(interest: &str) -> Vec<PlaceRecommendation> {
    let place = |name: String, rating: f64, distance_km: f64, address: &str| PlaceRecommendation {
        name,
        kind: interest.to_string(),
        rating,
        distance_km,
        address: address.to_string(),
    };

    vec![
        place(format!("Popular {interest} Spot #1"), 4.7, 1.2, "City Center Area"),
        place(format!("Local {interest} Place #2"), 4.5, 1.5, "Downtown District"),
        place(format!("Best {interest} #3"), 4.8, 2.1, "Tourist Area"),
    ]
}
