use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{info, instrument, warn};
use wayfarer_core::lodging::{DEFAULT_NIGHTLY_RATE, FALLBACK_HOTEL_NAME};
use wayfarer_core::{estimate_nightly_rate, pick_hotel_name, HotelQuote, HotelRecommendation};
use wayfarer_llm::{parse_json, CompletionRequest};

use crate::deadline::Deadline;
use crate::error::AgentError;
use crate::runtime::Runtime;

const SEARCH_SYSTEM: &str =
    "You are a hotel search assistant. Generate realistic hotel recommendations and return ONLY valid JSON array.";

#[async_trait]
pub trait HotelFinder: Send + Sync {
    async fn search_hotels(
        &self,
        destination: &str,
        nightly_budget: f64,
        rng: &mut StdRng,
        deadline: Deadline,
    ) -> Result<Vec<HotelRecommendation>, AgentError>;

    async fn hotel_price(&self, city: &str, nights: i64, rng: &mut StdRng) -> Result<HotelQuote, AgentError>;
}

pub struct HotelAgent {
    runtime: Arc<Runtime>,
}

impl HotelAgent {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    async fn search_with_model(
        &self,
        destination: &str,
        nightly_budget: f64,
        deadline: Deadline,
    ) -> Option<Vec<HotelRecommendation>> {
        let prompt = format!(
            r#"You are HotelAgent. Find 3 hotels in {destination} with a nightly rate around {nightly_budget:.0} THB.

Return ONLY a valid JSON array:
[
  {{"name": "Hotel Name", "price_per_night": 2500.0, "rating": 4.5, "address": "Full address", "distance_km": 1.5}}
]

Use realistic hotel names, addresses and ratings for {destination}."#
        );
        let request = CompletionRequest::new(SEARCH_SYSTEM, prompt)
            .temperature(0.7)
            .max_tokens(500);

        let raw = self.runtime.ask_llm(deadline, "hotel_search", request).await?;
        match parse_json::<Vec<HotelRecommendation>>(&raw) {
            Ok(hotels) if !hotels.is_empty() => Some(hotels),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "hotel list from model unusable");
                None
            }
        }
    }
}

#[async_trait]
impl HotelFinder for HotelAgent {
    #[instrument(skip(self, rng, deadline))]
    async fn search_hotels(
        &self,
        destination: &str,
        nightly_budget: f64,
        rng: &mut StdRng,
        deadline: Deadline,
    ) -> Result<Vec<HotelRecommendation>, AgentError> {
        if let Some(hotels) = self.search_with_model(destination, nightly_budget, deadline).await {
            info!(count = hotels.len(), "hotels from model");
            return Ok(hotels);
        }

        self.runtime.metrics.inc_fallback();
        let hotels = estimated_hotels(destination, rng);
        info!(count = hotels.len(), "estimated hotels");
        Ok(hotels)
    }

    async fn hotel_price(&self, city: &str, nights: i64, rng: &mut StdRng) -> Result<HotelQuote, AgentError> {
        if city.trim().is_empty() || nights <= 0 {
            return Ok(HotelQuote {
                price: DEFAULT_NIGHTLY_RATE * nights.max(1) as f64,
                name: FALLBACK_HOTEL_NAME.to_string(),
            });
        }

        let key = format!("hotel:{}:{}", city.trim().to_lowercase(), nights);
        if let Some(quote) = self.runtime.cache_get_json::<HotelQuote>(&key).await {
            return Ok(quote);
        }

        let quote = HotelQuote {
            price: estimate_nightly_rate(city) * nights as f64,
            name: pick_hotel_name(city, rng),
        };
        self.runtime.cache_put_json(&key, &quote).await;

        Ok(quote)
    }
}

fn estimated_hotels(destination: &str, rng: &mut StdRng) -> Vec<HotelRecommendation> {
    let base_rate = estimate_nightly_rate(destination);

    (0..3)
        .map(|_| HotelRecommendation {
            name: pick_hotel_name(destination, rng),
            price_per_night: base_rate * rng.gen_range(0.8..1.2),
            rating: 4.0 + rng.gen::<f64>(),
            address: format!("{destination} City Center"),
            distance: 0.5 + rng.gen::<f64>() * 3.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::SeedableRng;
    use wayfarer_storage::MemoryCache;

    use super::*;
    use crate::runtime::test_support::{runtime, ScriptedModel};
    use crate::runtime::Collaborators;

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn estimated_hotels_stay_in_range() {
        let agent = HotelAgent::new(runtime(Collaborators::none()));
        let mut rng = StdRng::seed_from_u64(7);

        let hotels = agent.search_hotels("Tokyo", 4000.0, &mut rng, deadline()).await.unwrap();
        assert_eq!(hotels.len(), 3);
        for hotel in &hotels {
            assert!((1600.0..=2400.0).contains(&hotel.price_per_night));
            assert!((4.0..=5.0).contains(&hotel.rating));
            assert!((0.5..=3.5).contains(&hotel.distance));
            assert_eq!(hotel.address, "Tokyo City Center");
        }
    }

    #[tokio::test]
    async fn same_seed_same_hotels() {
        let agent = HotelAgent::new(runtime(Collaborators::none()));
        let first = agent
            .search_hotels("Seoul", 3000.0, &mut StdRng::seed_from_u64(3), deadline())
            .await
            .unwrap();
        let second = agent
            .search_hotels("Seoul", 3000.0, &mut StdRng::seed_from_u64(3), deadline())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn model_hotels_are_used_when_valid() {
        let model = ScriptedModel::replying(vec![
            r#"[{"name":"Harbour Inn","price_per_night":3100,"rating":4.4,"address":"1 Pier Rd","distance_km":0.9}]"#,
        ]);
        let agent = HotelAgent::new(runtime(Collaborators::none().with_llm(model)));

        let hotels = agent
            .search_hotels("Busan", 3000.0, &mut StdRng::seed_from_u64(1), deadline())
            .await
            .unwrap();
        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].name, "Harbour Inn");
        assert_eq!(hotels[0].distance, 0.9);
    }

    #[tokio::test]
    async fn invalid_price_input_uses_budget_hotel() {
        let agent = HotelAgent::new(runtime(Collaborators::none()));
        let mut rng = StdRng::seed_from_u64(1);

        let quote = agent.hotel_price("", 3, &mut rng).await.unwrap();
        assert_eq!(quote.price, 7_500.0);
        assert_eq!(quote.name, "Budget Hotel");

        let quote = agent.hotel_price("Tokyo", 0, &mut rng).await.unwrap();
        assert_eq!(quote.price, 2_500.0);
    }

    #[tokio::test]
    async fn price_is_cached_per_city_and_nights() {
        let cache = Arc::new(MemoryCache::new());
        let agent = HotelAgent::new(runtime(Collaborators::none().with_cache(cache.clone())));

        let first = agent.hotel_price("Tokyo", 3, &mut StdRng::seed_from_u64(1)).await.unwrap();
        let second = agent.hotel_price("TOKYO", 3, &mut StdRng::seed_from_u64(99)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }
}
