use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use wayfarer_core::SocialPlace;

use crate::{ensure_success, PlacesProvider, ProviderError, ProviderResult};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DEFAULT_LIMIT: usize = 10;

/// Google Places text search ranked by review volume.
#[derive(Clone)]
pub struct GooglePlacesClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GooglePlacesClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn photo_url(&self, reference: &str) -> String {
        format!(
            "{}/photo?maxwidth=400&photoreference={}&key={}",
            self.base_url, reference, self.api_key
        )
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchPayload {
    #[serde(default)]
    results: Vec<PlaceResult>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    user_ratings_total: u64,
    #[serde(default)]
    price_level: Option<u8>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    open_now: bool,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn top_rated(
        &self,
        keyword: &str,
        location: &str,
        limit: usize,
    ) -> ProviderResult<Vec<SocialPlace>> {
        let query = format!("{keyword} in {location}");
        let response = self
            .client
            .get(format!("{}/textsearch/json", self.base_url))
            .query(&[("query", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let payload: TextSearchPayload = ensure_success(response).await?.json().await?;
        rank_places(payload, limit, |reference| self.photo_url(reference))
    }
}

fn rank_places(
    payload: TextSearchPayload,
    limit: usize,
    photo_url: impl Fn(&str) -> String,
) -> ProviderResult<Vec<SocialPlace>> {
    if payload.status != "OK" && payload.status != "ZERO_RESULTS" {
        return Err(ProviderError::Unavailable(format!(
            "places status {}",
            payload.status
        )));
    }

    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };

    let mut places: Vec<SocialPlace> = payload
        .results
        .into_iter()
        .map(|result| {
            let (latitude, longitude) = result
                .geometry
                .map(|geometry| (geometry.location.lat, geometry.location.lng))
                .unwrap_or_default();

            SocialPlace {
                place_id: result.place_id,
                name: result.name,
                address: result.formatted_address,
                rating: result.rating,
                review_count: result.user_ratings_total,
                price_level: result.price_level,
                types: result.types,
                photo_url: result
                    .photos
                    .first()
                    .map(|photo| photo_url(&photo.photo_reference)),
                latitude,
                longitude,
                open_now: result.opening_hours.map(|hours| hours.open_now).unwrap_or(false),
            }
        })
        .collect();

    places.sort_by(|a, b| b.review_count.cmp(&a.review_count));
    places.truncate(limit);
    Ok(places)
}
