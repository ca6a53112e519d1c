use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::EntityBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PlanTrip,
    FlightCheck,
    WeatherCheck,
    HotelSearch,
    LocalRecommendation,
    BudgetInquiry,
    PlanUpdate,
    GeneralChat,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Self::PlanTrip,
        Self::FlightCheck,
        Self::WeatherCheck,
        Self::HotelSearch,
        Self::LocalRecommendation,
        Self::BudgetInquiry,
        Self::PlanUpdate,
        Self::GeneralChat,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "plan_trip" => Some(Self::PlanTrip),
            "flight_check" => Some(Self::FlightCheck),
            "weather_check" => Some(Self::WeatherCheck),
            "hotel_search" => Some(Self::HotelSearch),
            "local_recommendation" => Some(Self::LocalRecommendation),
            "budget_inquiry" => Some(Self::BudgetInquiry),
            "plan_update" => Some(Self::PlanUpdate),
            "general_chat" => Some(Self::GeneralChat),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::PlanTrip => "plan_trip",
            Self::FlightCheck => "flight_check",
            Self::WeatherCheck => "weather_check",
            Self::HotelSearch => "hotel_search",
            Self::LocalRecommendation => "local_recommendation",
            Self::BudgetInquiry => "budget_inquiry",
            Self::PlanUpdate => "plan_update",
            Self::GeneralChat => "general_chat",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown intent tag `{0}`")]
pub struct UnknownIntent(pub String);

impl FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownIntent(value.to_string()))
    }
}

/// Which path produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    Model,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub intent: Intent,
    pub entities: EntityBag,
    pub source: DetectionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Central Bangkok.
    pub const DEFAULT: GeoPoint = GeoPoint {
        lat: 13.7563,
        lng: 100.5018,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub flight: i64,
    pub hotel: i64,
    pub food: i64,
    pub transport: i64,
    pub misc: i64,
}

impl BudgetPlan {
    /// Sum of the buckets, saturating at `i64::MAX` for absurd totals.
    pub fn total(&self) -> i64 {
        [self.hotel, self.food, self.transport, self.misc]
            .into_iter()
            .fold(self.flight, i64::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub activities: Vec<String>,
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub destination: String,
    pub duration: u32,
    pub total_budget: f64,
    pub itinerary: Vec<ItineraryDay>,
    pub summary: String,
}

impl TripPlan {
    pub fn allocated_budget(&self) -> f64 {
        self.itinerary.iter().map(|day| day.budget).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStatus {
    pub flight_code: String,
    pub status: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub gate: String,
    pub delay_minutes: i64,
    pub notification: String,
}

impl FlightStatus {
    pub fn is_delayed(&self) -> bool {
        self.delay_minutes > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecommendation {
    pub name: String,
    pub price_per_night: f64,
    pub rating: f64,
    pub address: String,
    #[serde(rename = "distance_km")]
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: String,
    pub temperature: f64,
    pub condition: String,
    #[serde(rename = "rain_probability")]
    pub rain_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub city: String,
    pub temperature: f64,
    pub condition: String,
    #[serde(rename = "rain_probability")]
    pub rain_prob: f64,
    pub forecast: Vec<DayForecast>,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecommendation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub rating: f64,
    pub distance_km: f64,
    pub address: String,
}

/// A community-rated place from the popular-places collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPlace {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub review_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub open_now: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInfo {
    pub name: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaRequirement {
    pub visa_required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub visa_type: String,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub forms: Vec<FormInfo>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub processing_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<FeeInfo>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub validity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stay_days: Option<u32>,
    #[serde(default)]
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareQuote {
    pub price: f64,
    pub airline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelQuote {
    pub price: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub avg_temp: f64,
    pub condition: String,
}

/// One-shot cost estimate for a trip request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripQuote {
    pub destination: String,
    pub airport_code: String,
    pub duration: u32,
    pub budget: BudgetPlan,
    pub flight_price: f64,
    pub airline: String,
    pub departure_date: String,
    pub hotel_total: f64,
    pub hotel_per_night: f64,
    pub hotel_name: String,
    pub weather: WeatherSummary,
    pub total: f64,
    pub message: String,
}
