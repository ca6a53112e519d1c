use crate::entities::EntityBag;
use crate::models::{Detection, DetectionSource, Intent};
use crate::text::contains_any;

const FLIGHT_QUESTION_WORDS: &[&str] = &["status", "check", "on time", "is flight"];
const WEATHER_WORDS: &[&str] = &["weather", "forecast", "rain", "ฝน"];
const HOTEL_WORDS: &[&str] = &["hotel", "accommodation", "โรงแรม"];
const LOCAL_WORDS: &[&str] = &["restaurant", "cafe", "nearby", "ร้านอาหาร", "ใกล้", "ราเมน"];
const TRIP_WORDS: &[&str] = &["plan", "trip", "travel", "visit", "เที่ยว", "ไป"];
const BUDGET_WORDS: &[&str] = &["budget", "cost", "price"];
const BUDGET_TRIP_WORDS: &[&str] = &["trip", "travel", "เที่ยว"];
const UPDATE_WORDS: &[&str] = &["update", "change", "modify", "เปลี่ยน"];

/// Keyword classifier used whenever the language model is unavailable.
///
/// Rules are tried in a fixed order and the first match wins, so a message
/// like "budget for my trip" is a trip request, not a budget question.
pub fn classify_intent_rules(text: &str) -> Detection {
    let (intent, entities) = classify(text);
    Detection {
        intent,
        entities,
        source: DetectionSource::Rules,
    }
}

fn classify(text: &str) -> (Intent, EntityBag) {
    let lower = text.to_lowercase();

    if lower.contains("flight") && contains_any(&lower, FLIGHT_QUESTION_WORDS) {
        let mut entities = EntityBag::new();
        if let Some(code) = extract_flight_code(text) {
            entities = entities.with_flight_code(code);
        }
        return (Intent::FlightCheck, entities);
    }

    if contains_any(&lower, WEATHER_WORDS) {
        return (Intent::WeatherCheck, EntityBag::new());
    }

    if contains_any(&lower, HOTEL_WORDS) {
        return (Intent::HotelSearch, EntityBag::new());
    }

    if contains_any(&lower, LOCAL_WORDS) {
        return (Intent::LocalRecommendation, EntityBag::new());
    }

    if contains_any(&lower, TRIP_WORDS) {
        return (Intent::PlanTrip, EntityBag::trip_defaults());
    }

    if contains_any(&lower, BUDGET_WORDS) {
        if contains_any(&lower, BUDGET_TRIP_WORDS) {
            return (Intent::PlanTrip, EntityBag::trip_defaults());
        }
        return (Intent::BudgetInquiry, EntityBag::new());
    }

    if contains_any(&lower, UPDATE_WORDS) {
        return (Intent::PlanUpdate, EntityBag::new());
    }

    (Intent::GeneralChat, EntityBag::new())
}

/// Takes the token right after the first standalone "flight" word.
pub fn extract_flight_code(text: &str) -> Option<String> {
    let mut tokens = text.split_whitespace();
    tokens.find(|token| token.eq_ignore_ascii_case("flight"))?;

    let candidate = tokens
        .next()?
        .trim_end_matches(|c: char| c.is_ascii_punctuation());
    let length = candidate.chars().count();

    (3..=8).contains(&length).then(|| candidate.to_string())
}
