//! Markdown rendering for every intent's reply.

use std::fmt::Write;

use crate::models::{
    BudgetPlan, FlightStatus, HotelRecommendation, PlaceRecommendation, SocialPlace, TripPlan,
    WeatherForecast,
};
use crate::text::title_case;

/// Rain probability (percent) above which a rain alert is shown.
pub const RAIN_ALERT_THRESHOLD: f64 = 60.0;
pub const MAX_PLAN_HOTELS: usize = 3;
pub const MAX_PLAN_PLACES: usize = 5;

pub const MISSING_FLIGHT_CODE_REPLY: &str =
    "Please provide a flight code (e.g., 'Is flight JL708 on time?')";
pub const PLAN_UPDATE_REPLY: &str = "Plan update functionality coming soon!";
pub const GENERAL_CHAT_REPLY: &str = "Hello! I'm your AI travel assistant. I can help you plan trips, check weather, find flights, search hotels, and get local recommendations. What would you like to do?";

/// Everything a `plan_trip` reply can contain. Optional sections that are
/// `None` or empty are left out.
#[derive(Debug, Clone)]
pub struct TripSections<'a> {
    pub destination: &'a str,
    pub duration: u32,
    pub budget: f64,
    pub plan: &'a TripPlan,
    pub weather: Option<&'a WeatherForecast>,
    pub hotels: &'a [HotelRecommendation],
    pub places: &'a [SocialPlace],
}

pub fn compose_trip_plan(sections: &TripSections<'_>) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "# {}-Day Trip to {}\n\n**Budget:** {:.0} THB\n\n## Itinerary\n",
        sections.duration, sections.destination, sections.budget
    );

    for day in &sections.plan.itinerary {
        let _ = writeln!(out, "\n**Day {}:**", day.day);
        for activity in &day.activities {
            let _ = writeln!(out, "- {activity}");
        }
        let _ = writeln!(out, "*Daily Budget: {:.0} THB*", day.budget);
    }

    if let Some(weather) = sections.weather {
        let _ = write!(
            out,
            "\n## Weather Forecast\nCurrent: {:.0}°C, {}\n",
            weather.temperature, weather.condition
        );
        if weather.rain_prob > RAIN_ALERT_THRESHOLD {
            let _ = write!(out, "\n⚠️ {}\n", weather.suggestion);
        }
    }

    if !sections.hotels.is_empty() {
        out.push_str("\n## Recommended Hotels\n");
        for hotel in sections.hotels.iter().take(MAX_PLAN_HOTELS) {
            let _ = writeln!(
                out,
                "- **{}** - {:.0} THB/night (Rating: {:.1}★)",
                hotel.name, hotel.price_per_night, hotel.rating
            );
        }
    }

    if !sections.places.is_empty() {
        out.push_str("\n## Socially Popular Spots\n*Top-rated places based on reviews*\n\n");
        for place in sections.places.iter().take(MAX_PLAN_PLACES) {
            let _ = writeln!(
                out,
                "- **{}** ({:.1}★, {} reviews)",
                place.name, place.rating, place.review_count
            );
        }
    }

    let _ = write!(out, "\n{}", sections.plan.summary);
    out
}

pub fn compose_weather(city: &str, forecast: &WeatherForecast) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "# Weather Forecast for {city}\n\n**Current:** {:.0}°C, {}\n\n## 3-Day Forecast\n",
        forecast.temperature, forecast.condition
    );
    for day in &forecast.forecast {
        let _ = writeln!(
            out,
            "- {}: {:.0}°C, {} (Rain: {:.0}%)",
            day.date, day.temperature, day.condition, day.rain_prob
        );
    }

    if forecast.rain_prob > RAIN_ALERT_THRESHOLD {
        let _ = write!(out, "\n⚠️ **Rain Alert:** {}\n", forecast.suggestion);
    }

    out
}

pub fn compose_flight(status: &FlightStatus) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "# Flight {} Status\n\n**Status:** {}\n**Departure:** {}\n**Arrival:** {}\n",
        status.flight_code,
        title_case(&status.status),
        status.departure_time,
        status.arrival_time
    );
    if !status.gate.is_empty() {
        let _ = writeln!(out, "**Gate:** {}", status.gate);
    }
    if status.is_delayed() {
        let _ = write!(out, "\n⚠️ **Delayed by {} minutes**\n\n", status.delay_minutes);
    }

    let _ = write!(out, "\n{}", status.notification);
    out
}

pub fn compose_hotels(destination: &str, nightly_budget: f64, hotels: &[HotelRecommendation]) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "# Hotels in {destination}\n\nBudget: Up to {nightly_budget:.0} THB per night\n\n"
    );
    for (index, hotel) in hotels.iter().enumerate() {
        let _ = write!(
            out,
            "{}. **{}**\n   - Price: {:.0} THB/night\n   - Rating: {:.1}★\n   - Distance: {:.1} km from center\n   - Address: {}\n\n",
            index + 1,
            hotel.name,
            hotel.price_per_night,
            hotel.rating,
            hotel.distance,
            hotel.address
        );
    }

    out
}

/// Nearby recommendations, followed by community favourites when any were
/// found. Numbering continues across both lists.
pub fn compose_local(
    interest: &str,
    places: &[PlaceRecommendation],
    destination: Option<&str>,
    popular: &[SocialPlace],
) -> String {
    let mut out = String::new();
    let heading = title_case(interest);

    let _ = write!(out, "# Nearby {heading} Recommendations\n\n");
    for (index, place) in places.iter().enumerate() {
        let _ = write!(
            out,
            "{}. **{}**\n   - Type: {}\n   - Rating: {:.1}★\n   - Distance: {:.1} km away\n   - Address: {}\n\n",
            index + 1,
            place.name,
            place.kind,
            place.rating,
            place.distance_km,
            place.address
        );
    }

    if let Some(destination) = destination {
        if !popular.is_empty() {
            let _ = write!(
                out,
                "\n## Socially Popular {heading} in {destination}\n*Top-rated by the community*\n\n"
            );
            for (offset, place) in popular.iter().enumerate() {
                let _ = write!(
                    out,
                    "{}. **{}** ({:.1}★, {} reviews)\n   - Address: {}\n\n",
                    places.len() + offset + 1,
                    place.name,
                    place.rating,
                    place.review_count,
                    place.address
                );
            }
        }
    }

    out
}

pub fn compose_budget(total: f64, plan: &BudgetPlan) -> String {
    let mut out = String::new();

    let _ = write!(out, "# Budget Breakdown for {total:.0} THB\n\n");
    let _ = writeln!(out, "- **Flights:** {} THB (45%)", plan.flight);
    let _ = writeln!(out, "- **Hotels:** {} THB (25%)", plan.hotel);
    let _ = writeln!(out, "- **Food:** {} THB (15%)", plan.food);
    let _ = writeln!(out, "- **Transport:** {} THB (10%)", plan.transport);
    let _ = writeln!(out, "- **Miscellaneous:** {} THB (5%)", plan.misc);
    let _ = write!(out, "\n**Total:** {} THB\n", plan.total());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::split_budget;
    use crate::models::DayForecast;
    use crate::planner::build_trip_plan;

    fn forecast(rain: f64) -> WeatherForecast {
        WeatherForecast {
            city: "Tokyo".to_string(),
            temperature: 21.4,
            condition: "Rain".to_string(),
            rain_prob: rain,
            forecast: vec![DayForecast {
                date: "2026-06-01".to_string(),
                temperature: 20.0,
                condition: "Rain".to_string(),
                rain_prob: rain,
            }],
            suggestion: "Visit a museum.".to_string(),
        }
    }

    fn hotel(name: &str) -> HotelRecommendation {
        HotelRecommendation {
            name: name.to_string(),
            price_per_night: 2_100.0,
            rating: 4.25,
            address: "Tokyo City Center".to_string(),
            distance: 1.0,
        }
    }

    #[test]
    fn trip_plan_sections_follow_fixed_order() {
        let plan = build_trip_plan("Tokyo", 2, 10_000.0);
        let weather = forecast(80.0);
        let hotels: Vec<_> = ["A", "B", "C", "D"].into_iter().map(hotel).collect();

        let text = compose_trip_plan(&TripSections {
            destination: "Tokyo",
            duration: 2,
            budget: 10_000.0,
            plan: &plan,
            weather: Some(&weather),
            hotels: &hotels,
            places: &[],
        });

        assert!(text.starts_with("# 2-Day Trip to Tokyo\n\n**Budget:** 10000 THB\n\n## Itinerary\n"));
        assert_eq!(text.matches("**Day ").count(), 2);
        assert!(text.contains("*Daily Budget: 5000 THB*"));
        assert!(text.contains("\n⚠️ Visit a museum.\n"));
        assert!(text.contains("- **C** - 2100 THB/night"));
        assert!(!text.contains("**D**"));
        assert!(!text.contains("Socially Popular"));

        let itinerary = text.find("## Itinerary").unwrap();
        let weather_at = text.find("## Weather Forecast").unwrap();
        let hotels_at = text.find("## Recommended Hotels").unwrap();
        let summary_at = text.find("## 2-Day Trip to Tokyo").unwrap();
        assert!(itinerary < weather_at && weather_at < hotels_at && hotels_at < summary_at);
    }

    #[test]
    fn weather_reply_alerts_only_above_threshold() {
        assert!(compose_weather("Tokyo", &forecast(61.0)).contains("**Rain Alert:**"));
        let calm = compose_weather("Tokyo", &forecast(60.0));
        assert!(!calm.contains("Rain Alert"));
        assert!(calm.contains("- 2026-06-01: 20°C, Rain (Rain: 60%)"));
    }

    #[test]
    fn flight_reply_title_cases_status() {
        let status = FlightStatus {
            flight_code: "JL708".to_string(),
            status: "delayed".to_string(),
            departure_time: "2026-10-17 10:00".to_string(),
            arrival_time: "2026-10-17 14:00".to_string(),
            gate: "A12".to_string(),
            delay_minutes: 30,
            notification: "Sorry.".to_string(),
        };

        let text = compose_flight(&status);
        assert!(text.contains("**Status:** Delayed\n"));
        assert!(text.contains("⚠️ **Delayed by 30 minutes**"));
        assert!(text.ends_with("\nSorry."));
    }

    #[test]
    fn local_numbering_continues_into_popular_places() {
        let places = vec![PlaceRecommendation {
            name: "Ramen Ya".to_string(),
            kind: "restaurant".to_string(),
            rating: 4.5,
            distance_km: 0.8,
            address: "Shibuya".to_string(),
        }];
        let popular = vec![SocialPlace {
            place_id: "p1".to_string(),
            name: "Ichiran".to_string(),
            address: "Shinjuku".to_string(),
            rating: 4.6,
            review_count: 1200,
            price_level: None,
            types: Vec::new(),
            photo_url: None,
            latitude: 0.0,
            longitude: 0.0,
            open_now: false,
        }];

        let text = compose_local("ramen", &places, Some("Tokyo"), &popular);
        assert!(text.starts_with("# Nearby Ramen Recommendations"));
        assert!(text.contains("## Socially Popular Ramen in Tokyo"));
        assert!(text.contains("2. **Ichiran** (4.6★, 1200 reviews)"));

        let without_destination = compose_local("ramen", &places, None, &popular);
        assert!(!without_destination.contains("Socially Popular"));
    }

    #[test]
    fn budget_reply_lists_five_buckets() {
        let text = compose_budget(50_000.0, &split_budget(50_000));
        assert!(text.starts_with("# Budget Breakdown for 50000 THB"));
        assert_eq!(text.lines().filter(|line| line.starts_with("- **")).count(), 5);
        assert!(text.contains("**Total:** 50000 THB"));
    }

    #[test]
    fn huge_model_budget_renders_without_overflow() {
        let bag = crate::entities::EntityBag::from_json(&serde_json::json!({ "budget": 1e19 }));
        let total = bag.budget_or(50_000.0);

        let text = compose_budget(total, &split_budget(total as i64));
        assert!(text.contains("**Total:**"));
    }
}
