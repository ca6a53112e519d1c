use crate::lookup::resolve_place;
use crate::models::WeatherSummary;

pub const DEFAULT_TEMPERATURE: f64 = 15.0;
pub const RAINY_PROBABILITY: f64 = 75.0;
pub const DRY_PROBABILITY: f64 = 20.0;

pub const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Monthly mean temperatures in °C, January first.
const MONTHLY_TEMPERATURES: &[(&str, [f64; 12])] = &[
    ("vancouver", [6.0, 7.0, 9.0, 12.0, 15.0, 18.0, 21.0, 21.0, 18.0, 13.0, 9.0, 6.0]),
    ("tokyo", [6.0, 7.0, 11.0, 16.0, 20.0, 23.0, 27.0, 29.0, 25.0, 19.0, 14.0, 9.0]),
    ("bangkok", [27.0, 29.0, 30.0, 31.0, 30.0, 29.0, 29.0, 29.0, 28.0, 28.0, 27.0, 26.0]),
];

const RAINY_MONTHS: &[(&str, &[&str])] = &[
    ("vancouver", &["november", "december", "january", "february", "march"]),
    ("bangkok", &["may", "june", "july", "august", "september", "october"]),
    ("tokyo", &["june", "july", "september"]),
    ("singapore", &["november", "december", "january"]),
    ("kuala lumpur", &["april", "may", "october", "november"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Sunny,
    Rainy,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Rainy => "Rainy",
        }
    }

    pub fn rain_probability(self) -> f64 {
        match self {
            Self::Sunny => DRY_PROBABILITY,
            Self::Rainy => RAINY_PROBABILITY,
        }
    }
}

/// Canonical lowercase month name. Accepts `1`-`12`, three-letter
/// abbreviations and full names; anything else is January.
pub fn normalize_month(input: &str) -> &'static str {
    let value = input.trim().to_lowercase();

    if let Ok(number) = value.parse::<usize>() {
        return match number {
            1..=12 => MONTHS[number - 1],
            _ => MONTHS[0],
        };
    }

    MONTHS
        .iter()
        .find(|month| **month == value || (value.len() == 3 && month.starts_with(&value)))
        .copied()
        .unwrap_or(MONTHS[0])
}

/// Month name for a 1-based month number, clamped into range.
pub fn month_name(number: u32) -> &'static str {
    MONTHS[(number.clamp(1, 12) - 1) as usize]
}

pub fn estimate_temperature(city: &str, month: &str) -> f64 {
    let index = month_index(normalize_month(month));
    resolve_place(MONTHLY_TEMPERATURES, city)
        .map(|temps| temps[index])
        .unwrap_or(DEFAULT_TEMPERATURE)
}

pub fn estimate_condition(city: &str, month: &str) -> Condition {
    let month = normalize_month(month);
    match resolve_place(RAINY_MONTHS, city) {
        Some(months) if months.contains(&month) => Condition::Rainy,
        _ => Condition::Sunny,
    }
}

pub fn estimate_weather(city: &str, month: &str) -> WeatherSummary {
    WeatherSummary {
        avg_temp: estimate_temperature(city, month),
        condition: estimate_condition(city, month).as_str().to_string(),
    }
}

fn month_index(month: &str) -> usize {
    MONTHS.iter().position(|m| *m == month).unwrap_or(0)
}
