//! Typed entity bag extracted from a message.
//!
//! Values arrive as loosely typed JSON (the language model decides the shape).
//! Construction never fails: a key holding an unexpected type is dropped, and
//! every accessor resolves an absent value to the caller's default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::GeoPoint;

/// Longest trip the planner will lay out.
pub const MAX_DURATION_DAYS: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct EntityBag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travelers: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_code: Option<String>,
}

impl EntityBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults the keyword rules attach to a trip request.
    pub fn trip_defaults() -> Self {
        Self {
            duration: Some(7.0),
            budget: Some(50_000.0),
            ..Self::default()
        }
    }

    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        Self {
            destination: object.get("destination").and_then(as_text),
            duration: object.get("duration").and_then(as_number),
            budget: object.get("budget").and_then(as_number),
            date_from: object.get("date_from").and_then(as_text),
            date_to: object.get("date_to").and_then(as_text),
            travelers: object.get("travelers").and_then(as_number),
            interests: object.get("interests").and_then(as_interest),
            location: object.get("location").and_then(as_point),
            flight_code: object.get("flight_code").and_then(as_text),
        }
    }

    pub fn with_flight_code(mut self, code: impl Into<String>) -> Self {
        self.flight_code = Some(code.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn destination_or(&self, default: &str) -> String {
        self.destination().unwrap_or(default).to_string()
    }

    /// Whole days, clamped to `1..=MAX_DURATION_DAYS`. Non-positive values
    /// resolve to `default`.
    pub fn duration_or(&self, default: u32) -> u32 {
        match self.duration {
            Some(days) if days >= 1.0 => (days.trunc() as u32).min(MAX_DURATION_DAYS),
            _ => default.clamp(1, MAX_DURATION_DAYS),
        }
    }

    pub fn budget_or(&self, default: f64) -> f64 {
        match self.budget {
            Some(amount) if amount >= 0.0 => amount,
            _ => default,
        }
    }

    pub fn interest_or(&self, default: &str) -> String {
        self.interests.as_deref().unwrap_or(default).to_string()
    }

    pub fn location_or(&self, default: GeoPoint) -> GeoPoint {
        self.location.unwrap_or(default)
    }

    pub fn flight_code(&self) -> Option<&str> {
        self.flight_code.as_deref()
    }
}

impl From<Value> for EntityBag {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

fn as_text(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

fn as_interest(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(as_text),
        other => as_text(other),
    }
}

fn as_point(value: &Value) -> Option<GeoPoint> {
    let object = value.as_object()?;
    let lat = object.get("lat").and_then(as_number)?;
    let lng = object.get("lng").and_then(as_number)?;
    Some(GeoPoint { lat, lng })
}
