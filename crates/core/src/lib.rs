pub mod airports;
pub mod budget;
pub mod climate;
pub mod compose;
pub mod entities;
pub mod fares;
pub mod intent;
pub mod lodging;
pub mod lookup;
pub mod models;
pub mod planner;
pub mod text;
pub mod visa;

pub use airports::airport_code;
pub use budget::split_budget;
pub use climate::{estimate_weather, normalize_month};
pub use entities::EntityBag;
pub use fares::estimate_fare;
pub use intent::classify_intent_rules;
pub use lodging::{estimate_nightly_rate, pick_hotel_name};
pub use models::*;
pub use planner::build_trip_plan;
pub use text::{normalize_text, title_case};
