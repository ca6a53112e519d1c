use crate::models::BudgetPlan;

const FLIGHT_SHARE: f64 = 0.45;
const HOTEL_SHARE: f64 = 0.25;
const FOOD_SHARE: f64 = 0.15;
const TRANSPORT_SHARE: f64 = 0.10;
const MISC_SHARE: f64 = 0.05;

/// Splits a total into fixed-percentage buckets, truncating each toward zero.
pub fn split_budget(total: i64) -> BudgetPlan {
    if total <= 0 {
        return BudgetPlan::default();
    }

    let share = |pct: f64| (total as f64 * pct) as i64;

    BudgetPlan {
        flight: share(FLIGHT_SHARE),
        hotel: share(HOTEL_SHARE),
        food: share(FOOD_SHARE),
        transport: share(TRANSPORT_SHARE),
        misc: share(MISC_SHARE),
    }
}
