use crate::models::{ItineraryDay, TripPlan};

/// Largest drift between the itinerary's allocations and the trip total that
/// is still accepted as-is.
pub const BUDGET_TOLERANCE: f64 = 1.0;

/// Day-by-day plan built without any external help: three generic
/// activities per day and an equal share of the budget.
pub fn build_trip_plan(destination: &str, duration: u32, budget: f64) -> TripPlan {
    let duration = duration.max(1);
    let budget = budget.max(0.0);
    let daily = budget / f64::from(duration);

    let itinerary = (1..=duration)
        .map(|day| ItineraryDay {
            day,
            activities: vec![
                format!("Explore {destination} attractions"),
                "Try local cuisine".to_string(),
                "Visit popular landmarks".to_string(),
            ],
            budget: daily,
        })
        .collect();

    TripPlan {
        destination: destination.to_string(),
        duration,
        total_budget: budget,
        itinerary,
        summary: format!(
            "## {duration}-Day Trip to {destination}\n\nExplore the best of {destination} with daily activities and local experiences. Budget: {budget:.0} THB"
        ),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanCheck {
    Valid,
    /// Day count is right but the allocations drift from the total.
    Unbalanced,
    /// The itinerary cannot be repaired (wrong day count or numbering).
    Invalid(String),
}

pub fn check_plan(plan: &TripPlan, expected_duration: u32) -> PlanCheck {
    if plan.itinerary.len() != expected_duration as usize {
        return PlanCheck::Invalid(format!(
            "expected {expected_duration} days, got {}",
            plan.itinerary.len()
        ));
    }

    let numbered = plan
        .itinerary
        .iter()
        .enumerate()
        .all(|(index, day)| day.day as usize == index + 1);
    if !numbered {
        return PlanCheck::Invalid("itinerary days are not numbered 1..n".to_string());
    }

    if plan.itinerary.iter().any(|day| !day.budget.is_finite() || day.budget < 0.0) {
        return PlanCheck::Unbalanced;
    }

    if (plan.allocated_budget() - plan.total_budget).abs() > BUDGET_TOLERANCE {
        return PlanCheck::Unbalanced;
    }

    PlanCheck::Valid
}

/// Re-divides the total equally across the itinerary.
pub fn rebalance_budget(plan: &mut TripPlan) {
    if plan.itinerary.is_empty() {
        return;
    }

    let daily = plan.total_budget / plan.itinerary.len() as f64;
    for day in &mut plan.itinerary {
        day.budget = daily;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_entry_per_day_with_equal_budget() {
        let plan = build_trip_plan("Tokyo", 5, 80_000.0);

        assert_eq!(plan.itinerary.len(), 5);
        assert_eq!(plan.itinerary[0].day, 1);
        assert_eq!(plan.itinerary[4].day, 5);
        assert!(plan.itinerary.iter().all(|day| day.budget == 16_000.0));
        assert_eq!(plan.itinerary[0].activities[0], "Explore Tokyo attractions");
        assert!(plan.summary.starts_with("## 5-Day Trip to Tokyo"));
        assert!(plan.summary.ends_with("Budget: 80000 THB"));
        assert_eq!(check_plan(&plan, 5), PlanCheck::Valid);
    }

    #[test]
    fn zero_duration_becomes_one_day() {
        let plan = build_trip_plan("Osaka", 0, 1_000.0);
        assert_eq!(plan.duration, 1);
        assert_eq!(plan.itinerary.len(), 1);
    }

    #[test]
    fn detects_wrong_day_count() {
        let plan = build_trip_plan("Seoul", 3, 9_000.0);
        assert!(matches!(check_plan(&plan, 4), PlanCheck::Invalid(_)));
    }

    #[test]
    fn rebalances_drifting_allocations() {
        let mut plan = build_trip_plan("Seoul", 3, 9_000.0);
        plan.itinerary[0].budget = 8_000.0;
        assert_eq!(check_plan(&plan, 3), PlanCheck::Unbalanced);

        rebalance_budget(&mut plan);
        assert_eq!(check_plan(&plan, 3), PlanCheck::Valid);
        assert_eq!(plan.itinerary[0].budget, 3_000.0);
    }
}
