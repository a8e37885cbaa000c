//! Spending-class keyword membership and goal-driven limit proposals.

use pesa_core::{PrimaryGoal, Strategy};

use crate::stats::PlanPolicy;

/// Broad class a category falls into for planning purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendClass {
    Savings,
    Discretionary,
    Essential,
}

// Savings and discretionary lists are checked in that order; anything
// unmatched is treated as essential and never gets a cut proposal.
const SAVINGS_KEYWORDS: &[&str] = &[
    "saving",
    "invest",
    "sacco",
    "pension",
    "mmf",
    "money market",
    "unit trust",
    "shares",
    "emergency fund",
];

const DISCRETIONARY_KEYWORDS: &[&str] = &[
    "entertain",
    "dining",
    "restaurant",
    "shopping",
    "subscript",
    "travel",
    "leisure",
    "hobby",
    "gaming",
    "beauty",
    "alcohol",
    "bar",
    "fashion",
];

pub fn classify(category: &str) -> SpendClass {
    let c = category.to_lowercase();
    if SAVINGS_KEYWORDS.iter().any(|k| c.contains(k)) {
        SpendClass::Savings
    } else if DISCRETIONARY_KEYWORDS.iter().any(|k| c.contains(k)) {
        SpendClass::Discretionary
    } else {
        SpendClass::Essential
    }
}

/// Derive an initial limit and strategy from the user's primary goal.
/// Only used when no persisted budget exists for the category.
pub fn propose(
    class: SpendClass,
    average: f64,
    goal: PrimaryGoal,
    policy: &PlanPolicy,
) -> (f64, Strategy) {
    match class {
        SpendClass::Savings => {
            if goal.favors_saving() {
                (average * (1.0 + policy.savings_boost), Strategy::Increase)
            } else {
                (average, Strategy::Maintain)
            }
        }
        SpendClass::Discretionary => {
            if goal.wants_aggressive_cuts() {
                (average * (1.0 - policy.aggressive_cut), Strategy::Aggressive)
            } else if goal.wants_moderate_cuts() {
                (average * (1.0 - policy.moderate_cut), Strategy::Moderate)
            } else {
                (average, Strategy::Maintain)
            }
        }
        SpendClass::Essential => (average, Strategy::Maintain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_order() {
        assert_eq!(classify("Savings"), SpendClass::Savings);
        assert_eq!(classify("Investment Account"), SpendClass::Savings);
        assert_eq!(classify("Dining"), SpendClass::Discretionary);
        assert_eq!(classify("Subscriptions"), SpendClass::Discretionary);
        assert_eq!(classify("Rent"), SpendClass::Essential);
        assert_eq!(classify("Utilities"), SpendClass::Essential);
    }

    #[test]
    fn test_savings_boost_follows_goal() {
        let policy = PlanPolicy::default();
        let (limit, strategy) = propose(SpendClass::Savings, 1000.0, PrimaryGoal::Travel, &policy);
        assert_eq!(strategy, Strategy::Increase);
        assert!((limit - 1100.0).abs() < 1e-9);

        let (limit, strategy) = propose(SpendClass::Savings, 1000.0, PrimaryGoal::PayDebt, &policy);
        assert_eq!(strategy, Strategy::Maintain);
        assert_eq!(limit, 1000.0);
    }

    #[test]
    fn test_discretionary_cuts_by_goal() {
        let policy = PlanPolicy::default();
        let (limit, strategy) =
            propose(SpendClass::Discretionary, 500.0, PrimaryGoal::ControlSpending, &policy);
        assert_eq!(strategy, Strategy::Aggressive);
        assert!((limit - 400.0).abs() < 1e-9);

        let (limit, strategy) =
            propose(SpendClass::Discretionary, 500.0, PrimaryGoal::BuyAsset, &policy);
        assert_eq!(strategy, Strategy::Moderate);
        assert!((limit - 450.0).abs() < 1e-9);

        let (_, strategy) = propose(SpendClass::Discretionary, 500.0, PrimaryGoal::Travel, &policy);
        assert_eq!(strategy, Strategy::Maintain);
    }

    #[test]
    fn test_essential_always_maintains() {
        let policy = PlanPolicy::default();
        for goal in [PrimaryGoal::SaveMore, PrimaryGoal::PayDebt, PrimaryGoal::Travel] {
            let (limit, strategy) = propose(SpendClass::Essential, 800.0, goal, &policy);
            assert_eq!(limit, 800.0);
            assert_eq!(strategy, Strategy::Maintain);
        }
    }
}
