//! User profile: the primary goal steers which budget strategies the
//! planning engine proposes.

use serde::{Deserialize, Serialize};

/// The user's stated primary financial goal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrimaryGoal {
    #[serde(rename = "save-more")]
    SaveMore,
    #[serde(rename = "invest")]
    Invest,
    #[serde(rename = "pay-debt")]
    PayDebt,
    #[serde(rename = "control-spending")]
    ControlSpending,
    #[serde(rename = "travel")]
    Travel,
    #[serde(rename = "buy-asset")]
    BuyAsset,
}

impl PrimaryGoal {
    /// Goals that favor growing savings allocations
    pub fn favors_saving(&self) -> bool {
        matches!(
            self,
            PrimaryGoal::SaveMore | PrimaryGoal::Invest | PrimaryGoal::Travel | PrimaryGoal::BuyAsset
        )
    }

    /// Goals that justify a deep cut on discretionary spend
    pub fn wants_aggressive_cuts(&self) -> bool {
        matches!(
            self,
            PrimaryGoal::SaveMore | PrimaryGoal::PayDebt | PrimaryGoal::ControlSpending
        )
    }

    /// Goals that justify a mild trim on discretionary spend
    pub fn wants_moderate_cuts(&self) -> bool {
        matches!(self, PrimaryGoal::Invest | PrimaryGoal::BuyAsset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub primary_goal: PrimaryGoal,
    /// Savings target the goal projection counts toward, if any
    pub target_amount: Option<f64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            primary_goal: PrimaryGoal::SaveMore,
            target_amount: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_buckets() {
        assert!(PrimaryGoal::Travel.favors_saving());
        assert!(!PrimaryGoal::PayDebt.favors_saving());
        assert!(PrimaryGoal::ControlSpending.wants_aggressive_cuts());
        assert!(PrimaryGoal::BuyAsset.wants_moderate_cuts());
        assert!(!PrimaryGoal::Travel.wants_aggressive_cuts());
        assert!(!PrimaryGoal::Travel.wants_moderate_cuts());
    }
}
