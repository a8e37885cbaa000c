//! Persisted budget records. Drafts computed by the planning engine only
//! become one of these once the user accepts them.

use serde::{Deserialize, Serialize};

/// Budgeting period for a category limit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BudgetPeriod {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "annual")]
    Annual,
}

/// How a proposed limit relates to the historical average
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Strategy {
    /// Grow the allocation (savings categories under growth goals)
    #[serde(rename = "increase")]
    Increase,
    /// Hold at the historical average
    #[serde(rename = "maintain")]
    Maintain,
    /// Mild trim, 10% under average
    #[serde(rename = "moderate")]
    Moderate,
    /// Deep trim, 20% under average
    #[serde(rename = "aggressive")]
    Aggressive,
}

/// An accepted, persisted budget for one category.
/// Manual edits to these always win over recomputed proposals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub limit: f64,
    pub period: BudgetPeriod,
    pub strategy: Strategy,
}

impl Budget {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        limit: f64,
        period: BudgetPeriod,
        strategy: Strategy,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            limit,
            period,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(
            serde_json::to_string(&Strategy::Aggressive).unwrap(),
            "\"aggressive\""
        );
        let s: Strategy = serde_json::from_str("\"increase\"").unwrap();
        assert_eq!(s, Strategy::Increase);
    }

    #[test]
    fn test_budget_round_trip() {
        let b = Budget::new("b-1", "Groceries", 12000.0, BudgetPeriod::Monthly, Strategy::Maintain);
        let json = serde_json::to_string(&b).unwrap();
        let back: Budget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
