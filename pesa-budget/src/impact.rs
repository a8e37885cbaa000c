//! Plan impact: what the proposed limits add up to, which cuts look
//! risky, and how long the savings target takes at the planned rate.

use crate::stats::{CategoryDraft, Frequency, PlanPolicy};
use crate::strategy::SpendClass;
use pesa_core::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskReason {
    /// Limit under the cheapest observed month of a stable cost
    BelowHistoricalMin,
    /// Deep cut on a bill that recurs every month
    DeepCutOnRecurring,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskyCut {
    pub category: String,
    pub limit: f64,
    pub reason: RiskReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImpactReport {
    pub planned_net_savings: f64,
    pub new_total_budget: f64,
    pub risky_cuts: Vec<RiskyCut>,
    pub freed_up_cash: f64,
}

/// Evaluate a set of drafts against income and history.
///
/// `avg_monthly_income` of 0.0 means income is unknown; planned net
/// savings then falls back to current average spend minus the new budget.
pub fn impact_analysis(
    drafts: &[CategoryDraft],
    avg_monthly_income: f64,
    policy: &PlanPolicy,
) -> ImpactReport {
    let non_savings: Vec<&CategoryDraft> = drafts
        .iter()
        .filter(|d| d.class != SpendClass::Savings)
        .collect();

    let new_total_budget: f64 = non_savings.iter().map(|d| d.limit).sum();
    let current_average: f64 = non_savings.iter().map(|d| d.average).sum();

    let planned_net_savings = if avg_monthly_income > 0.0 {
        avg_monthly_income - new_total_budget
    } else {
        current_average - new_total_budget
    };

    let mut risky_cuts = Vec::new();
    for d in &non_savings {
        if d.limit < d.min && d.volatility < policy.low_volatility {
            risky_cuts.push(RiskyCut {
                category: d.category.clone(),
                limit: d.limit,
                reason: RiskReason::BelowHistoricalMin,
            });
        } else if d.frequency == Frequency::Monthly && d.limit < policy.deep_cut_ratio * d.average {
            risky_cuts.push(RiskyCut {
                category: d.category.clone(),
                limit: d.limit,
                reason: RiskReason::DeepCutOnRecurring,
            });
        }
    }

    ImpactReport {
        planned_net_savings,
        new_total_budget,
        risky_cuts,
        freed_up_cash: (current_average - new_total_budget).max(0.0),
    }
}

/// Months until the savings target at the planned rate; None when there is
/// no target or the plan saves nothing.
pub fn months_to_target(target_amount: Option<f64>, planned_net_savings: f64) -> Option<u32> {
    let target = target_amount?;
    if planned_net_savings <= 0.0 || target <= 0.0 {
        return None;
    }
    Some((target / planned_net_savings).ceil() as u32)
}

/// Merge non-savings drafts whose average is below `min_share` of total
/// average spend into one synthetic "Other Minor Expenses" draft.
///
/// A view-level transform: monetary fields are summed, but per-month
/// vectors across differently-active categories are not merged, so the
/// synthetic draft's history stays empty.
pub fn group_minor_categories(drafts: Vec<CategoryDraft>, min_share: f64) -> Vec<CategoryDraft> {
    let total: f64 = drafts.iter().map(|d| d.average).sum();
    if total <= 0.0 {
        return drafts;
    }
    let threshold = total * min_share;

    let (minor, mut kept): (Vec<CategoryDraft>, Vec<CategoryDraft>) = drafts
        .into_iter()
        .partition(|d| d.class != SpendClass::Savings && d.average < threshold);

    if minor.is_empty() {
        return kept;
    }

    let merged = CategoryDraft {
        category: "Other Minor Expenses".to_string(),
        average: minor.iter().map(|d| d.average).sum(),
        min: minor.iter().map(|d| d.min).sum(),
        max: minor.iter().map(|d| d.max).sum(),
        history: Vec::new(),
        volatility: 0.0,
        frequency: Frequency::Occasional,
        active_months: minor.iter().map(|d| d.active_months).max().unwrap_or(0),
        limit: minor.iter().map(|d| d.limit).sum(),
        strategy: Strategy::Maintain,
        class: SpendClass::Discretionary,
    };
    kept.push(merged);
    kept.sort_by(|a, b| b.average.partial_cmp(&a.average).unwrap());
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(category: &str, class: SpendClass, average: f64, limit: f64) -> CategoryDraft {
        CategoryDraft {
            category: category.to_string(),
            average,
            min: average,
            max: average,
            history: vec![average],
            volatility: 0.0,
            frequency: Frequency::Monthly,
            active_months: 1,
            limit,
            strategy: Strategy::Maintain,
            class,
        }
    }

    #[test]
    fn test_totals_exclude_savings() {
        let drafts = vec![
            draft("Rent", SpendClass::Essential, 9000.0, 9000.0),
            draft("Savings", SpendClass::Savings, 5000.0, 5500.0),
        ];
        let report = impact_analysis(&drafts, 20000.0, &PlanPolicy::default());
        assert_eq!(report.new_total_budget, 9000.0);
        assert_eq!(report.planned_net_savings, 11000.0);
    }

    #[test]
    fn test_unknown_income_falls_back_to_average_delta() {
        let mut d = draft("Dining", SpendClass::Discretionary, 1000.0, 800.0);
        d.frequency = Frequency::Occasional;
        let report = impact_analysis(&[d], 0.0, &PlanPolicy::default());
        assert_eq!(report.planned_net_savings, 200.0);
        assert_eq!(report.freed_up_cash, 200.0);
    }

    #[test]
    fn test_below_min_cut_on_stable_cost_is_risky() {
        let mut d = draft("Utilities", SpendClass::Essential, 1000.0, 900.0);
        d.min = 950.0;
        d.volatility = 0.1;
        d.frequency = Frequency::Occasional;
        let report = impact_analysis(&[d], 0.0, &PlanPolicy::default());
        assert_eq!(report.risky_cuts.len(), 1);
        assert_eq!(report.risky_cuts[0].reason, RiskReason::BelowHistoricalMin);
    }

    #[test]
    fn test_volatile_below_min_cut_is_not_risky() {
        let mut d = draft("Utilities", SpendClass::Essential, 1000.0, 900.0);
        d.min = 950.0;
        d.volatility = 0.6;
        d.frequency = Frequency::Occasional;
        let report = impact_analysis(&[d], 0.0, &PlanPolicy::default());
        assert!(report.risky_cuts.is_empty());
    }

    #[test]
    fn test_savings_never_flagged() {
        let mut d = draft("Savings", SpendClass::Savings, 1000.0, 100.0);
        d.min = 900.0;
        d.volatility = 0.0;
        let report = impact_analysis(&[d], 0.0, &PlanPolicy::default());
        assert!(report.risky_cuts.is_empty());
    }

    #[test]
    fn test_deep_cut_on_monthly_bill_is_risky() {
        let mut d = draft("Rent", SpendClass::Essential, 10000.0, 7500.0);
        d.min = 7000.0; // above-min limit, so only the recurring rule fires
        let report = impact_analysis(&[d], 0.0, &PlanPolicy::default());
        assert_eq!(report.risky_cuts.len(), 1);
        assert_eq!(report.risky_cuts[0].reason, RiskReason::DeepCutOnRecurring);
    }

    #[test]
    fn test_months_to_target_rounds_up() {
        assert_eq!(months_to_target(Some(10000.0), 3000.0), Some(4));
        assert_eq!(months_to_target(Some(9000.0), 3000.0), Some(3));
        assert_eq!(months_to_target(Some(10000.0), 0.0), None);
        assert_eq!(months_to_target(Some(10000.0), -500.0), None);
        assert_eq!(months_to_target(None, 3000.0), None);
    }

    #[test]
    fn test_minor_categories_merge_without_history() {
        let drafts = vec![
            draft("Rent", SpendClass::Essential, 9000.0, 9000.0),
            draft("Stamps", SpendClass::Essential, 50.0, 50.0),
            draft("Snacks", SpendClass::Discretionary, 150.0, 120.0),
            draft("Savings", SpendClass::Savings, 60.0, 66.0),
        ];
        let grouped = group_minor_categories(drafts, 0.05);
        let other = grouped
            .iter()
            .find(|d| d.category == "Other Minor Expenses")
            .unwrap();
        assert_eq!(other.average, 200.0);
        assert_eq!(other.limit, 170.0);
        assert!(other.history.is_empty());
        // Savings stays its own line no matter how small
        assert!(grouped.iter().any(|d| d.category == "Savings"));
        assert_eq!(grouped.len(), 3);
    }
}
