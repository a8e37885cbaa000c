//! pesa-budget: statistical aggregation over transaction history into
//! per-category spending baselines and goal-driven budget proposals.
//!
//! Everything is pure and recomputed from scratch each planning run;
//! persisted Budget records live in pesa-core and always override the
//! freshly computed suggestions.

pub mod impact;
pub mod stats;
pub mod strategy;

pub use impact::{
    ImpactReport, RiskReason, RiskyCut, group_minor_categories, impact_analysis, months_to_target,
};
pub use stats::{
    CategoryDraft, Frequency, PlanPolicy, active_months, average_monthly_income, compute_drafts,
};
pub use strategy::{SpendClass, classify, propose};
