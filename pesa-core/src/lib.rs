//! pesa-core: domain types and local resolution heuristics.
//!
//! Everything here is pure: the regex cascade, the category keyword table
//! and the record types carry no I/O. Persistence and remote calls live in
//! the outer crates.

pub mod budget;
pub mod category_rules;
pub mod patterns;
pub mod profile;
pub mod transaction;

pub use budget::{Budget, BudgetPeriod, Strategy};
pub use category_rules::category_for;
pub use patterns::{HeuristicResult, extract_merchant, extract_points, match_merchant_rule};
pub use profile::{PrimaryGoal, UserProfile};
pub use transaction::{Transaction, TxnKind, is_transfer_description};
