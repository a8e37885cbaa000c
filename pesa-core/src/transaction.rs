//! Transaction record types shared across the import, enrichment and
//! budgeting layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a transaction. Amounts are stored as non-negative
/// magnitudes; the kind carries the sign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TxnKind {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "income")]
    Income,
}

/// A single imported or manually entered transaction.
///
/// Owned by the persistence layer; the enrichment and budgeting engines
/// operate on snapshots and return updated copies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique identifier
    pub id: String,
    /// Account this transaction belongs to
    pub account_id: String,
    /// Calendar day of the transaction
    pub date: NaiveDate,
    /// Display name of the counterparty
    pub merchant: String,
    /// Non-negative magnitude
    pub amount: f64,
    /// Expense or income
    pub kind: TxnKind,
    /// Free-form category label ("Groceries", "Other", ...)
    pub category: String,
    /// Original raw statement-line text
    pub description: String,
    /// Money movement between the user's own accounts
    pub is_transfer: bool,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        date: NaiveDate,
        merchant: impl Into<String>,
        amount: f64,
        kind: TxnKind,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self {
            id: id.into(),
            account_id: account_id.into(),
            date,
            merchant: merchant.into(),
            amount: amount.abs(),
            kind,
            category: String::new(),
            is_transfer: is_transfer_description(&description),
            description,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TxnKind::Income
    }

    /// Month bucket used by the statistics engine
    pub fn month(&self) -> (i32, u32) {
        use chrono::Datelike;
        (self.date.year(), self.date.month())
    }
}

/// Own-account movement markers. Account-pair reconciliation needs metadata
/// statements don't carry, so this stays a description heuristic plus a
/// manual override on the record.
const TRANSFER_MARKERS: &[&str] = &[
    "own account",
    "m-shwari",
    "transfer to savings",
    "transfer from savings",
    "standing order to",
    "internal transfer",
];

pub fn is_transfer_description(description: &str) -> bool {
    let desc = description.to_lowercase();
    TRANSFER_MARKERS.iter().any(|m| desc.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_creation() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 17).unwrap();
        let txn = Transaction::new(
            "txn-001",
            "acct-mpesa",
            date,
            "KPLC PREPAID",
            -1450.0,
            TxnKind::Expense,
            "Confirmed. Ksh1,450.00 paid to KPLC PREPAID for account 123456.",
        );
        assert_eq!(txn.amount, 1450.0, "amounts are stored as magnitudes");
        assert!(txn.is_expense());
        assert!(!txn.is_transfer);
        assert_eq!(txn.month(), (2025, 11));
    }

    #[test]
    fn test_transfer_marking() {
        assert!(is_transfer_description(
            "Transferred Ksh5,000.00 to M-SHWARI account on 1/2/25"
        ));
        assert!(is_transfer_description("Internal transfer to own account"));
        assert!(!is_transfer_description(
            "Ksh500.00 paid to NAIVAS SUPERMARKET."
        ));
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&TxnKind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");
    }
}
