//! Import command glue: statement rows into stored transactions, plus the
//! loyalty-points scan over raw descriptions.

use anyhow::{Context, Result, bail};
use std::path::Path;

use pesa_core::{Transaction, TxnKind, extract_points};
use pesa_ingest::parse_statement_csv;

use crate::state;

pub struct ImportSummary {
    pub imported: usize,
    pub transfers: usize,
    pub points_balance: Option<i64>,
}

pub fn import_file(path: &Path, account: &str) -> Result<ImportSummary> {
    if !path.exists() {
        bail!("statement not found: {} (pass a CSV export)", path.display());
    }

    let rows = parse_statement_csv(path).with_context(|| format!("parsing {}", path.display()))?;

    let mut txns = state::read_transactions()?;
    let mut next_seq = txns.len();
    let mut transfers = 0;
    let mut points_balance = None;

    for row in &rows {
        // Statements sometimes carry the loyalty balance in free text;
        // keep the latest sighting per account
        if let Some(points) = extract_points(&row.description) {
            points_balance = Some(points);
        }

        let kind = if row.amount < 0.0 {
            TxnKind::Expense
        } else {
            TxnKind::Income
        };
        let txn = Transaction::new(
            format!("{account}-{next_seq:05}"),
            account,
            row.date,
            "",
            row.amount,
            kind,
            row.description.clone(),
        );
        if txn.is_transfer {
            transfers += 1;
        }
        txns.push(txn);
        next_seq += 1;
    }

    state::write_transactions(&txns)?;

    if let Some(points) = points_balance {
        let mut balances = state::read_loyalty()?;
        balances.insert(account.to_string(), points);
        state::write_loyalty(&balances)?;
    }

    Ok(ImportSummary {
        imported: rows.len(),
        transfers,
        points_balance,
    })
}
