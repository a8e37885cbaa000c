//! Parse bank / mobile-money CSV exports into typed statement rows.
//!
//! Exports vary: M-PESA statements lead with several preamble rows before a
//! "Completion Time" header, bank exports start with "Date". The reader
//! scans for the header row, maps columns by name, and skips rows whose
//! date or amount does not parse.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One raw statement line, sign-carrying: negative = money out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub balance: Option<f64>,
}

const DATE_HEADERS: &[&str] = &["date", "completion time", "transaction date"];
const DESC_HEADERS: &[&str] = &["description", "details", "narrative"];
const AMOUNT_HEADERS: &[&str] = &["amount", "transaction amount"];
const PAID_IN_HEADERS: &[&str] = &["paid in", "money in", "credit"];
const PAID_OUT_HEADERS: &[&str] = &["withdrawn", "money out", "paid out", "debit"];
const BALANCE_HEADERS: &[&str] = &["balance", "running balance"];

#[derive(Debug, Default)]
struct Columns {
    date: Option<usize>,
    description: Option<usize>,
    amount: Option<usize>,
    paid_in: Option<usize>,
    paid_out: Option<usize>,
    balance: Option<usize>,
}

fn find_column(record: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    record
        .iter()
        .position(|cell| names.contains(&cell.trim().to_lowercase().as_str()))
}

fn detect_header(record: &csv::StringRecord) -> Option<Columns> {
    let date = find_column(record, DATE_HEADERS)?;
    let description = find_column(record, DESC_HEADERS)?;
    let cols = Columns {
        date: Some(date),
        description: Some(description),
        amount: find_column(record, AMOUNT_HEADERS),
        paid_in: find_column(record, PAID_IN_HEADERS),
        paid_out: find_column(record, PAID_OUT_HEADERS),
        balance: find_column(record, BALANCE_HEADERS),
    };
    // A usable header needs either a signed amount column or an in/out pair
    if cols.amount.is_some() || (cols.paid_in.is_some() && cols.paid_out.is_some()) {
        Some(cols)
    } else {
        None
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // M-PESA completion times carry a clock; the calendar day is enough
    let day = s.split_whitespace().next().unwrap_or(s);
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(day, fmt) {
            return Some(d);
        }
    }
    None
}

fn parse_money(s: &str) -> Option<f64> {
    let cleaned = s.trim().trim_start_matches("Ksh").replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a statement CSV from any reader. Rows before the header and rows
/// with unparseable dates are skipped; a file with no recognizable header
/// is an error surfaced to the user for manual entry.
pub fn parse_statement_reader(input: impl Read) -> Result<Vec<StatementRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(input);

    let mut columns: Option<Columns> = None;
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let cols = match &columns {
            None => {
                columns = detect_header(&record);
                continue;
            }
            Some(c) => c,
        };

        let date = match cols.date.and_then(|i| record.get(i)).and_then(parse_date) {
            Some(d) => d,
            None => continue,
        };

        let amount = if let Some(i) = cols.amount {
            match record.get(i).and_then(parse_money) {
                Some(a) => a,
                None => continue,
            }
        } else {
            // In/out pair: out column is positive in the export, flip it
            let paid_in = cols.paid_in.and_then(|i| record.get(i)).and_then(parse_money);
            let paid_out = cols.paid_out.and_then(|i| record.get(i)).and_then(parse_money);
            match (paid_in, paid_out) {
                (Some(v), _) if v != 0.0 => v,
                (_, Some(v)) if v != 0.0 => -v.abs(),
                _ => continue,
            }
        };

        rows.push(StatementRow {
            date,
            description: cols
                .description
                .and_then(|i| record.get(i))
                .unwrap_or("")
                .trim()
                .to_string(),
            amount,
            balance: cols.balance.and_then(|i| record.get(i)).and_then(parse_money),
        });
    }

    if columns.is_none() {
        bail!("no recognizable header row; enter transactions manually");
    }
    Ok(rows)
}

pub fn parse_statement_csv(path: impl AsRef<Path>) -> Result<Vec<StatementRow>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_statement_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_export_with_signed_amount() {
        let csv = "\
Some Bank Ltd,,,
Date,Description,Amount,Balance
2025-11-17,DEBIT CARD TXN AT UBER * PENDING AMSTERDAM,-830.00,\"12,450.00\"
2025-11-18,SALARY NOVEMBER,185000.00,\"197,450.00\"
garbage,not a row,,
";
        let rows = parse_statement_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, -830.0);
        assert_eq!(rows[0].balance, Some(12450.0));
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2025, 11, 18).unwrap());
    }

    #[test]
    fn test_mpesa_export_with_in_out_pair() {
        let csv = "\
MPESA STATEMENT,,,,
Completion Time,Details,Paid In,Withdrawn,Balance
17/11/2025 08:52,Ksh1450.00 paid to KPLC PREPAID for account 54405.,,\"1,450.00\",\"3,210.00\"
18/11/2025 10:01,Received Ksh2000.00 from JOHN KAMAU 0711223344.,\"2,000.00\",,\"5,210.00\"
";
        let rows = parse_statement_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, -1450.0, "withdrawn column flips sign");
        assert_eq!(rows[1].amount, 2000.0);
        assert!(rows[0].description.contains("KPLC"));
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let csv = "just,some,cells\n1,2,3\n";
        let err = parse_statement_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("header"));
    }
}
