//! pesa-ingest: best-effort CSV statement import.

pub mod statement;

pub use statement::{StatementRow, parse_statement_csv, parse_statement_reader};
