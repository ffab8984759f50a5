//! Console summary of an aggregation run.

use crate::data::{AggregatedRow, AggregatedTable, Column, IndicatorKind};
use chrono::NaiveDate;
use std::fmt;

/// Rows shown at the bottom of the summary.
pub const TAIL_ROWS: usize = 3;

#[derive(Debug, Clone)]
pub struct TableSummary {
    pub symbol: String,
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub columns: Vec<Column>,
    pub tail: Vec<AggregatedRow>,
    pub skipped: Vec<(IndicatorKind, String)>,
    /// BLAKE3 over dates, column names and every cell.
    pub data_hash: String,
}

impl TableSummary {
    pub fn from_table(table: &AggregatedTable) -> Self {
        let tail_start = table.rows.len().saturating_sub(TAIL_ROWS);
        Self {
            symbol: table.symbol.clone(),
            rows: table.len(),
            first_date: table.first_date(),
            last_date: table.last_date(),
            columns: table.columns.clone(),
            tail: table.rows[tail_start..].to_vec(),
            skipped: table
                .skipped
                .iter()
                .map(|s| (s.kind, s.reason.to_string()))
                .collect(),
            data_hash: table_hash(table),
        }
    }
}

/// Deterministic hash of the table contents.
///
/// Covers column names in order, then per row the date and each cell
/// (a presence byte followed by the little-endian bits when present).
pub fn table_hash(table: &AggregatedTable) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(table.symbol.as_bytes());
    for column in &table.columns {
        hasher.update(column.name().as_bytes());
        hasher.update(&[0]);
    }
    for row in &table.rows {
        hasher.update(row.date.to_string().as_bytes());
        for column in &table.columns {
            match row.get(*column) {
                Some(v) => {
                    hasher.update(&[1]);
                    hasher.update(&v.to_le_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol: {}", self.symbol)?;
        writeln!(f, "Shape: ({}, {})", self.rows, self.columns.len())?;
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => writeln!(f, "Date range: {first} to {last}")?,
            _ => writeln!(f, "Date range: (empty)")?,
        }
        let names: Vec<_> = self.columns.iter().map(|c| c.name()).collect();
        writeln!(f, "Columns: {}", names.join(", "))?;
        for (kind, reason) in &self.skipped {
            writeln!(f, "Skipped {kind}: {reason}")?;
        }
        writeln!(f, "Data hash: {}", self.data_hash)?;

        if !self.tail.is_empty() {
            writeln!(f)?;
            writeln!(f, "Latest data:")?;
            write!(f, "{:<12}", "date")?;
            for name in &names {
                write!(f, "{name:>14}")?;
            }
            writeln!(f)?;
            for row in &self.tail {
                write!(f, "{:<12}", row.date.to_string())?;
                for column in &self.columns {
                    match row.get(*column) {
                        Some(v) => write!(f, "{v:>14.4}")?,
                        None => write!(f, "{:>14}", "NaN")?,
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
