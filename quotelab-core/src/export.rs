//! CSV export of the aggregated table.
//!
//! Header is `date` followed by the table's columns in order. Null values are
//! written as empty cells; floats use the shortest representation that reads
//! back to the same value.

use crate::data::AggregatedTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write the table as CSV to any writer.
pub fn write_csv<W: Write>(table: &AggregatedTable, writer: W) -> Result<W, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push("date".to_string());
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    let mut record = Vec::with_capacity(header.len());
    for row in &table.rows {
        record.clear();
        record.push(row.date.format("%Y-%m-%d").to_string());
        record.extend(
            table
                .columns
                .iter()
                .map(|c| row.get(*c).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))
}

/// Render the table as a CSV string.
pub fn export_csv(table: &AggregatedTable) -> Result<String, ExportError> {
    let data = write_csv(table, Vec::new())?;
    Ok(String::from_utf8(data)?)
}

/// Write the table to `path`, replacing any existing file.
pub fn write_csv_file(table: &AggregatedTable, path: &Path) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = write_csv(table, BufWriter::new(file))?;
    out.flush().map_err(io_err)?;
    Ok(())
}

/// `<SYMBOL>_stock_data.csv`, with path separators in the symbol replaced.
pub fn default_output_path(symbol: &str) -> PathBuf {
    let safe: String = symbol
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    PathBuf::from(format!("{safe}_stock_data.csv"))
}
