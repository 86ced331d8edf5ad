//! Ingestion adapters: published-sheet CSV fetches and uploaded files.
//!
//! Adapters always hand the pipeline a [`Table`]; anything that cannot be
//! turned into a well-formed table is reported as an [`IngestError`] rather
//! than passed on as partial data.

pub mod sheets;
pub mod upload;

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    data::{CellValue, Row, Table},
    io_utils,
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing spreadsheet id")]
    MissingSpreadsheetId,
    #[error("Could not reach {url}: {message}")]
    Unreachable { url: String, message: String },
    #[error("Sheet could not be loaded ({status})")]
    Status { status: u16 },
    #[error(
        "Sheet is not available as CSV. Publish the sheet or make it public before loading it."
    )]
    NotPublished,
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Failed to read file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Encoding(String),
    #[error("Loading task failed: {0}")]
    Task(String),
}

/// One worksheet (or the single sheet of a CSV file).
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub file_name: String,
    pub sheets: Vec<SheetTable>,
}

/// Header text for column `index`; blank headers become `Column N`.
pub fn normalize_header(value: &CellValue, index: usize) -> String {
    let trimmed = value.display_string().trim().to_string();
    if trimmed.is_empty() {
        format!("Column {}", index + 1)
    } else {
        trimmed
    }
}

/// Parses delimited text whose first record is the header. Every cell stays
/// text; rows with only blank cells are dropped.
pub fn parse_csv_text(text: &str, delimiter: u8) -> Result<Table, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), delimiter);
    let columns = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, header)| normalize_header(&CellValue::text(header), idx))
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                (
                    column.as_str(),
                    CellValue::text(record.get(idx).unwrap_or_default()),
                )
            })
            .collect::<Row>();
        if !row.is_all_blank() {
            rows.push(row);
        }
    }
    Ok(Table::new(columns, rows))
}

/// Builds a table from a cell matrix whose first row is the header.
pub fn matrix_to_table(matrix: Vec<Vec<CellValue>>) -> Table {
    let mut lines = matrix.into_iter();
    let mut header = lines.next().unwrap_or_default();
    while header.last().is_some_and(CellValue::is_blank) {
        header.pop();
    }
    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, value)| normalize_header(value, idx))
        .collect::<Vec<_>>();

    let rows = lines
        .map(|cells| {
            let mut cells = cells.into_iter();
            columns
                .iter()
                .map(|column| (column.as_str(), cells.next().unwrap_or_default()))
                .collect::<Row>()
        })
        .filter(|row| !row.is_all_blank())
        .collect();
    Table::new(columns, rows)
}
