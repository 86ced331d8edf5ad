use std::{fs, path::Path};

use calamine::{Data, Range, Reader, open_workbook_auto};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use super::{IngestError, SheetTable, Workbook, matrix_to_table, parse_csv_text};
use crate::{data::CellValue, io_utils};

/// Sheet name given to the single table of a delimited text upload.
pub const CSV_SHEET_NAME: &str = "CSV";

#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
        }
    }
}

/// Reads an uploaded file. `.csv`/`.tsv` files become one sheet; workbooks
/// (xlsx, xlsm, xlsb, xls, ods) yield one sheet per worksheet.
pub fn parse_spreadsheet_file(path: &Path, options: &UploadOptions) -> Result<Workbook, IngestError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let sheets = if is_delimited(path) {
        vec![read_delimited(path, options)?]
    } else {
        read_workbook(path)?
    };
    info!(
        "Parsed {} sheet(s) from {:?}",
        sheets.len(),
        file_name
    );
    Ok(Workbook { file_name, sheets })
}

fn is_delimited(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv"))
}

fn read_delimited(path: &Path, options: &UploadOptions) -> Result<SheetTable, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = io_utils::decode_bytes(&bytes, options.encoding)?;
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    debug!(
        "Reading {:?} with delimiter '{}'",
        path,
        io_utils::printable_delimiter(delimiter)
    );
    Ok(SheetTable {
        sheet_name: CSV_SHEET_NAME.to_string(),
        table: parse_csv_text(&text, delimiter)?,
    })
}

fn read_workbook(path: &Path) -> Result<Vec<SheetTable>, IngestError> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name)?;
        let table = matrix_to_table(range_to_matrix(&range));
        debug!(
            "Worksheet {:?}: {} column(s), {} row(s)",
            sheet_name,
            table.columns.len(),
            table.row_count()
        );
        sheets.push(SheetTable { sheet_name, table });
    }
    Ok(sheets)
}

/// Lays the used range out from A1 so header positions match the sheet.
fn range_to_matrix(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((last_row, last_col)) = range.end() else {
        return Vec::new();
    };
    (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).map(cell_value).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Raw cell conversion: date cells stay spreadsheet serials, booleans become
/// text.
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(err) => CellValue::Text(err.to_string()),
    }
}
