#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use sheet_dashboard::data::{CellValue, Row, Table};
use tempfile::{TempDir, tempdir};

/// A worksheet cell written into generated `.xlsx` fixtures.
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
    Blank,
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    /// Builds an `.xlsx` workbook with one worksheet per `(name, cells)`
    /// entry; the first row of each sheet is its header.
    pub fn write_xlsx(&self, name: &str, sheets: &[(&str, Vec<Vec<Cell<'_>>>)]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        for (sheet_name, rows) in sheets {
            let mut worksheet = Worksheet::new();
            worksheet.set_name(*sheet_name).expect("sheet name");
            for (r, cells) in rows.iter().enumerate() {
                for (c, cell) in cells.iter().enumerate() {
                    let (r, c) = (r as u32, c as u16);
                    match cell {
                        Cell::Text(value) => {
                            worksheet.write_string(r, c, *value).expect("write string");
                        }
                        Cell::Number(value) => {
                            worksheet.write_number(r, c, *value).expect("write number");
                        }
                        Cell::Bool(value) => {
                            worksheet.write_boolean(r, c, *value).expect("write boolean");
                        }
                        Cell::Blank => {}
                    }
                }
            }
            workbook.push_worksheet(worksheet);
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

/// Builds a text-only table from a header line and data lines.
pub fn text_table(columns: &[&str], rows: &[&[&str]]) -> Table {
    let columns = columns.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|values| {
            columns
                .iter()
                .zip(values.iter())
                .map(|(column, value)| (column.as_str(), CellValue::text(*value)))
                .collect::<Row>()
        })
        .collect();
    Table::new(columns, rows)
}
