//! Cell values, row records, and tables.
//!
//! A [`Table`] is what every ingestion adapter hands to the pipeline: an
//! ordered column list (the schema authority) plus [`Row`] records keyed by
//! column name. Rows keep insertion order so that search serialization matches
//! the order the columns were read in.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer, ser::SerializeMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl CellValue {
    /// Builds a text cell, mapping the empty string to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    /// True for empty cells and text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }

    pub fn display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_plain_number(*n),
            CellValue::Date(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_str(""),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) if !n.is_finite() => serializer.serialize_none(),
            CellValue::Number(n) if is_integral(*n) && n.abs() < EXACT_I64_LIMIT => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) if is_integral(*n) => match n.to_string().parse::<i128>() {
                Ok(whole) => serializer.serialize_i128(whole),
                Err(_) => serializer.serialize_f64(*n),
            },
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Date(dt) => {
                serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
            }
        }
    }
}

/// Converts a cell into a number, or `None` when it is not a number.
///
/// Text is trimmed and every comma is stripped before parsing, so `"1,234.5"`
/// becomes `1234.5`. Commas are never treated as decimal separators.
pub fn to_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) if n.is_nan() => None,
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_grouped_number(s),
        CellValue::Empty | CellValue::Date(_) => None,
    }
}

fn parse_grouped_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

const EXACT_I64_LIMIT: f64 = 9.0e15;
/// Whole numbers at or above this magnitude are written in exponent form.
const PLAIN_INTEGER_LIMIT: f64 = 1e21;

fn is_integral(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() < PLAIN_INTEGER_LIMIT
}

fn format_plain_number(value: f64) -> String {
    if is_integral(value) && value.abs() < EXACT_I64_LIMIT {
        format!("{value:.0}")
    } else {
        // shortest round-trip digits, zero padded for large whole numbers
        value.to_string()
    }
}

/// One record, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`. An existing column keeps its position and
    /// takes the new value.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// The cell for `column`, or [`CellValue::Empty`] when it is missing.
    pub fn value(&self, column: &str) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.get(column).unwrap_or(&EMPTY)
    }

    /// Trimmed display text of `column`.
    pub fn trimmed(&self, column: &str) -> String {
        self.value(column).display_string().trim().to_string()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_all_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_blank())
    }

    /// Lower-cased JSON rendering of the whole row, used by free-text search.
    pub fn search_text(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value.into());
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}
