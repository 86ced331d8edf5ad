//! Column type inference and column discovery helpers.
//!
//! A column is numeric when at least [`NUMERIC_RATIO_THRESHOLD`] of its
//! non-blank cells coerce via [`to_number`]; columns with no non-blank cells
//! are textual.

use std::collections::HashSet;

use regex::Regex;

use crate::data::{Row, to_number};

pub const NUMERIC_RATIO_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClassification {
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
}

impl ColumnClassification {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub non_empty: usize,
    pub numeric: usize,
}

impl ColumnProfile {
    pub fn numeric_ratio(&self) -> Option<f64> {
        (self.non_empty > 0).then(|| self.numeric as f64 / self.non_empty as f64)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_ratio()
            .is_some_and(|ratio| ratio >= NUMERIC_RATIO_THRESHOLD)
    }
}

pub fn profile_columns<'a, I>(rows: I, columns: &[String]) -> Vec<ColumnProfile>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut profiles = columns
        .iter()
        .map(|name| ColumnProfile {
            name: name.clone(),
            non_empty: 0,
            numeric: 0,
        })
        .collect::<Vec<_>>();
    for row in rows {
        for profile in &mut profiles {
            let value = row.value(&profile.name);
            if value.is_blank() {
                continue;
            }
            profile.non_empty += 1;
            if to_number(value).is_some() {
                profile.numeric += 1;
            }
        }
    }
    profiles
}

pub fn infer_column_types<'a, I>(rows: I, columns: &[String]) -> ColumnClassification
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut classification = ColumnClassification::default();
    for profile in profile_columns(rows, columns) {
        if profile.is_numeric() {
            classification.numeric_columns.push(profile.name);
        } else {
            classification.text_columns.push(profile.name);
        }
    }
    classification
}

/// Columns whose name matches `pattern`, in original order.
pub fn find_matching_columns(columns: &[String], pattern: &Regex) -> Vec<String> {
    columns
        .iter()
        .filter(|c| pattern.is_match(c))
        .cloned()
        .collect()
}

/// Distinct trimmed non-blank values of `column`, sorted for a picker.
pub fn category_options<'a, I>(rows: I, column: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut seen = HashSet::new();
    let mut options = Vec::new();
    for row in rows {
        let value = row.trimmed(column);
        if !value.is_empty() && seen.insert(value.clone()) {
            options.push(value);
        }
    }
    options.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    options
}
