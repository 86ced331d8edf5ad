use std::{cmp::Ordering, collections::HashMap};

use crate::data::{Row, to_number};

pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_TOP_N: usize = 6;
/// Upper bound on groups kept before the Others bucket is folded.
pub const FULL_AGGREGATION_CAP: usize = 500;
pub const OTHERS_LABEL: &str = "Others";

/// Parallel label/value series sorted by descending value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Table rows of `label, value, share%` for terminal output.
    pub fn render_rows(&self, format: impl Fn(f64) -> String) -> Vec<Vec<String>> {
        let total = self.total();
        self.iter()
            .map(|(label, value)| {
                let share = if total > 0.0 {
                    value / total * 100.0
                } else {
                    0.0
                };
                vec![label.to_string(), format(value), format!("{share:.2}%")]
            })
            .collect()
    }
}

struct GroupAccumulator {
    order: Vec<String>,
    totals: HashMap<String, f64>,
}

impl GroupAccumulator {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            totals: HashMap::new(),
        }
    }

    fn ingest(&mut self, row: &Row, label_key: &str, value_key: &str) {
        let label = row.trimmed(label_key);
        if label.is_empty() {
            return;
        }
        let Some(value) = to_number(row.value(value_key)) else {
            return;
        };
        match self.totals.get_mut(&label) {
            Some(total) => *total += value,
            None => {
                self.order.push(label.clone());
                self.totals.insert(label, value);
            }
        }
    }

    fn into_sorted(self) -> Vec<(String, f64)> {
        let Self { order, mut totals } = self;
        let mut entries = order
            .into_iter()
            .map(|label| {
                let total = totals.remove(&label).unwrap_or_default();
                (label, total)
            })
            .collect::<Vec<_>>();
        // stable: ties (including -0 vs 0) keep first-appearance order
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        entries
    }
}

/// Sums `value_key` per trimmed `label_key`, largest first, at most `limit`
/// groups. Rows with a blank label or a non-numeric value are skipped.
pub fn aggregate_by_key<'a, I>(
    rows: I,
    label_key: &str,
    value_key: &str,
    limit: usize,
) -> AggregationResult
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut accumulator = GroupAccumulator::new();
    for row in rows {
        accumulator.ingest(row, label_key, value_key);
    }
    let mut result = AggregationResult::default();
    for (label, total) in accumulator.into_sorted().into_iter().take(limit) {
        result.labels.push(label);
        result.values.push(total);
    }
    result
}

/// Keeps the `top_n` largest groups and folds the rest into a trailing
/// `"Others"` entry when their sum is strictly positive.
pub fn aggregate_by_key_with_others<'a, I>(
    rows: I,
    label_key: &str,
    value_key: &str,
    top_n: usize,
) -> AggregationResult
where
    I: IntoIterator<Item = &'a Row>,
{
    let full = aggregate_by_key(rows, label_key, value_key, FULL_AGGREGATION_CAP);
    let keep = top_n.min(full.len());
    let rest: f64 = full.values[keep..].iter().sum();
    let mut result = AggregationResult {
        labels: full.labels[..keep].to_vec(),
        values: full.values[..keep].to_vec(),
    };
    if rest > 0.0 {
        result.labels.push(OTHERS_LABEL.to_string());
        result.values.push(rest);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    fn rows(pairs: &[(&str, &str)]) -> Vec<Row> {
        pairs
            .iter()
            .map(|(g, v)| {
                vec![("g", CellValue::text(*g)), ("v", CellValue::text(*v))]
                    .into_iter()
                    .collect()
            })
            .collect()
    }

    #[test]
    fn sums_per_label_and_skips_blank_labels() {
        let data = rows(&[("A", "10"), ("B", "5"), ("A", "3"), ("", "99")]);
        let result = aggregate_by_key(&data, "g", "v", DEFAULT_LIMIT);
        assert_eq!(result.labels, vec!["A", "B"]);
        assert_eq!(result.values, vec![13.0, 5.0]);
    }

    #[test]
    fn non_numeric_values_do_not_create_groups() {
        let data = rows(&[("A", "n/a"), ("B", "1,000"), (" B ", "1")]);
        let result = aggregate_by_key(&data, "g", "v", DEFAULT_LIMIT);
        assert_eq!(result.labels, vec!["B"]);
        assert_eq!(result.values, vec![1001.0]);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let data = rows(&[("C", "2"), ("A", "5"), ("B", "2"), ("D", "2")]);
        let result = aggregate_by_key(&data, "g", "v", 3);
        assert_eq!(result.labels, vec!["A", "C", "B"]);
    }

    #[test]
    fn others_bucket_collects_positive_remainder() {
        let data = rows(&[("A", "10"), ("B", "8"), ("C", "3"), ("D", "2")]);
        let result = aggregate_by_key_with_others(&data, "g", "v", 2);
        assert_eq!(result.labels, vec!["A", "B", OTHERS_LABEL]);
        assert_eq!(result.values, vec![10.0, 8.0, 5.0]);
    }

    #[test]
    fn others_bucket_skipped_for_non_positive_remainder() {
        let data = rows(&[("A", "10"), ("B", "8"), ("C", "-3"), ("D", "3")]);
        let result = aggregate_by_key_with_others(&data, "g", "v", 2);
        assert_eq!(result.labels, vec!["A", "B"]);

        let small = rows(&[("A", "1")]);
        let result = aggregate_by_key_with_others(&small, "g", "v", DEFAULT_TOP_N);
        assert_eq!(result.labels, vec!["A"]);
    }

    #[test]
    fn signed_zero_totals_tie() {
        let data = rows(&[("A", "-0"), ("B", "0")]);
        let result = aggregate_by_key(&data, "g", "v", 10);
        assert_eq!(result.labels, vec!["A", "B"]);
    }

    #[test]
    fn others_stops_at_the_aggregation_cap() {
        let data = (0..510)
            .map(|i| {
                vec![
                    ("g", CellValue::Text(format!("L{i:03}"))),
                    ("v", CellValue::Number((1000 - i) as f64)),
                ]
                .into_iter()
                .collect::<Row>()
            })
            .collect::<Vec<_>>();
        let result = aggregate_by_key_with_others(&data, "g", "v", DEFAULT_TOP_N);
        assert_eq!(result.len(), DEFAULT_TOP_N + 1);
        assert_eq!(result.labels[DEFAULT_TOP_N], OTHERS_LABEL);

        let expected: f64 = (DEFAULT_TOP_N..FULL_AGGREGATION_CAP)
            .map(|i| (1000 - i) as f64)
            .sum();
        assert_eq!(result.values[DEFAULT_TOP_N], expected);
    }

    #[test]
    fn render_rows_reports_shares() {
        let data = rows(&[("A", "3"), ("B", "1")]);
        let result = aggregate_by_key(&data, "g", "v", DEFAULT_LIMIT);
        let rendered = result.render_rows(|v| format!("{v:.0}"));
        assert_eq!(rendered[0], vec!["A", "3", "75.00%"]);
        assert_eq!(rendered[1], vec!["B", "1", "25.00%"]);
    }
}
