use std::collections::HashSet;

use crate::data::{Row, to_number};

/// Count/sum/avg/min/max over a metric column. With no numeric cells every
/// field is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Default)]
struct SummaryAccumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl SummaryAccumulator {
    fn add_value(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
    }

    fn finish(self) -> NumericSummary {
        let avg = if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        };
        NumericSummary {
            count: self.count,
            sum: self.sum,
            avg,
            min: self.min.filter(|v| v.is_finite()).unwrap_or(0.0),
            max: self.max.filter(|v| v.is_finite()).unwrap_or(0.0),
        }
    }
}

pub fn summarize_numeric<'a, I>(rows: I, value_key: &str) -> NumericSummary
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut accumulator = SummaryAccumulator::default();
    for row in rows {
        if let Some(value) = to_number(row.value(value_key)) {
            accumulator.add_value(value);
        }
    }
    accumulator.finish()
}

/// Number of distinct trimmed non-blank values in `key`.
pub fn count_distinct<'a, I>(rows: I, key: &str) -> usize
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .map(|row| row.trimmed(key))
        .filter(|value| !value.is_empty())
        .collect::<HashSet<_>>()
        .len()
}
