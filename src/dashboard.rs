//! One dashboard section: default column choices, the filtered view with its
//! summaries and charts, and terminal rendering.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use itertools::Itertools;

use crate::{
    aggregate::{self, AggregationResult},
    columns::{self, ColumnClassification},
    config::DisplaySettings,
    data::{Row, Table},
    dates::DateRange,
    filter::{self, FilterState},
    format::{format_compact_number, format_number},
    stats::{self, NumericSummary},
    table::{self, Page},
};

/// Placeholder for stat cards without a selected metric.
const NO_VALUE: &str = "—";
/// Selection value that switches a column choice off. Matched exactly, so a
/// column named `None` stays selectable.
pub const NONE_SELECTION: &str = "none";
/// Category value that keeps every category. Matched exactly.
pub const ALL_CATEGORIES: &str = "all";

/// Column choices made automatically when a section is first shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDefaults {
    pub label_column: Option<String>,
    pub value_column: Option<String>,
    pub date_column: Option<String>,
    pub category_column: Option<String>,
    pub classification: ColumnClassification,
}

impl SectionDefaults {
    /// Label: first text column, else the first column. Metric: first numeric
    /// column. Date and category: first column matching the configured
    /// patterns.
    pub fn for_table(table: &Table, settings: &DisplaySettings) -> anyhow::Result<Self> {
        let classification = columns::infer_column_types(&table.rows, &table.columns);
        let date_candidates =
            columns::find_matching_columns(&table.columns, &settings.date_column_regex()?);
        let category_candidates =
            columns::find_matching_columns(&table.columns, &settings.category_column_regex()?);
        Ok(Self {
            label_column: classification
                .text_columns
                .first()
                .or_else(|| table.columns.first())
                .cloned(),
            value_column: classification.numeric_columns.first().cloned(),
            date_column: date_candidates.into_iter().next(),
            category_column: category_candidates.into_iter().next(),
            classification,
        })
    }
}

/// User overrides for a section. `None` keeps the default; the value
/// [`NONE_SELECTION`] (or an empty string) switches the choice off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionSelection {
    pub label_column: Option<String>,
    pub value_column: Option<String>,
    pub date_column: Option<String>,
    pub category_column: Option<String>,
    pub category_value: Option<String>,
    pub search: String,
    pub global_search: String,
    pub date_range: DateRange,
    pub page: usize,
}

fn choose(selected: &Option<String>, default: &Option<String>) -> Option<String> {
    match selected.as_deref().map(str::trim) {
        None => default.clone(),
        Some(value) if value.is_empty() || value == NONE_SELECTION => None,
        Some(value) => Some(value.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView<'a> {
    pub label_column: Option<String>,
    pub value_column: Option<String>,
    pub date_column: Option<String>,
    pub category_column: Option<String>,
    pub date_range: DateRange,
    pub total_rows: usize,
    pub rows: Vec<&'a Row>,
    /// Present only while a metric column is selected.
    pub summary: Option<NumericSummary>,
    pub distinct_labels: usize,
    pub bar: AggregationResult,
    pub pie: AggregationResult,
    pub category_options: Vec<String>,
    pub table_columns: Vec<String>,
    pub page: Page<'a>,
}

impl<'a> SectionView<'a> {
    pub fn build(
        table: &'a Table,
        defaults: &SectionDefaults,
        selection: &SectionSelection,
        settings: &DisplaySettings,
        now: NaiveDateTime,
    ) -> Self {
        let label_column = choose(&selection.label_column, &defaults.label_column);
        let value_column = choose(&selection.value_column, &defaults.value_column);
        let date_column = choose(&selection.date_column, &defaults.date_column);
        let category_column = choose(&selection.category_column, &defaults.category_column);
        let category_value = selection
            .category_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != ALL_CATEGORIES)
            .map(str::to_string);

        let state = FilterState {
            date_column: date_column.clone(),
            date_range: selection.date_range,
            category_column: category_column.clone(),
            category_value,
            search: selection.search.clone(),
            global_search: selection.global_search.clone(),
        };
        let rows = filter::apply_filters(&table.rows, &state, now);

        let summary = value_column
            .as_deref()
            .map(|metric| stats::summarize_numeric(rows.iter().copied(), metric));
        let distinct_labels = label_column
            .as_deref()
            .map_or(0, |label| stats::count_distinct(rows.iter().copied(), label));
        let (bar, pie) = match (label_column.as_deref(), value_column.as_deref()) {
            (Some(label), Some(metric)) => (
                aggregate::aggregate_by_key(rows.iter().copied(), label, metric, settings.bar_limit),
                aggregate::aggregate_by_key_with_others(
                    rows.iter().copied(),
                    label,
                    metric,
                    settings.pie_top,
                ),
            ),
            _ => Default::default(),
        };
        let category_options = category_column
            .as_deref()
            .map(|column| columns::category_options(&table.rows, column))
            .unwrap_or_default();
        let table_columns = table
            .columns
            .iter()
            .take(settings.table_columns)
            .cloned()
            .collect();
        let page = table::paginate(&rows, selection.page, settings.page_size);

        Self {
            label_column,
            value_column,
            date_column,
            category_column,
            date_range: selection.date_range,
            total_rows: table.row_count(),
            rows,
            summary,
            distinct_labels,
            bar,
            pie,
            category_options,
            table_columns,
            page,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn chart_caption(&self) -> Option<String> {
        match (&self.label_column, &self.value_column) {
            (Some(label), Some(metric)) => Some(format!("{label} → {metric}")),
            _ => None,
        }
    }
}

/// Renders stat cards, both charts as tables, and the current page of rows.
pub fn render_section(title: &str, source: &str, view: &SectionView<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {title} ==");
    if !view.date_range.is_all() {
        let _ = writeln!(out, "Date range: {}", view.date_range.label());
    }
    if !view.category_options.is_empty() {
        let _ = writeln!(
            out,
            "{} options: {}",
            view.category_column.as_deref().unwrap_or_default(),
            view.category_options.iter().join(", ")
        );
    }
    let _ = writeln!(out);
    out.push_str(&table::render_table(
        &headers(&["Card", "Value", "Detail"]),
        &stat_cards(source, view),
    ));

    let caption = view.chart_caption();
    for (name, result) in [("Bar summary", &view.bar), ("Pie distribution", &view.pie)] {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{name} ({})",
            caption.as_deref().unwrap_or("choose columns")
        );
        if result.is_empty() {
            let _ = writeln!(out, "Choose a group column and a numeric metric for charts");
        } else {
            out.push_str(&table::render_table(
                &headers(&["Group", "Total", "Share"]),
                &result.render_rows(|value| format_number(value, 2)),
            ));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Rows (page {} of {}, {} matching)",
        view.page.current_page,
        view.page.total_pages,
        format_number(view.row_count() as f64, 0)
    );
    if view.page.rows.is_empty() {
        let _ = writeln!(out, "No rows match the current filters");
    } else {
        out.push_str(&table::render_table(
            &view.table_columns,
            &view.page.cells(&view.table_columns),
        ));
    }
    out
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn stat_cards(source: &str, view: &SectionView<'_>) -> Vec<Vec<String>> {
    let metric = view
        .value_column
        .clone()
        .unwrap_or_else(|| "choose a metric column".to_string());
    let summary_card = |title: &str, pick: fn(&NumericSummary) -> f64| {
        vec![
            title.to_string(),
            view.summary
                .as_ref()
                .map_or_else(|| NO_VALUE.to_string(), |s| format_compact_number(pick(s))),
            metric.clone(),
        ]
    };
    vec![
        vec![
            "Rows".to_string(),
            format_number(view.row_count() as f64, 0),
            format!("of {}", format_number(view.total_rows as f64, 0)),
        ],
        vec![
            "Distinct groups".to_string(),
            format_number(view.distinct_labels as f64, 0),
            view.label_column
                .as_ref()
                .map_or_else(|| "choose a group column".to_string(), |c| format!("unique in {c}")),
        ],
        summary_card("Sum", |s| s.sum),
        summary_card("Average", |s| s.avg),
        summary_card("Maximum", |s| s.max),
        summary_card("Minimum", |s| s.min),
        vec![
            "Chart categories".to_string(),
            format_number(view.bar.len() as f64, 0),
            "top categories shown".to_string(),
        ],
        vec!["Source".to_string(), source.to_string(), String::new()],
    ]
}
