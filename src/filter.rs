use chrono::{Local, NaiveDateTime};

use crate::{
    data::Row,
    dates::{DateRange, try_parse_date, within_range},
};

/// Filter selections for one section. `None` means "not selected".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub date_column: Option<String>,
    pub date_range: DateRange,
    pub category_column: Option<String>,
    /// Selected category value; `None` keeps every category.
    pub category_value: Option<String>,
    pub search: String,
    pub global_search: String,
}

/// Applies the date, category and search filters in that order.
///
/// The range is resolved against `now` at call time. Rows whose date cell
/// cannot be resolved are dropped while a date filter is active.
pub fn apply_filters<'a, I>(rows: I, state: &FilterState, now: NaiveDateTime) -> Vec<&'a Row>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut out: Vec<&Row> = rows.into_iter().collect();

    if let Some(column) = selected(&state.date_column)
        && !state.date_range.is_all()
    {
        let (start, end) = state.date_range.bounds(now);
        out.retain(|row| {
            try_parse_date(row.value(column)).is_some_and(|date| within_range(date, start, end))
        });
    }

    if let Some(column) = selected(&state.category_column)
        && let Some(wanted) = state.category_value.as_deref()
    {
        out.retain(|row| row.trimmed(column) == wanted);
    }

    for query in [&state.global_search, &state.search] {
        let needle = normalize_query(query);
        if needle.is_empty() {
            continue;
        }
        out.retain(|row| row.search_text().contains(&needle));
    }

    out
}

/// [`apply_filters`] against the current local time.
pub fn filter_rows<'a, I>(rows: I, state: &FilterState) -> Vec<&'a Row>
where
    I: IntoIterator<Item = &'a Row>,
{
    apply_filters(rows, state, Local::now().naive_local())
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

fn selected(column: &Option<String>) -> Option<&str> {
    column.as_deref().filter(|c| !c.is_empty())
}
