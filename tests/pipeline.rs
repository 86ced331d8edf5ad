mod common;

use chrono::{NaiveDate, NaiveDateTime};
use sheet_dashboard::{
    aggregate::{DEFAULT_LIMIT, aggregate_by_key, aggregate_by_key_with_others},
    columns::{category_options, infer_column_types},
    data::{CellValue, to_number},
    dates::{DateRange, preset_range, try_parse_date, within_range},
    filter::{FilterState, apply_filters},
    stats::summarize_numeric,
};

use common::text_table;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_milli_opt(h, min, s, ms)
        .unwrap()
}

#[test]
fn coercion_strips_grouping_and_rejects_garbage() {
    assert_eq!(to_number(&CellValue::text("1,234.5")), Some(1234.5));
    assert_eq!(to_number(&CellValue::text("")), None);
    assert_eq!(to_number(&CellValue::Empty), None);
    assert_eq!(to_number(&CellValue::text("abc")), None);
}

#[test]
fn day_first_strings_win_over_month_first() {
    let parsed = try_parse_date(&CellValue::text("31/01/2024")).unwrap();
    assert_eq!(parsed, at(2024, 1, 31, 0, 0, 0, 0));
    assert_eq!(
        try_parse_date(&CellValue::text("05-02-2024")).unwrap().date(),
        NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
    );
}

#[test]
fn last7_preset_covers_whole_days() {
    let (start, end) = preset_range("last7", at(2024, 3, 10, 15, 30, 0, 0));
    assert_eq!(start, Some(at(2024, 3, 4, 0, 0, 0, 0)));
    assert_eq!(end, Some(at(2024, 3, 10, 23, 59, 59, 999)));
}

#[test]
fn range_bounds_are_inclusive() {
    let start = at(2024, 3, 4, 0, 0, 0, 0);
    let end = at(2024, 3, 10, 23, 59, 59, 999);
    assert!(within_range(start, Some(start), Some(end)));
    assert!(within_range(end, Some(start), Some(end)));
    assert!(!within_range(at(2024, 3, 11, 0, 0, 0, 0), Some(start), Some(end)));
}

#[test]
fn aggregation_skips_blank_labels() {
    let table = text_table(
        &["g", "v"],
        &[&["A", "10"], &["B", "5"], &["A", "3"], &["", "99"]],
    );
    let result = aggregate_by_key(&table.rows, "g", "v", DEFAULT_LIMIT);
    assert_eq!(result.labels, vec!["A", "B"]);
    assert_eq!(result.values, vec![13.0, 5.0]);
}

#[test]
fn numeric_ratio_threshold_decides_column_kind() {
    let mixed = text_table(
        &["Amount"],
        &[&["100"], &["200"], &[""], &["abc"]],
    );
    let classification = infer_column_types(&mixed.rows, &mixed.columns);
    assert_eq!(classification.text_columns, vec!["Amount"]);

    let clean = text_table(&["Amount"], &[&["100"], &["200"], &["300"]]);
    let classification = infer_column_types(&clean.rows, &clean.columns);
    assert_eq!(classification.numeric_columns, vec!["Amount"]);
}

#[test]
fn filters_chain_date_category_and_search() {
    let table = text_table(
        &["Thana", "Date", "Count", "Remarks"],
        &[
            &["Kotwali", "09/03/2024", "4", "FIR registered"],
            &["Kotwali", "2024-03-08", "6", "pending"],
            &["Chakeri", "08/03/2024", "7", "FIR registered"],
            &["Kotwali", "01/01/2024", "9", "FIR registered"],
            &["Kotwali", "unknown", "1", "FIR registered"],
        ],
    );
    let now = at(2024, 3, 10, 12, 0, 0, 0);
    let state = FilterState {
        date_column: Some("Date".to_string()),
        date_range: DateRange::Last7,
        category_column: Some("Thana".to_string()),
        category_value: Some("Kotwali".to_string()),
        search: "fir".to_string(),
        global_search: String::new(),
    };
    let rows = apply_filters(&table.rows, &state, now);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].trimmed("Count"), "4");

    let summary = summarize_numeric(rows.iter().copied(), "Count");
    assert_eq!(summary.count, 1);
    assert_eq!(summary.sum, 4.0);

    let unfiltered = apply_filters(&table.rows, &FilterState::default(), now);
    assert_eq!(unfiltered.len(), 5);
    assert_eq!(
        category_options(&table.rows, "Thana"),
        vec!["Chakeri", "Kotwali"]
    );
}

#[test]
fn custom_range_with_open_end() {
    let table = text_table(
        &["Date"],
        &[&["01/02/2024"], &["15/02/2024"], &["not a date"]],
    );
    let state = FilterState {
        date_column: Some("Date".to_string()),
        date_range: DateRange::custom_days(NaiveDate::from_ymd_opt(2024, 2, 10), None),
        ..Default::default()
    };
    let rows = apply_filters(&table.rows, &state, at(2024, 3, 1, 0, 0, 0, 0));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].trimmed("Date"), "15/02/2024");
}

#[test]
fn others_bucket_folds_the_tail() {
    let table = text_table(
        &["g", "v"],
        &[
            &["A", "50"],
            &["B", "40"],
            &["C", "30"],
            &["D", "20"],
            &["E", "10"],
        ],
    );
    let result = aggregate_by_key_with_others(&table.rows, "g", "v", 3);
    assert_eq!(result.labels, vec!["A", "B", "C", "Others"]);
    assert_eq!(result.values, vec![50.0, 40.0, 30.0, 30.0]);
}
