use sheet_dashboard::table::render_table;

#[test]
fn render_table_aligns_columns() {
    let headers = vec!["id".to_string(), "name".to_string()];
    let rows = vec![
        vec!["1".to_string(), "Alice".to_string()],
        vec!["2".to_string(), "Bob".to_string()],
    ];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines, vec!["id  name", "---  -----", "1   Alice", "2   Bob"]);
}

#[test]
fn render_table_normalizes_control_characters() {
    let headers = vec!["note".to_string()];
    let rows = vec![vec!["line1\nline2\tvalue".to_string()]];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "line1 line2 value");
}

#[test]
fn render_table_handles_unicode_and_ansi_widths() {
    let headers = vec!["résumé".to_string(), "status".to_string()];
    let rows = vec![vec!["café".to_string(), "\u{1b}[31mERR\u{1b}[0m".to_string()]];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "résumé  status");
    // "résumé" is two display columns wider than "café", so expect two padding
    // spaces plus the standard two-column separator.
    assert_eq!(lines[2], "café    \u{1b}[31mERR\u{1b}[0m");
}

#[test]
fn paged_rows_render_selected_columns() {
    use sheet_dashboard::{data::CellValue, data::Row, table::paginate};

    let rows = (1..=12)
        .map(|i| {
            vec![
                ("id", CellValue::Number(i as f64)),
                ("name", CellValue::text(format!("row {i}"))),
            ]
            .into_iter()
            .collect::<Row>()
        })
        .collect::<Vec<_>>();
    let refs = rows.iter().collect::<Vec<_>>();
    let page = paginate(&refs, 2, 10);
    assert_eq!(page.total_pages, 2);

    let headers = vec!["name".to_string()];
    let rendered = render_table(&headers, &page.cells(&headers));
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines, vec!["name", "------", "row 11", "row 12"]);
}
