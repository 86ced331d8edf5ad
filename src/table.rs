//! Terminal tables and record pagination.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::data::Row;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of records. `current_page` is 1-based and always within
/// `1..=total_pages`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub current_page: usize,
    pub total_pages: usize,
    pub rows: Vec<&'a Row>,
}

impl Page<'_> {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Cells of `columns` for every row on the page, as display strings.
    pub fn cells(&self, columns: &[String]) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.value(column).display_string())
                    .collect()
            })
            .collect()
    }
}

/// Slices `rows` into the requested page, clamping out-of-range page numbers.
pub fn paginate<'a>(rows: &[&'a Row], page: usize, page_size: usize) -> Page<'a> {
    let page_size = page_size.max(1);
    let total_pages = rows.len().div_ceil(page_size).max(1);
    let current_page = page.clamp(1, total_pages);
    let start = (current_page - 1) * page_size;
    let rows = rows.iter().skip(start).take(page_size).copied().collect();
    Page {
        current_page,
        total_pages,
        rows,
    }
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| display_width(h).max(1))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&flatten_cell(cell)));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", join_padded(headers, &widths));
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let rule = rule_widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", join_padded(&rule, &rule_widths));
    for row in rows {
        let _ = writeln!(output, "{}", join_padded(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn join_padded(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = flatten_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end_matches(' ').to_string()
}

/// Character count, ignoring ANSI colour sequences.
fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            chars.by_ref().find(|next| *next == 'm');
        } else {
            width += 1;
        }
    }
    width
}

fn flatten_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
