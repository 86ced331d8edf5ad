use std::{future::Future, sync::Arc};

use log::{info, warn};

use super::IngestError;
use crate::{
    config::{SectionConfig, SheetSource},
    data::Table,
    io_utils::DEFAULT_CSV_DELIMITER,
};

const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";
/// Failure messages shown together after a load.
const ERROR_SUMMARY_LIMIT: usize = 3;

/// Fetches the body of a CSV export URL.
pub trait CsvFetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, IngestError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl CsvFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, IngestError> {
        let unreachable = |err: reqwest::Error| IngestError::Unreachable {
            url: url.to_string(),
            message: err.to_string(),
        };
        let response = self.client.get(url).send().await.map_err(unreachable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(unreachable)
    }
}

/// CSV export URL for a source: the gviz endpoint when a sheet name is given,
/// the export endpoint with `gid` otherwise, else the first tab.
pub fn build_csv_url(source: &SheetSource) -> Result<String, IngestError> {
    let id = source.spreadsheet_id.trim();
    if id.is_empty() {
        return Err(IngestError::MissingSpreadsheetId);
    }
    if let Some(sheet) = source.sheet_name.as_deref().filter(|s| !s.is_empty()) {
        return Ok(format!(
            "{SHEETS_BASE_URL}/{id}/gviz/tq?tqx=out:csv&sheet={}",
            urlencoding::encode(sheet)
        ));
    }
    if let Some(gid) = source.gid.as_deref().filter(|g| !g.is_empty()) {
        return Ok(format!(
            "{SHEETS_BASE_URL}/{id}/export?format=csv&gid={}",
            urlencoding::encode(gid)
        ));
    }
    Ok(format!("{SHEETS_BASE_URL}/{id}/export?format=csv"))
}

/// Login and redirect pages come back as HTML instead of CSV.
pub fn looks_like_html(body: &str) -> bool {
    let lowered = body.trim_start().to_ascii_lowercase();
    lowered.starts_with("<!doctype html") || lowered.contains("<html")
}

pub async fn fetch_sheet_as_table<F>(fetcher: &F, source: &SheetSource) -> Result<Table, IngestError>
where
    F: CsvFetcher,
{
    let url = build_csv_url(source)?;
    let body = fetcher.fetch_text(&url).await?;
    if looks_like_html(&body) {
        return Err(IngestError::NotPublished);
    }
    super::parse_csv_text(&body, DEFAULT_CSV_DELIMITER)
}

#[derive(Debug, Clone)]
pub struct LoadedSection {
    pub key: String,
    pub title: String,
    pub form_link: Option<String>,
    pub table: Table,
}

#[derive(Debug)]
pub struct SectionFailure {
    pub key: String,
    pub title: String,
    pub error: IngestError,
}

/// Per-section outcome of one refresh, in configuration order.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<LoadedSection>,
    pub failures: Vec<SectionFailure>,
}

impl LoadReport {
    pub fn error_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        Some(
            self.failures
                .iter()
                .take(ERROR_SUMMARY_LIMIT)
                .map(|failure| failure.error.to_string())
                .collect::<Vec<_>>()
                .join(" • "),
        )
    }
}

/// Fetches every section concurrently. A failing section never aborts the
/// others; each one lands in either `loaded` or `failures`.
pub async fn load_sections<F>(fetcher: Arc<F>, sections: &[SectionConfig]) -> LoadReport
where
    F: CsvFetcher + 'static,
{
    let handles = sections
        .iter()
        .map(|section| {
            let fetcher = Arc::clone(&fetcher);
            let source = section.source.clone();
            tokio::spawn(async move { fetch_sheet_as_table(fetcher.as_ref(), &source).await })
        })
        .collect::<Vec<_>>();

    let mut report = LoadReport::default();
    for (section, handle) in sections.iter().zip(handles) {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(IngestError::Task(join_err.to_string())),
        };
        match outcome {
            Ok(table) => {
                info!(
                    "Loaded section '{}' ({} row(s))",
                    section.key,
                    table.row_count()
                );
                report.loaded.push(LoadedSection {
                    key: section.key.clone(),
                    title: section.title.clone(),
                    form_link: section.form_link.clone(),
                    table,
                });
            }
            Err(error) => {
                warn!("Section '{}' failed to load: {error}", section.key);
                report.failures.push(SectionFailure {
                    key: section.key.clone(),
                    title: section.title.clone(),
                    error,
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, sheet: Option<&str>, gid: Option<&str>) -> SheetSource {
        SheetSource {
            spreadsheet_id: id.to_string(),
            sheet_name: sheet.map(str::to_string),
            gid: gid.map(str::to_string),
        }
    }

    #[test]
    fn url_prefers_sheet_name_then_gid() {
        assert_eq!(
            build_csv_url(&source("abc", Some("Form Responses 1"), Some("9"))).unwrap(),
            "https://docs.google.com/spreadsheets/d/abc/gviz/tq?tqx=out:csv&sheet=Form%20Responses%201"
        );
        assert_eq!(
            build_csv_url(&source("abc", None, Some("9"))).unwrap(),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=9"
        );
        assert_eq!(
            build_csv_url(&source("abc", None, None)).unwrap(),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv"
        );
        assert!(matches!(
            build_csv_url(&source("  ", None, None)),
            Err(IngestError::MissingSpreadsheetId)
        ));
    }

    #[test]
    fn html_pages_are_detected() {
        assert!(looks_like_html("  <!DOCTYPE html><html><body>Sign in</body></html>"));
        assert!(looks_like_html("<meta charset=utf-8><html lang=en>"));
        assert!(!looks_like_html("Thana,Count\nKotwali,4\n"));
    }

    #[test]
    fn error_summary_joins_first_three() {
        let failure = |key: &str| SectionFailure {
            key: key.to_string(),
            title: key.to_string(),
            error: IngestError::Status { status: 404 },
        };
        let report = LoadReport {
            loaded: Vec::new(),
            failures: vec![failure("a"), failure("b"), failure("c"), failure("d")],
        };
        let summary = report.error_summary().unwrap();
        assert_eq!(summary.matches(" • ").count(), 2);
        assert!(summary.starts_with("Sheet could not be loaded (404)"));
        assert!(LoadReport::default().error_summary().is_none());
    }
}
