//! Dashboard configuration loaded from YAML.
//!
//! ```yaml
//! sections:
//!   - key: mule-account-entry
//!     title: Mule Account Entry
//!     source:
//!       spreadsheet_id: 1qZGpASsNrwYMItcRoCvfKpy7HoCseDnMjtpsmPsixPo
//!       gid: 0
//!     form_link: https://forms.gle/d4D9GKZCmWvgoBpK7
//! auth:
//!   email: admin@example.org
//!   password: change-me
//! display:
//!   bar_limit: 12
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::{aggregate, table};

pub const DEFAULT_DATE_COLUMN_PATTERN: &str = "(?i)(date|दिनांक)";
pub const DEFAULT_CATEGORY_COLUMN_PATTERN: &str = "(?i)(thana|थाना)";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub auth: Option<Credentials>,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionConfig {
    pub key: String,
    pub title: String,
    pub source: SheetSource,
    #[serde(default)]
    pub form_link: Option<String>,
}

/// Where a published spreadsheet tab lives. `sheet_name` wins over `gid`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SheetSource {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheet_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_gid")]
    pub gid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub bar_limit: usize,
    pub pie_top: usize,
    pub page_size: usize,
    pub table_columns: usize,
    pub date_column_pattern: String,
    pub category_column_pattern: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            bar_limit: 12,
            pie_top: aggregate::DEFAULT_TOP_N,
            page_size: table::DEFAULT_PAGE_SIZE,
            table_columns: 12,
            date_column_pattern: DEFAULT_DATE_COLUMN_PATTERN.to_string(),
            category_column_pattern: DEFAULT_CATEGORY_COLUMN_PATTERN.to_string(),
        }
    }
}

impl DisplaySettings {
    pub fn date_column_regex(&self) -> Result<Regex> {
        Regex::new(&self.date_column_pattern)
            .with_context(|| format!("Invalid date column pattern '{}'", self.date_column_pattern))
    }

    pub fn category_column_regex(&self) -> Result<Regex> {
        Regex::new(&self.category_column_pattern).with_context(|| {
            format!(
                "Invalid category column pattern '{}'",
                self.category_column_pattern
            )
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GidValue {
    Number(u64),
    Text(String),
}

fn deserialize_gid<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<GidValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(GidValue::Number(n)) => Some(n.to_string()),
        Some(GidValue::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

impl DashboardConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: DashboardConfig =
            serde_yaml::from_str(input).context("Parsing dashboard configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening configuration file {path:?}"))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Loading configuration from {path:?}"))
    }

    fn validate(&self) -> Result<()> {
        for section in &self.sections {
            if section.source.spreadsheet_id.trim().is_empty() {
                return Err(anyhow!(
                    "Section '{}' is missing source.spreadsheet_id",
                    section.key
                ));
            }
        }
        self.display.date_column_regex()?;
        self.display.category_column_regex()?;
        Ok(())
    }
}
