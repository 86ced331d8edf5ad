use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::io_utils::parse_delimiter;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Explore spreadsheet data as filterable dashboard sections",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the columns of uploaded files with their inferred kinds
    Columns(ColumnsArgs),
    /// Render every worksheet of uploaded files as a dashboard section
    Report(ReportArgs),
    /// Sign in and render the published sheets listed in a configuration file
    Dashboard(DashboardArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Spreadsheet files to read (.csv, .tsv, .xlsx, .xlsm, .xlsb, .xls, .ods)
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of delimited input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub view: ViewArgs,
    /// Optional configuration file supplying display settings
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// YAML configuration listing the sheet sections
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Sign-in email
    #[arg(long, env = "DASHBOARD_EMAIL", default_value = "")]
    pub email: String,
    /// Sign-in password
    #[arg(long, env = "DASHBOARD_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
    /// Only render the section with this key
    #[arg(long)]
    pub section: Option<String>,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeChoice {
    All,
    Today,
    Last7,
    Last30,
    Custom,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Date range applied to every section
    #[arg(long, value_enum, default_value_t = RangeChoice::All)]
    pub range: RangeChoice,
    /// First day of a custom range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    pub from: Option<NaiveDate>,
    /// Last day of a custom range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    pub to: Option<NaiveDate>,
    /// Column holding row dates (lowercase 'none' disables the date filter)
    #[arg(long = "date-column")]
    pub date_column: Option<String>,
    /// Column used for the category filter (lowercase 'none' disables it)
    #[arg(long = "category-column")]
    pub category_column: Option<String>,
    /// Category value to keep (lowercase 'all' keeps every value)
    #[arg(long = "category-value")]
    pub category_value: Option<String>,
    /// Case-insensitive search within each section
    #[arg(long, default_value = "")]
    pub search: String,
    /// Case-insensitive search across all sections
    #[arg(long = "global-search", default_value = "")]
    pub global_search: String,
    /// Group (label) column for charts
    #[arg(long)]
    pub group: Option<String>,
    /// Numeric metric column for charts and stat cards (lowercase 'none' disables it)
    #[arg(long)]
    pub metric: Option<String>,
    /// Page of rows to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("Invalid date '{value}' (expected YYYY-MM-DD): {err}"))
}
