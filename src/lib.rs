pub mod aggregate;
pub mod auth;
pub mod cli;
pub mod columns;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod dates;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod io_utils;
pub mod stats;
pub mod table;

use std::{
    env,
    sync::{Arc, OnceLock},
};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    auth::Session,
    cli::{Cli, Commands, InputArgs, RangeChoice, ViewArgs},
    config::{DashboardConfig, DisplaySettings},
    dashboard::{SectionDefaults, SectionSelection, SectionView, render_section},
    dates::DateRange,
    ingest::{
        Workbook,
        sheets::{self, HttpFetcher},
        upload::{self, UploadOptions},
    },
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_dashboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Columns(args) => handle_columns(&args.input),
        Commands::Report(args) => handle_report(&args),
        Commands::Dashboard(args) => handle_dashboard(&args),
    }
}

fn read_inputs(input: &InputArgs) -> Result<Vec<Workbook>> {
    let options = UploadOptions {
        delimiter: input.delimiter,
        encoding: io_utils::resolve_encoding(input.input_encoding.as_deref())?,
    };
    input
        .inputs
        .iter()
        .map(|path| {
            info!("Reading '{}'", path.display());
            upload::parse_spreadsheet_file(path, &options)
                .with_context(|| format!("Reading spreadsheet {path:?}"))
        })
        .collect()
}

fn handle_columns(input: &InputArgs) -> Result<()> {
    let settings = DisplaySettings::default();
    let date_pattern = settings.date_column_regex()?;
    let category_pattern = settings.category_column_regex()?;
    let headers = ["column", "kind", "role", "non_blank", "numeric"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    for workbook in read_inputs(input)? {
        for sheet in &workbook.sheets {
            println!("{} / {}", workbook.file_name, sheet.sheet_name);
            let profiles = columns::profile_columns(&sheet.table.rows, &sheet.table.columns);
            let rows = profiles
                .iter()
                .map(|profile| {
                    let mut roles = Vec::new();
                    if date_pattern.is_match(&profile.name) {
                        roles.push("date");
                    }
                    if category_pattern.is_match(&profile.name) {
                        roles.push("category");
                    }
                    vec![
                        profile.name.clone(),
                        if profile.is_numeric() { "numeric" } else { "text" }.to_string(),
                        roles.join(","),
                        profile.non_empty.to_string(),
                        profile.numeric.to_string(),
                    ]
                })
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
            println!();
        }
    }
    Ok(())
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let settings = match &args.config {
        Some(path) => DashboardConfig::load(path)?.display,
        None => DisplaySettings::default(),
    };
    let selection = section_selection(&args.view)?;
    let now = Local::now().naive_local();

    for workbook in read_inputs(&args.input)? {
        for sheet in &workbook.sheets {
            let defaults = SectionDefaults::for_table(&sheet.table, &settings)?;
            debug!("Defaults for {:?}: {:?}", sheet.sheet_name, defaults);
            let view = SectionView::build(&sheet.table, &defaults, &selection, &settings, now);
            info!(
                "Sheet '{}' of {:?}: {} of {} row(s) after filters",
                sheet.sheet_name,
                workbook.file_name,
                view.row_count(),
                view.total_rows
            );
            print!(
                "{}",
                render_section(&sheet.sheet_name, &workbook.file_name, &view)
            );
            println!();
        }
    }
    Ok(())
}

fn handle_dashboard(args: &cli::DashboardArgs) -> Result<()> {
    let config = DashboardConfig::load(&args.config)?;
    let mut session = Session::from_config(config.auth.as_ref());
    let user = session
        .login(&args.email, &args.password)
        .context("Signing in to the dashboard")?;
    info!("Session started for {:?} at {}", user.email, user.login_time);

    let sections = match args.section.as_deref() {
        Some(key) => {
            let chosen = config
                .sections
                .iter()
                .filter(|section| section.key == key)
                .cloned()
                .collect::<Vec<_>>();
            if chosen.is_empty() {
                bail!("No section with key '{key}' in {:?}", args.config);
            }
            chosen
        }
        None => config.sections.clone(),
    };
    let selection = section_selection(&args.view)?;

    let client = reqwest::Client::builder()
        .build()
        .context("Building HTTP client")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Starting async runtime")?;
    info!("Loading {} section(s)", sections.len());
    let report = runtime.block_on(sheets::load_sections(
        Arc::new(HttpFetcher::new(client)),
        &sections,
    ));

    if let Some(summary) = report.error_summary() {
        warn!("{} section(s) failed to load", report.failures.len());
        eprintln!("Some sections failed to load: {summary}");
        if report.loaded.is_empty() {
            return Err(anyhow!("No sections could be loaded: {summary}"));
        }
    }

    let now = Local::now().naive_local();
    for section in &report.loaded {
        let defaults = SectionDefaults::for_table(&section.table, &config.display)?;
        let view = SectionView::build(&section.table, &defaults, &selection, &config.display, now);
        print!("{}", render_section(&section.title, &section.key, &view));
        if let Some(link) = &section.form_link {
            println!("Form: {link}");
        }
        println!();
    }
    session.logout();
    Ok(())
}

fn section_selection(view: &ViewArgs) -> Result<SectionSelection> {
    let date_range = match view.range {
        RangeChoice::All => DateRange::All,
        RangeChoice::Today => DateRange::Today,
        RangeChoice::Last7 => DateRange::Last7,
        RangeChoice::Last30 => DateRange::Last30,
        RangeChoice::Custom => {
            if let (Some(from), Some(to)) = (view.from, view.to)
                && from > to
            {
                bail!("--from {from} is after --to {to}");
            }
            DateRange::custom_days(view.from, view.to)
        }
    };
    if view.range != RangeChoice::Custom && (view.from.is_some() || view.to.is_some()) {
        warn!("--from/--to only apply with --range custom");
    }
    Ok(SectionSelection {
        label_column: view.group.clone(),
        value_column: view.metric.clone(),
        date_column: view.date_column.clone(),
        category_column: view.category_column.clone(),
        category_value: view.category_value.clone(),
        search: view.search.clone(),
        global_search: view.global_search.clone(),
        date_range,
        page: view.page,
    })
}
