pub mod analyze;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod data;
pub mod error;
pub mod impute;
pub mod io_utils;
pub mod loader;
pub mod report;
pub mod scatter;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs},
    data::{ColumnKind, Table},
    loader::LoadOptions,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("estate_analytics", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Clean(args) => handle_clean(&args),
        Commands::Describe(args) => handle_describe(&args),
        Commands::Group(args) => handle_group(&args),
        Commands::Correlate(args) => handle_correlate(&args),
        Commands::Analyze(args) => analyze::execute(&args),
    }
}

pub fn load_options(args: &InputArgs) -> Result<LoadOptions> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut options = LoadOptions::default()
        .with_null_token(args.null_token.clone())
        .with_delimiter(delimiter)
        .with_encoding(encoding);
    for name in &args.categorical {
        options = options.with_kind(name.trim(), ColumnKind::Categorical);
    }
    for name in &args.numeric {
        options = options.with_kind(name.trim(), ColumnKind::Numeric);
    }
    Ok(options)
}

pub(crate) fn load_source(args: &InputArgs) -> Result<Table> {
    let options = load_options(args)?;
    info!(
        "Loading '{}' with delimiter '{}' and null token '{}'",
        args.input.display(),
        printable_delimiter(options.delimiter),
        options.null_token
    );
    loader::load_path(&args.input, &options)
        .with_context(|| format!("Loading dataset from {:?}", args.input))
}

fn load_cleaned(args: &InputArgs) -> Result<Table> {
    let table = load_source(args)?;
    let (cleaned, report) = impute::clean_with_report(&table)
        .with_context(|| format!("Cleaning {:?}", args.input))?;
    debug!("Imputed {} cell(s)", report.cells_filled());
    Ok(cleaned)
}

fn handle_clean(args: &cli::CleanArgs) -> Result<()> {
    let table = load_source(&args.source)?;
    let (cleaned, report) = impute::clean_with_report(&table)
        .with_context(|| format!("Cleaning {:?}", args.source.input))?;

    let input_delimiter =
        io_utils::resolve_input_delimiter(&args.source.input, args.source.delimiter);
    let delimiter = args.output_delimiter.unwrap_or(input_delimiter);
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
    writer.write_record(cleaned.headers())?;
    for row in cleaned.display_rows() {
        writer.write_record(
            row.iter()
                .map(|cell| cell.as_deref().unwrap_or(args.source.null_token.as_str())),
        )?;
    }
    writer.flush().context("Flushing cleaned output")?;
    if !report.is_empty() {
        debug!(
            "Imputed columns: {}",
            report.columns.iter().map(|c| c.column.as_str()).join(", ")
        );
    }
    info!(
        "Filled {} cell(s) across {} column(s); wrote {} row(s)",
        report.cells_filled(),
        report.columns.len(),
        cleaned.row_count()
    );
    Ok(())
}

fn handle_describe(args: &cli::DescribeArgs) -> Result<()> {
    let table = load_cleaned(&args.source)?;
    let columns = if args.columns.is_empty() {
        table.numeric_column_names()
    } else {
        args.columns.clone()
    };
    let summaries = columns
        .iter()
        .map(|name| stats::describe(&table, name).with_context(|| format!("Describing '{name}'")))
        .collect::<Result<Vec<_>>>()?;
    report::emit(args.format, &report::column_stats_rows(&summaries), &summaries)?;
    info!("Computed summary statistics for {} column(s)", summaries.len());
    Ok(())
}

fn handle_group(args: &cli::GroupArgs) -> Result<()> {
    let table = load_cleaned(&args.source)?;
    let groups = stats::group_by(&table, &args.by, &args.value)
        .with_context(|| format!("Grouping '{}' by '{}'", args.value, args.by))?;
    report::emit(args.format, &report::group_rows(&groups), &groups)?;
    info!("Computed {} group(s)", groups.groups.len());
    Ok(())
}

fn handle_correlate(args: &cli::CorrelateArgs) -> Result<()> {
    let table = load_cleaned(&args.source)?;
    let columns = if args.columns.is_empty() {
        table.numeric_column_names()
    } else {
        args.columns.clone()
    };
    let matrix = correlation::correlate(&table, &columns).context("Computing correlations")?;
    report::emit(args.format, &report::correlation_rows(&matrix), &matrix)?;
    info!("Computed {0}x{0} correlation matrix", matrix.len());
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
