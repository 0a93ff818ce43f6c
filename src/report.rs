//! Turns computed results into printable rows and emits them in the selected
//! output format.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    cli::OutputFormat,
    correlation::CorrelationMatrix,
    impute::ImputationReport,
    io_utils,
    scatter::ScatterSeries,
    stats::{ColumnStats, GroupStats, Histogram},
    table,
};

pub const MISSING_GROUP_LABEL: &str = "<missing>";

/// Everything the `analyze` command produces, in one serialisable document.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub imputation: ImputationReport,
    pub target: ColumnStats,
    pub histogram: Histogram,
    pub groups: GroupStats,
    pub correlation: CorrelationMatrix,
    pub scatter: Vec<ScatterSeries>,
}

/// Headers plus body rows, ready for table or CSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Rows {
    fn new(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

pub fn column_stats_rows(stats: &[ColumnStats]) -> Rows {
    let rows = stats
        .iter()
        .map(|s| {
            vec![
                s.column.clone(),
                s.count.to_string(),
                format_number(s.min),
                format_number(s.max),
                format_number(s.mean),
                format_number(s.median),
                format_number(s.std_dev),
            ]
        })
        .collect();
    Rows::new(
        &["column", "count", "min", "max", "mean", "median", "std_dev"],
        rows,
    )
}

pub fn group_rows(stats: &GroupStats) -> Rows {
    let rows = stats
        .groups
        .iter()
        .map(|g| {
            vec![
                g.key.clone().unwrap_or_else(|| MISSING_GROUP_LABEL.to_string()),
                g.count.to_string(),
                format_number(g.mean),
                format_number(g.median),
                format_number(g.q1),
                format_number(g.q3),
            ]
        })
        .collect();
    Rows::new(
        &[stats.group_column.as_str(), "count", "mean", "median", "q1", "q3"],
        rows,
    )
}

pub fn correlation_rows(matrix: &CorrelationMatrix) -> Rows {
    let mut headers = vec![String::new()];
    headers.extend(matrix.columns.iter().cloned());
    let rows = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(name, values)| {
            let mut row = vec![name.clone()];
            row.extend(values.iter().map(|v| format!("{v:.4}")));
            row
        })
        .collect();
    Rows { headers, rows }
}

pub fn histogram_rows(histogram: &Histogram) -> Rows {
    let rows = histogram
        .counts
        .iter()
        .enumerate()
        .map(|(idx, count)| {
            vec![
                format_number(histogram.edges[idx]),
                format_number(histogram.edges[idx + 1]),
                count.to_string(),
            ]
        })
        .collect();
    Rows::new(&["lower", "upper", "count"], rows)
}

pub fn scatter_rows(series: &[ScatterSeries]) -> Rows {
    let rows = series
        .iter()
        .map(|s| {
            vec![
                s.label(),
                s.points.len().to_string(),
                format!("{:.4}", s.trend.slope),
                format!("{:.4}", s.trend.intercept),
                format!("{:.4}", s.trend.r_squared),
            ]
        })
        .collect();
    Rows::new(&["series", "points", "slope", "intercept", "r_squared"], rows)
}

pub fn imputation_rows(report: &ImputationReport) -> Rows {
    let rows = report
        .columns
        .iter()
        .map(|c| vec![c.column.clone(), c.filled.to_string(), format_number(c.mean)])
        .collect();
    Rows::new(&["column", "filled", "mean"], rows)
}

/// Writes `rows` (table/CSV) or `value` (JSON) to stdout.
pub fn emit<T: Serialize>(format: OutputFormat, rows: &Rows, value: &T) -> Result<()> {
    match format {
        OutputFormat::Table => {
            table::print_table(&rows.headers, &rows.rows);
            Ok(())
        }
        OutputFormat::Csv => write_csv(rows),
        OutputFormat::Json => print_json(value),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Serializing results to JSON")?;
    println!("{text}");
    Ok(())
}

fn write_csv(rows: &Rows) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(None, io_utils::DEFAULT_CSV_DELIMITER)?;
    writer.write_record(&rows.headers)?;
    for row in &rows.rows {
        writer.write_record(row)?;
    }
    writer.flush().context("Flushing CSV output")?;
    Ok(())
}
