//! Mean imputation for numeric columns.

use log::info;
use serde::Serialize;

use crate::{
    data::{Column, ColumnValues, Table},
    error::{AnalyticsError, Result},
};

/// One numeric column whose missing cells were filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedColumn {
    pub column: String,
    pub mean: f64,
    pub filled: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImputationReport {
    pub columns: Vec<ImputedColumn>,
}

impl ImputationReport {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn cells_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }
}

/// Returns a copy of `table` with every missing numeric cell replaced by its
/// column mean. Categorical columns are copied as-is, missing cells included.
pub fn clean(table: &Table) -> Result<Table> {
    clean_with_report(table).map(|(cleaned, _)| cleaned)
}

pub fn clean_with_report(table: &Table) -> Result<(Table, ImputationReport)> {
    let mut report = ImputationReport::default();
    let mut columns = Vec::with_capacity(table.column_count());

    for column in table.columns() {
        match column.values() {
            ColumnValues::Numeric(cells) if cells.iter().any(Option::is_none) => {
                let mean = present_mean(cells)
                    .ok_or_else(|| AnalyticsError::AllMissing(column.name().to_string()))?;
                let filled = cells.iter().filter(|c| c.is_none()).count();
                let repaired = cells
                    .iter()
                    .map(|cell| Some(cell.unwrap_or(mean)))
                    .collect::<Vec<_>>();
                info!(
                    "Filled {filled} missing value(s) in '{}' with mean {mean}",
                    column.name()
                );
                report.columns.push(ImputedColumn {
                    column: column.name().to_string(),
                    mean,
                    filled,
                });
                columns.push(Column::numeric(column.name(), repaired));
            }
            _ => columns.push(column.clone()),
        }
    }

    Ok((Table::new(columns)?, report))
}

fn present_mean(cells: &[Option<f64>]) -> Option<f64> {
    let present = cells.iter().flatten().copied().collect::<Vec<_>>();
    (!present.is_empty()).then(|| crate::stats::mean(&present))
}
