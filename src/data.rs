//! Columnar table model.
//!
//! A [`Table`] is an ordered list of uniquely named [`Column`]s whose cell
//! vectors all share one length. Each column's kind is fixed when the column
//! is built: numeric cells are `Option<f64>`, categorical cells are
//! `Option<String>`, and `None` marks a missing cell. Tables are never
//! modified after construction; transformations build new tables.

use std::{collections::HashSet, fmt};

use serde::Serialize;

use crate::error::{AnalyticsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(cells) => cells.len(),
            ColumnValues::Categorical(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(cells),
        }
    }

    pub fn categorical(name: impl Into<String>, cells: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Categorical(cells),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(cells) => cells.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Categorical(cells) => cells.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Cell at `row` rendered as text, `None` when missing or out of range.
    pub fn display_cell(&self, row: usize) -> Option<String> {
        match &self.values {
            ColumnValues::Numeric(cells) => cells.get(row).copied().flatten().map(format_cell),
            ColumnValues::Categorical(cells) => cells.get(row).cloned().flatten(),
        }
    }
}

/// Shortest text that parses back to the same `f64`.
fn format_cell(value: f64) -> String {
    value.to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(AnalyticsError::Format(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(ragged) = columns.iter().find(|c| c.len() != row_count) {
            return Err(AnalyticsError::Format(format!(
                "column '{}' has {} row(s) but '{}' has {}",
                ragged.name(),
                ragged.len(),
                columns[0].name(),
                row_count
            )));
        }
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| AnalyticsError::ColumnNotFound(name.to_string()))
    }

    /// Names of every numeric column, in table order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Numeric)
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn numeric_cells(&self, name: &str) -> Result<&[Option<f64>]> {
        let column = self.column(name)?;
        match column.values() {
            ColumnValues::Numeric(cells) => Ok(cells),
            ColumnValues::Categorical(_) => Err(kind_mismatch(column, ColumnKind::Numeric)),
        }
    }

    pub fn categorical_cells(&self, name: &str) -> Result<&[Option<String>]> {
        let column = self.column(name)?;
        match column.values() {
            ColumnValues::Categorical(cells) => Ok(cells),
            ColumnValues::Numeric(_) => Err(kind_mismatch(column, ColumnKind::Categorical)),
        }
    }

    /// Values of a numeric column that must not contain missing cells.
    pub fn complete_numeric(&self, name: &str) -> Result<Vec<f64>> {
        let cells = self.numeric_cells(name)?;
        let values = cells.iter().copied().flatten().collect::<Vec<_>>();
        if values.len() != cells.len() {
            return Err(AnalyticsError::MissingValues {
                column: name.to_string(),
                missing: cells.len() - values.len(),
            });
        }
        Ok(values)
    }

    /// Row-major text view, `None` for missing cells.
    pub fn display_rows(&self) -> Vec<Vec<Option<String>>> {
        (0..self.row_count)
            .map(|row| self.columns.iter().map(|c| c.display_cell(row)).collect())
            .collect()
    }
}

fn kind_mismatch(column: &Column, expected: ColumnKind) -> AnalyticsError {
    AnalyticsError::ColumnType {
        column: column.name().to_string(),
        expected: expected.as_str(),
        actual: column.kind().as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::numeric("SalePrice", vec![Some(100.0), None, Some(300.0)]),
            Column::categorical(
                "Neighborhood",
                vec![Some("NAmes".into()), Some("OldTown".into()), None],
            ),
        ])
        .expect("table")
    }

    #[test]
    fn new_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("b", vec![Some(1.0), Some(2.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::Format(_)));
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn new_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::categorical("a", vec![Some("x".into())]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn accessors_check_kind_and_presence() {
        let table = sample();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.numeric_column_names(), vec!["SalePrice".to_string()]);
        assert!(matches!(
            table.numeric_cells("Neighborhood"),
            Err(AnalyticsError::ColumnType { .. })
        ));
        assert!(matches!(
            table.column("Missing"),
            Err(AnalyticsError::ColumnNotFound(_))
        ));
        assert!(matches!(
            table.complete_numeric("SalePrice"),
            Err(AnalyticsError::MissingValues { missing: 1, .. })
        ));
    }

    #[test]
    fn display_rows_render_missing_as_none() {
        let rows = sample().display_rows();
        assert_eq!(rows[0], vec![Some("100".to_string()), Some("NAmes".to_string())]);
        assert_eq!(rows[1][0], None);
        assert_eq!(rows[2][1], None);
    }
}
