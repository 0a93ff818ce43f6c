//! Delimited-text loader with null-token detection and column kind inference.
//!
//! The first record names the columns. Every field equal to the configured
//! null token becomes a missing cell. A column is numeric when each of its
//! remaining tokens parses as a finite number and categorical otherwise,
//! unless [`LoadOptions`] pins its kind explicitly.

use std::{collections::BTreeMap, io::Read, path::Path};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{
    data::{Column, ColumnKind, Table},
    error::{AnalyticsError, Result},
    io_utils,
};

pub const DEFAULT_NULL_TOKEN: &str = "NA";

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub null_token: String,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub kind_overrides: BTreeMap<String, ColumnKind>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            null_token: DEFAULT_NULL_TOKEN.to_string(),
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            kind_overrides: BTreeMap::new(),
        }
    }
}

impl LoadOptions {
    pub fn with_null_token(mut self, token: impl Into<String>) -> Self {
        self.null_token = token.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Pins `column` to `kind` instead of inferring it.
    pub fn with_kind(mut self, column: impl Into<String>, kind: ColumnKind) -> Self {
        self.kind_overrides.insert(column.into(), kind);
        self
    }
}

pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Table> {
    let input = io_utils::open_input(path)?;
    let table = load_reader(input, options)?;
    info!(
        "Loaded {} row(s) across {} column(s) from {:?}",
        table.row_count(),
        table.column_count(),
        path
    );
    Ok(table)
}

pub fn load_reader<R: Read>(input: R, options: &LoadOptions) -> Result<Table> {
    let mut reader = io_utils::open_csv_reader(input, options.delimiter);
    let header_record = reader.byte_headers()?.clone();
    if header_record.is_empty() {
        return Err(AnalyticsError::EmptySource("header row"));
    }
    let headers = io_utils::decode_record(&header_record, options.encoding)?;

    if let Some(unknown) = options
        .kind_overrides
        .keys()
        .find(|name| !headers.contains(*name))
    {
        return Err(AnalyticsError::ColumnNotFound(unknown.clone()));
    }

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut lines = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(lines.len() as u64 + 2);
        if record.len() != headers.len() {
            return Err(AnalyticsError::Format(format!(
                "line {line}: expected {} field(s) but found {}",
                headers.len(),
                record.len()
            )));
        }
        let fields = io_utils::decode_record(&record, options.encoding)
            .map_err(|err| AnalyticsError::Format(format!("line {line}: {err}")))?;
        for (cells, field) in raw.iter_mut().zip(fields) {
            cells.push((field != options.null_token).then_some(field));
        }
        lines.push(line);
    }

    if lines.is_empty() {
        return Err(AnalyticsError::EmptySource("data rows"));
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| {
            let kind = options
                .kind_overrides
                .get(&name)
                .copied()
                .unwrap_or_else(|| infer_kind(&cells));
            debug!("Column '{name}' loaded as {kind}");
            build_column(name, kind, cells, &lines)
        })
        .collect::<Result<Vec<_>>>()?;

    Table::new(columns)
}

pub fn parse_number(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn infer_kind(cells: &[Option<String>]) -> ColumnKind {
    if cells.iter().flatten().all(|token| parse_number(token).is_some()) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

fn build_column(
    name: String,
    kind: ColumnKind,
    cells: Vec<Option<String>>,
    lines: &[u64],
) -> Result<Column> {
    match kind {
        ColumnKind::Categorical => Ok(Column::categorical(name, cells)),
        ColumnKind::Numeric => {
            let parsed = cells
                .iter()
                .zip(lines)
                .map(|(cell, line)| match cell {
                    None => Ok(None),
                    Some(token) => parse_number(token).map(Some).ok_or_else(|| {
                        AnalyticsError::Format(format!(
                            "line {line}: column '{name}' is numeric but holds '{token}'"
                        ))
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Column::numeric(name, parsed))
        }
    }
}
