//! Descriptive and grouped statistics over cleaned tables.
//!
//! All entry points read complete numeric columns: a column that still holds
//! missing cells is rejected with [`AnalyticsError::MissingValues`] rather
//! than silently skipped.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::{
    data::Table,
    error::{AnalyticsError, Result},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Category value, `None` for rows whose key was missing.
    pub key: Option<String>,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Lower and upper quartiles, interpolated like the median.
    pub q1: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group_column: String,
    pub value_column: String,
    pub groups: Vec<GroupSummary>,
}

impl GroupStats {
    pub fn get(&self, key: Option<&str>) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.key.as_deref() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `counts.len() + 1` ascending edges; the final bin includes its upper edge.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Count, mean, median, sample standard deviation, min and max of `column`.
pub fn describe(table: &Table, column: &str) -> Result<ColumnStats> {
    let mut values = table.complete_numeric(column)?;
    require_len(column, &values, 2)?;

    let count = values.len();
    let mean = mean(&values);
    let std_dev = sample_std_dev(&values, mean);
    let (min, max) = min_max(&values);
    let median = median(&mut values);
    if !std_dev.is_finite() {
        return Err(AnalyticsError::Overflow(column.to_string()));
    }
    debug!("Described '{column}' over {count} value(s)");

    Ok(ColumnStats {
        column: column.to_string(),
        count,
        mean,
        median,
        std_dev,
        min,
        max,
    })
}

/// Mean and median of `value_column` per distinct key of `group_column`,
/// sorted by key with the missing key first.
pub fn group_by(table: &Table, group_column: &str, value_column: &str) -> Result<GroupStats> {
    let keys = table.categorical_cells(group_column)?;
    let values = table.complete_numeric(value_column)?;

    let mut buckets: BTreeMap<Option<&str>, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.iter().zip(&values) {
        buckets.entry(key.as_deref()).or_default().push(*value);
    }

    let groups = buckets
        .into_iter()
        .map(|(key, mut members)| {
            let mean = mean(&members);
            let median = median(&mut members);
            GroupSummary {
                key: key.map(str::to_string),
                count: members.len(),
                mean,
                median,
                q1: quantile(&members, 0.25),
                q3: quantile(&members, 0.75),
            }
        })
        .collect::<Vec<_>>();
    debug!(
        "Grouped '{value_column}' by '{group_column}' into {} group(s)",
        groups.len()
    );

    Ok(GroupStats {
        group_column: group_column.to_string(),
        value_column: value_column.to_string(),
        groups,
    })
}

/// Equal-width histogram of `column` spanning its min and max.
pub fn histogram(table: &Table, column: &str, bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(AnalyticsError::InvalidArgument(
            "histogram needs at least one bin".to_string(),
        ));
    }
    let values = table.complete_numeric(column)?;
    require_len(column, &values, 1)?;

    let (min, max) = min_max(&values);
    if min == max {
        return Ok(Histogram {
            column: column.to_string(),
            edges: vec![min, max],
            counts: vec![values.len()],
        });
    }

    // Work in units of `scale` so `max - min` stays finite across the whole f64 range.
    let scale = magnitude(&[min, max]);
    let low = min / scale;
    let width = (max / scale - low) / bins as f64;
    let mut edges = (0..bins)
        .map(|i| ((low + width * i as f64) * scale).clamp(min, max))
        .collect::<Vec<_>>();
    edges.push(max);

    let mut counts = vec![0usize; bins];
    for value in &values {
        let slot = (((value / scale - low) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }

    Ok(Histogram {
        column: column.to_string(),
        edges,
        counts,
    })
}

fn require_len(column: &str, values: &[f64], required: usize) -> Result<()> {
    if values.len() < required {
        return Err(AnalyticsError::InsufficientData {
            column: column.to_string(),
            required,
            found: values.len(),
        });
    }
    Ok(())
}

/// Power of two at or below the largest magnitude in `values`.
///
/// Dividing by it is exact and brings every value into (-2, 2), so sums and
/// squares of deviations cannot overflow.
pub(crate) fn magnitude(values: &[f64]) -> f64 {
    let largest = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if largest == 0.0 {
        1.0
    } else {
        2f64.powi((largest.log2().floor() as i32).max(f64::MIN_EXP - 1))
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    let scale = magnitude(values);
    let scaled = values.iter().map(|v| v / scale).sum::<f64>() / values.len() as f64;
    (scaled * scale).clamp(f64::MIN, f64::MAX)
}

/// Sample standard deviation (N - 1 divisor); callers guarantee two values.
pub(crate) fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    let scale = magnitude(values);
    let squares = values
        .iter()
        .map(|v| (v / scale - mean / scale).powi(2))
        .sum::<f64>();
    (squares / (values.len() as f64 - 1.0)).sqrt() * scale
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Middle value, averaging the two central values for even counts.
pub(crate) fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len().is_multiple_of(2) {
        values[mid - 1] / 2.0 + values[mid] / 2.0
    } else {
        values[mid]
    }
}

/// Linear interpolation between closest ranks of an ascending, non-empty slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let position = p * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn prices(values: &[f64]) -> Table {
        Table::new(vec![Column::numeric(
            "SalePrice",
            values.iter().copied().map(Some).collect(),
        )])
        .unwrap()
    }

    #[test]
    fn describe_three_values() {
        let stats = describe(&prices(&[300.0, 100.0, 200.0]), "SalePrice").unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 200.0);
        assert_eq!(stats.median, 200.0);
        assert_eq!(stats.std_dev, 100.0);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 300.0);
    }

    #[test]
    fn median_interpolates_even_counts() {
        let stats = describe(&prices(&[4.0, 1.0, 3.0, 2.0]), "SalePrice").unwrap();
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn describe_requires_two_values() {
        let err = describe(&prices(&[5.0]), "SalePrice").unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData {
                required: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn describe_rejects_uncleaned_and_categorical_columns() {
        let table = Table::new(vec![
            Column::numeric("LotFrontage", vec![Some(1.0), None]),
            Column::categorical("Street", vec![Some("Pave".into()), Some("Grvl".into())]),
        ])
        .unwrap();
        assert!(matches!(
            describe(&table, "LotFrontage"),
            Err(AnalyticsError::MissingValues { missing: 1, .. })
        ));
        assert!(matches!(
            describe(&table, "Street"),
            Err(AnalyticsError::ColumnType { .. })
        ));
        assert!(matches!(
            describe(&table, "Nope"),
            Err(AnalyticsError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn group_by_sorts_keys_and_keeps_missing_group() {
        let table = Table::new(vec![
            Column::categorical(
                "Neighborhood",
                vec![
                    Some("B".into()),
                    Some("A".into()),
                    None,
                    Some("A".into()),
                ],
            ),
            Column::numeric(
                "SalePrice",
                vec![Some(30.0), Some(10.0), Some(7.0), Some(20.0)],
            ),
        ])
        .unwrap();

        let stats = group_by(&table, "Neighborhood", "SalePrice").unwrap();
        let keys = stats.groups.iter().map(|g| g.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys, vec![None, Some("A".into()), Some("B".into())]);

        let a = stats.get(Some("A")).unwrap();
        assert_eq!((a.count, a.mean, a.median), (2, 15.0, 15.0));
        assert_eq!((a.q1, a.q3), (12.5, 17.5));
        let missing = stats.get(None).unwrap();
        assert_eq!((missing.count, missing.mean), (1, 7.0));
    }

    #[test]
    fn group_by_requires_categorical_key() {
        let table = prices(&[1.0, 2.0]);
        assert!(matches!(
            group_by(&table, "SalePrice", "SalePrice"),
            Err(AnalyticsError::ColumnType { .. })
        ));
    }

    #[test]
    fn histogram_counts_every_value() {
        let hist = histogram(&prices(&[0.0, 1.0, 2.0, 3.0, 4.0]), "SalePrice", 2).unwrap();
        assert_eq!(hist.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(hist.counts, vec![2, 3]);
    }

    #[test]
    fn histogram_of_constant_column_has_one_bin() {
        let hist = histogram(&prices(&[5.0, 5.0]), "SalePrice", 10).unwrap();
        assert_eq!(hist.counts, vec![2]);
        assert!(histogram(&prices(&[5.0]), "SalePrice", 0).is_err());
    }

    #[test]
    fn group_quartiles_interpolate_between_ranks() {
        let table = Table::new(vec![
            Column::categorical("Neighborhood", vec![Some("NAmes".into()); 5]),
            Column::numeric(
                "SalePrice",
                [50.0, 10.0, 40.0, 20.0, 30.0].map(Some).to_vec(),
            ),
        ])
        .unwrap();
        let stats = group_by(&table, "Neighborhood", "SalePrice").unwrap();
        let names = &stats.groups[0];
        assert_eq!((names.q1, names.median, names.q3), (20.0, 30.0, 40.0));
    }

    #[test]
    fn describe_near_f64_max_stays_finite() {
        let stats = describe(&prices(&[1e308, 1e308, 1e308]), "SalePrice").unwrap();
        assert!((stats.mean / 1e308 - 1.0).abs() < 1e-12);
        assert!(stats.std_dev.is_finite() && stats.std_dev / 1e308 < 1e-12);
        assert_eq!(stats.median, 1e308);

        let stats = describe(&prices(&[-1e200, 0.0, 1e200]), "SalePrice").unwrap();
        assert_eq!(stats.mean, 0.0);
        assert!((stats.std_dev / 1e200 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn describe_reports_overflowing_spread() {
        let err = describe(&prices(&[-f64::MAX, f64::MAX]), "SalePrice").unwrap_err();
        assert!(matches!(err, AnalyticsError::Overflow(ref name) if name == "SalePrice"));
    }

    #[test]
    fn histogram_spans_the_full_f64_range() {
        let hist = histogram(&prices(&[-f64::MAX, 0.0, f64::MAX]), "SalePrice", 2).unwrap();
        assert!(hist.edges.iter().all(|edge| edge.is_finite()));
        assert_eq!(hist.edges, vec![-f64::MAX, 0.0, f64::MAX]);
        assert_eq!(hist.counts, vec![1, 2]);
    }
}
