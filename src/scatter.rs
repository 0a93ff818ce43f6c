//! Paired numeric series with an ordinary least squares trend line.

use serde::Serialize;

use crate::{
    correlation::centre,
    data::Table,
    error::{AnalyticsError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<(f64, f64)>,
    pub trend: LinearFit,
}

impl ScatterSeries {
    /// Key used when several series are collected together, e.g. `GrLivArea_vs_SalePrice`.
    pub fn label(&self) -> String {
        format!("{}_vs_{}", self.x_column, self.y_column)
    }
}

pub fn scatter(table: &Table, x_column: &str, y_column: &str) -> Result<ScatterSeries> {
    let xs = table.complete_numeric(x_column)?;
    let ys = table.complete_numeric(y_column)?;
    if xs.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            column: x_column.to_string(),
            required: 2,
            found: xs.len(),
        });
    }

    let x = centre(x_column, &xs)?;
    let trend = match centre(y_column, &ys) {
        Ok(y) => {
            let cross = x
                .deviations
                .iter()
                .zip(&y.deviations)
                .map(|(a, b)| a * b)
                .sum::<f64>();
            let slope = cross / x.sum_squares * (y.scale / x.scale);
            LinearFit {
                slope,
                intercept: y.mean - slope * x.mean,
                r_squared: (cross * cross / (x.sum_squares * y.sum_squares)).min(1.0),
            }
        }
        // A flat y is fitted exactly by a horizontal line.
        Err(AnalyticsError::ZeroVariance(_)) => LinearFit {
            slope: 0.0,
            intercept: ys[0],
            r_squared: 1.0,
        },
        Err(err) => return Err(err),
    };

    Ok(ScatterSeries {
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        points: xs.into_iter().zip(ys).collect(),
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn table(xs: &[f64], ys: &[f64]) -> Table {
        Table::new(vec![
            Column::numeric("GrLivArea", xs.iter().copied().map(Some).collect()),
            Column::numeric("SalePrice", ys.iter().copied().map(Some).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn recovers_linear_relation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = xs.map(|v| 2.0 * v + 1.0);
        let series = scatter(&table(&xs, &ys), "GrLivArea", "SalePrice").unwrap();
        assert_eq!(series.label(), "GrLivArea_vs_SalePrice");
        assert_eq!(series.points.len(), 4);
        assert!((series.trend.slope - 2.0).abs() < 1e-12);
        assert!((series.trend.intercept - 1.0).abs() < 1e-12);
        assert!((series.trend.r_squared - 1.0).abs() < 1e-12);
        assert!((series.trend.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn large_magnitudes_fit_without_overflow() {
        let xs = [-1e200, 0.0, 1e200];
        let series = scatter(&table(&xs, &[1.0, 2.0, 3.0]), "GrLivArea", "SalePrice").unwrap();
        assert!((series.trend.slope * 1e200 - 1.0).abs() < 1e-12);
        assert!((series.trend.intercept - 2.0).abs() < 1e-12);
        assert!((series.trend.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_x_has_zero_variance() {
        let err = scatter(&table(&[1.0, 1.0], &[2.0, 3.0]), "GrLivArea", "SalePrice").unwrap_err();
        assert!(matches!(err, AnalyticsError::ZeroVariance(_)));
    }

    #[test]
    fn constant_y_is_a_flat_exact_fit() {
        let series = scatter(&table(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), "GrLivArea", "SalePrice")
            .unwrap();
        assert_eq!(series.trend.slope, 0.0);
        assert_eq!(series.trend.intercept, 5.0);
        assert_eq!(series.trend.r_squared, 1.0);
    }
}
