//! Pearson correlation matrices over numeric columns.
//!
//! Covariance and standard deviation share the N - 1 divisor, so it cancels
//! and each coefficient reduces to the ratio of centred cross products. The
//! diagonal is set to exactly 1.0 and the upper triangle is mirrored.
//! Deviations are taken in units of a power-of-two scale per column, which
//! also cancels, so products stay finite for any finite input.

use serde::Serialize;

use crate::{
    data::Table,
    error::{AnalyticsError, Result},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coefficient for the named pair.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }
}

pub fn correlate<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<CorrelationMatrix> {
    let names = columns
        .iter()
        .map(|c| c.as_ref().to_string())
        .collect::<Vec<_>>();
    let series = names
        .iter()
        .map(|name| table.complete_numeric(name))
        .collect::<Result<Vec<_>>>()?;

    if let Some(name) = names.first()
        && table.row_count() < 2
    {
        return Err(AnalyticsError::InsufficientData {
            column: name.clone(),
            required: 2,
            found: table.row_count(),
        });
    }

    let centred = names
        .iter()
        .zip(&series)
        .map(|(name, values)| centre(name, values))
        .collect::<Result<Vec<_>>>()?;

    let n = names.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&centred[i], &centred[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: names,
        values,
    })
}

/// Deviations from the mean divided by `scale`, plus their sum of squares.
pub(crate) struct Centred {
    pub mean: f64,
    pub scale: f64,
    pub deviations: Vec<f64>,
    pub sum_squares: f64,
}

pub(crate) fn centre(name: &str, values: &[f64]) -> Result<Centred> {
    if values.windows(2).all(|pair| pair[0] == pair[1]) {
        return Err(AnalyticsError::ZeroVariance(name.to_string()));
    }
    let mean = crate::stats::mean(values);
    let scale = crate::stats::magnitude(values);
    let deviations = values
        .iter()
        .map(|v| v / scale - mean / scale)
        .collect::<Vec<_>>();
    let sum_squares = deviations.iter().map(|d| d * d).sum();
    Ok(Centred {
        mean,
        scale,
        deviations,
        sum_squares,
    })
}

fn pearson(x: &Centred, y: &Centred) -> f64 {
    let cross = x
        .deviations
        .iter()
        .zip(&y.deviations)
        .map(|(a, b)| a * b)
        .sum::<f64>();
    (cross / (x.sum_squares * y.sum_squares).sqrt()).clamp(-1.0, 1.0)
}
