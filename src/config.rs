//! Analysis profile for the `analyze` command.
//!
//! A profile names the columns the full pipeline reports on. It is read from
//! YAML; every field is optional and falls back to the housing-dataset
//! defaults below.
//!
//! ```yaml
//! target: SalePrice
//! group_by: Neighborhood
//! correlation: [SalePrice, LotArea, YearBuilt, GrLivArea]
//! scatter:
//!   - [GrLivArea, SalePrice]
//! histogram_bins: 50
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisProfile {
    /// Column summarised by `describe` and the histogram.
    pub target: String,
    /// Categorical column used to compare the target across groups.
    pub group_by: String,
    pub correlation: Vec<String>,
    /// `(x, y)` pairs for scatter series.
    pub scatter: Vec<(String, String)>,
    pub histogram_bins: usize,
    /// Numeric-looking columns to keep categorical, e.g. class codes.
    pub categorical: Vec<String>,
}

impl Default for AnalysisProfile {
    fn default() -> Self {
        Self {
            target: "SalePrice".to_string(),
            group_by: "Neighborhood".to_string(),
            correlation: ["SalePrice", "LotArea", "YearBuilt", "GrLivArea"]
                .map(String::from)
                .to_vec(),
            scatter: vec![
                ("GrLivArea".to_string(), "SalePrice".to_string()),
                ("YearBuilt".to_string(), "SalePrice".to_string()),
                ("OverallQual".to_string(), "SalePrice".to_string()),
            ],
            histogram_bins: 50,
            categorical: Vec::new(),
        }
    }
}

impl AnalysisProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile {path:?}"))?;
        let profile: Self = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing profile {path:?}"))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let profile: Self = serde_yaml::from_str(text).context("Parsing analysis profile")?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.target.trim().is_empty(), "Profile target column is empty");
        ensure!(
            !self.group_by.trim().is_empty(),
            "Profile group_by column is empty"
        );
        ensure!(self.histogram_bins > 0, "Profile histogram_bins must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_matches_housing_columns() {
        let profile = AnalysisProfile::default();
        assert_eq!(profile.target, "SalePrice");
        assert_eq!(profile.correlation.len(), 4);
        assert_eq!(profile.scatter[1].0, "YearBuilt");
        assert_eq!(profile.histogram_bins, 50);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let profile = AnalysisProfile::from_yaml_str(
            "target: Price\nscatter:\n  - [Area, Price]\ncategorical: [MSSubClass]\n",
        )
        .expect("parse");
        assert_eq!(profile.target, "Price");
        assert_eq!(profile.group_by, "Neighborhood");
        assert_eq!(profile.scatter, vec![("Area".to_string(), "Price".to_string())]);
        assert_eq!(profile.categorical, vec!["MSSubClass".to_string()]);
    }

    #[test]
    fn rejects_unknown_keys_and_zero_bins() {
        assert!(AnalysisProfile::from_yaml_str("colour: red\n").is_err());
        let err = AnalysisProfile::from_yaml_str("histogram_bins: 0\n").unwrap_err();
        assert!(err.to_string().contains("histogram_bins"));
    }
}
