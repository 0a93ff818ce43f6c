//! Full pipeline: clean once, then describe, bin, group, correlate and
//! scatter the cleaned table according to an [`AnalysisProfile`].

use anyhow::{Context, Result as CliResult};
use log::{info, warn};
use serde::Serialize;

use crate::{
    cli::{AnalyzeArgs, OutputFormat},
    config::AnalysisProfile,
    correlation,
    data::Table,
    error::Result,
    impute, load_source,
    report::{self, AnalysisReport},
    scatter, stats,
};

/// A scatter pair that could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSeries {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileOutcome {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub skipped: Vec<SkippedSeries>,
}

/// Runs every profile step against `table`. Scatter pairs that fail are
/// skipped and listed; any other failure aborts the run.
pub fn run_profile(table: &Table, profile: &AnalysisProfile) -> Result<ProfileOutcome> {
    let (cleaned, imputation) = impute::clean_with_report(table)?;
    let target = stats::describe(&cleaned, &profile.target)?;
    let histogram = stats::histogram(&cleaned, &profile.target, profile.histogram_bins)?;
    let groups = stats::group_by(&cleaned, &profile.group_by, &profile.target)?;
    let correlation = correlation::correlate(&cleaned, &profile.correlation)?;

    let mut series = Vec::with_capacity(profile.scatter.len());
    let mut skipped = Vec::new();
    for (x, y) in &profile.scatter {
        match scatter::scatter(&cleaned, x, y) {
            Ok(found) => series.push(found),
            Err(err) => {
                let label = format!("{x}_vs_{y}");
                warn!("Skipping scatter series {label}: {err}");
                skipped.push(SkippedSeries {
                    label,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(ProfileOutcome {
        report: AnalysisReport {
            imputation,
            target,
            histogram,
            groups,
            correlation,
            scatter: series,
        },
        skipped,
    })
}

pub fn execute(args: &AnalyzeArgs) -> CliResult<()> {
    let profile = match &args.profile {
        Some(path) => AnalysisProfile::load(path)?,
        None => AnalysisProfile::default(),
    };
    let mut source = args.source.clone();
    source.categorical.extend(profile.categorical.iter().cloned());

    let table = load_source(&source)?;
    let outcome = run_profile(&table, &profile)
        .with_context(|| format!("Analyzing {:?}", source.input))?;
    info!(
        "Analysis complete: {} scatter series, {} skipped",
        outcome.report.scatter.len(),
        outcome.skipped.len()
    );

    if args.format == OutputFormat::Json {
        return report::print_json(&outcome);
    }

    let summary = &outcome.report;
    let sections = [
        ("imputation", report::imputation_rows(&summary.imputation)),
        ("target", report::column_stats_rows(std::slice::from_ref(&summary.target))),
        ("histogram", report::histogram_rows(&summary.histogram)),
        ("groups", report::group_rows(&summary.groups)),
        ("correlation", report::correlation_rows(&summary.correlation)),
        ("scatter", report::scatter_rows(&summary.scatter)),
    ];
    for (idx, (title, rows)) in sections.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        if args.format == OutputFormat::Table {
            println!("== {title} ==");
        }
        report::emit(args.format, rows, &())?;
    }
    Ok(())
}
