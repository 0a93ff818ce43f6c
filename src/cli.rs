use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Clean and summarise real-estate datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill missing numeric values with column means and write the cleaned table
    Clean(CleanArgs),
    /// Summary statistics (mean, median, std dev, min, max) for numeric columns
    Describe(DescribeArgs),
    /// Mean and median of a numeric column per category
    Group(GroupArgs),
    /// Pearson correlation matrix for numeric columns
    Correlate(CorrelateArgs),
    /// Run the full pipeline described by an analysis profile
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Flags shared by every command that loads a dataset.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input delimited file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Field delimiter (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Token that marks a missing value (exact, case-sensitive)
    #[arg(long = "null-token", default_value = "NA")]
    pub null_token: String,
    /// Keep these columns categorical even if every value is numeric
    #[arg(long = "categorical", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub categorical: Vec<String>,
    /// Require these columns to be numeric; a non-numeric value is an error
    #[arg(long = "numeric", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub numeric: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter for output (defaults to the input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Columns to describe (defaults to every numeric column)
    #[arg(short = 'C', long = "columns", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GroupArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Categorical column to group by
    #[arg(long = "by")]
    pub by: String,
    /// Numeric column to aggregate
    #[arg(long = "value")]
    pub value: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CorrelateArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Columns to correlate (defaults to every numeric column)
    #[arg(short = 'C', long = "columns", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub columns: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// YAML analysis profile (defaults to the housing-dataset profile)
    #[arg(short = 'p', long = "profile")]
    pub profile: Option<PathBuf>,
    /// Table and csv print one block per result; json prints a single document
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("pipe"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn shared_flags_flatten_into_subcommands() {
        let cli = Cli::try_parse_from([
            "estate-analytics",
            "group",
            "-i",
            "train.csv",
            "--by",
            "Neighborhood",
            "--value",
            "SalePrice",
            "--categorical",
            "MSSubClass,MoSold",
        ])
        .expect("parse");
        let Commands::Group(args) = cli.command else {
            panic!("expected group command");
        };
        assert_eq!(args.source.null_token, "NA");
        assert_eq!(args.source.categorical, vec!["MSSubClass", "MoSold"]);
        assert_eq!(args.format, OutputFormat::Table);
    }
}
