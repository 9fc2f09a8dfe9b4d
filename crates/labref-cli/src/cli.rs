//! CLI argument definitions for the lab reference resolver.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use labref_model::Sex;

#[derive(Parser)]
#[command(
    name = "labref",
    version,
    about = "Resolve laboratory observations against a reference-range knowledge base",
    long_about = "Resolve laboratory observations against a reference-range knowledge base.\n\n\
                  Maps raw test names to canonical tests, selects the most applicable\n\
                  reference range for the subject, classifies each value as LOW, NORMAL\n\
                  or HIGH, and reports an aggregate confidence for the batch."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow observed values to appear in log output.
    ///
    /// Observed values are patient data and are redacted by default.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify a batch of observations and score the batch confidence.
    Analyze(AnalyzeArgs),

    /// Check a knowledge-base snapshot for integrity violations.
    Verify(KbArgs),

    /// Summarize the contents of a knowledge-base snapshot.
    Stats(StatsArgs),

    /// Show how raw test names resolve, with closest-name suggestions.
    Lookup(LookupArgs),
}

#[derive(Args)]
pub struct KbArgs {
    /// Knowledge-base snapshot (JSON).
    #[arg(long = "kb", value_name = "SNAPSHOT")]
    pub kb: PathBuf,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub kb: KbArgs,

    /// Observations file: a JSON array, or CSV when the extension is `.csv`.
    #[arg(value_name = "OBSERVATIONS")]
    pub observations: PathBuf,

    /// Subject sex applied where an observation does not carry one.
    #[arg(long = "sex", value_name = "SEX")]
    pub sex: Option<Sex>,

    /// Subject age in years applied where an observation does not carry one.
    #[arg(long = "age", value_name = "YEARS", value_parser = parse_age)]
    pub age: Option<f64>,

    /// Clinical condition (e.g. pregnancy, fasting) applied where missing.
    #[arg(long = "condition", value_name = "CONDITION")]
    pub condition: Option<String>,

    /// Seed the quality jitter so runs are reproducible.
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Half-width of the quality jitter.
    #[arg(
        long = "jitter",
        value_name = "AMPLITUDE",
        conflicts_with = "no_jitter",
        value_parser = parse_jitter
    )]
    pub jitter: Option<f64>,

    /// Disable the quality jitter entirely.
    #[arg(long = "no-jitter")]
    pub no_jitter: bool,

    /// Attach a closest-name suggestion to unmatched observations.
    #[arg(long = "suggest")]
    pub suggest: bool,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub kb: KbArgs,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct LookupArgs {
    #[command(flatten)]
    pub kb: KbArgs,

    /// Raw test names to resolve.
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Maximum suggestions shown per name.
    #[arg(long = "limit", default_value_t = 3)]
    pub limit: usize,

    /// Minimum similarity for a suggestion (0 to 1).
    #[arg(
        long = "min-score",
        default_value_t = labref_map::DEFAULT_MIN_SCORE,
        value_parser = parse_min_score
    )]
    pub min_score: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_finite(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{raw}' is not a finite number"))
    }
}

fn parse_age(raw: &str) -> Result<f64, String> {
    let age = parse_finite(raw)?;
    if age < 0.0 {
        return Err(format!("age must not be negative, got {age}"));
    }
    Ok(age)
}

fn parse_jitter(raw: &str) -> Result<f64, String> {
    let amplitude = parse_finite(raw)?;
    if amplitude < 0.0 {
        return Err(format!("jitter amplitude must not be negative, got {amplitude}"));
    }
    Ok(amplitude)
}

fn parse_min_score(raw: &str) -> Result<f64, String> {
    let score = parse_finite(raw)?;
    if !(0.0..=1.0).contains(&score) {
        return Err(format!("minimum score must be between 0 and 1, got {score}"));
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("labref").chain(args.iter().copied()))
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        assert!(parse(&["analyze", "--kb", "kb.json", "obs.json", "--age", "NaN"]).is_err());
        assert!(parse(&["analyze", "--kb", "kb.json", "obs.json", "--jitter", "inf"]).is_err());
        assert!(parse(&["lookup", "--kb", "kb.json", "Hgb", "--min-score", "NaN"]).is_err());
    }

    #[test]
    fn min_score_is_bounded_to_unit_interval() {
        assert!(parse(&["lookup", "--kb", "kb.json", "Hgb", "--min-score", "1.5"]).is_err());
        assert!(parse(&["lookup", "--kb", "kb.json", "Hgb", "--min-score", "-0.1"]).is_err());
        let cli = parse(&["lookup", "--kb", "kb.json", "Hgb", "--min-score", "0.7"]).unwrap();
        let Command::Lookup(args) = cli.command else {
            panic!("expected lookup");
        };
        assert_eq!(args.min_score, 0.7);
    }

    #[test]
    fn age_accepts_plain_years() {
        let cli = parse(&["analyze", "--kb", "kb.json", "obs.json", "--age", "34"]).unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.age, Some(34.0));
        assert!(parse(&["analyze", "--kb", "kb.json", "obs.json", "--age", "-3"]).is_err());
    }
}
