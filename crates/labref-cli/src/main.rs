//! Lab reference resolver CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use labref_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputFormatArg};
use crate::commands::{print_json, run_analyze, run_lookup, run_stats, run_verify};
use crate::summary::{print_analysis, print_lookup, print_stats, print_verify};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Analyze(args) => run_analyze(args).and_then(|report| match args.format {
            OutputFormatArg::Table => {
                print_analysis(&report);
                Ok(0)
            }
            OutputFormatArg::Json => print_json(&report).map(|()| 0),
        }),
        Command::Verify(args) => run_verify(args).map(|result| {
            print_verify(&result);
            if result.is_clean() { 0 } else { 1 }
        }),
        Command::Stats(args) => run_stats(args).and_then(|stats| match args.format {
            OutputFormatArg::Table => {
                print_stats(&stats);
                Ok(0)
            }
            OutputFormatArg::Json => print_json(&stats).map(|()| 0),
        }),
        Command::Lookup(args) => run_lookup(args).map(|rows| {
            print_lookup(&rows);
            0
        }),
    };
    let exit_code = match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level_filter(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
