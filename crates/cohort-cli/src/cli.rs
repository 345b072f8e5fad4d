//! CLI argument definitions for the cohort workbook transform.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use cohort_model::schema::{DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cohort-transform",
    version,
    about = "Cohort workbook transform - classify, join and summarize study subjects",
    long_about = "Transform the cohort study workbook.\n\n\
                  Normalizes identifiers, codes gender, assigns age cohorts and study\n\
                  numbers, populates Study Data and rebuilds the exception list and\n\
                  pivot table. Runs `run` with default paths when no subcommand is given."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

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

    /// Prefix pretty and compact log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Transform the input workbook and write the output workbook.
    Run(RunArgs),

    /// List the age cohorts and their age ranges.
    Cohorts,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Input workbook (xls, xlsx, xlsb or ods).
    #[arg(long = "input", value_name = "PATH", default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Output xlsx workbook.
    #[arg(long = "output", value_name = "PATH", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Run every stage and print the summary without writing the output.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Allow identifiers in log output.
    ///
    /// Identifiers are personal data and are redacted by default.
    #[arg(long = "log-data")]
    pub log_data: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            dry_run: false,
            log_data: false,
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["cohort-transform"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_defaults_to_fixed_paths() {
        let cli = Cli::try_parse_from(["cohort-transform", "run", "--dry-run"]).unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.input, PathBuf::from(DEFAULT_INPUT_FILE));
        assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert!(args.dry_run);
        assert!(!args.log_data);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "cohort-transform",
            "run",
            "--input",
            "in.xlsx",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert!(!cli.log_timestamps);
    }

    #[test]
    fn log_timestamps_is_global() {
        for args in [
            ["cohort-transform", "run", "--log-timestamps"],
            ["cohort-transform", "--log-timestamps", "cohorts"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(cli.log_timestamps);
        }
    }
}
