//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use wafguard_application::RunConfig;
use wafguard_infrastructure::{ReportConfig, ReportFormat};

use crate::logging::{LogConfig, LogFormat, LogLevel};

/// Declarative HTTP test runner for web application firewalls.
#[derive(Debug, Parser)]
#[command(name = "wafguard", version, about, long_about = None)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run tests from a YAML file or a directory of YAML files.
    Run(RunArgs),
    /// Check test files without sending any request.
    Validate(ValidateArgs),
}

impl Command {
    /// Logging flags of whichever subcommand was chosen.
    #[must_use]
    pub const fn log(&self) -> &LogArgs {
        match self {
            Self::Run(args) => &args.log,
            Self::Validate(args) => &args.log,
        }
    }
}

/// Logging flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Log level.
    #[arg(short = 'l', long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format.
    #[arg(short = 'f', long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl LogArgs {
    /// Logging settings for these flags.
    #[must_use]
    pub const fn to_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level,
            format: self.log_format,
        }
    }
}

/// Report formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty JSON.
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Arguments of `wafguard run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Suite file or directory.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// File to save the suite report to (always JSON).
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Console report format.
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Maximum number of requests in flight per suite.
    #[arg(short = 'c', long, default_value_t = 1)]
    pub concurrent: usize,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub log: LogArgs,
}

impl RunArgs {
    /// Runner settings for these flags.
    #[must_use]
    pub const fn run_config(&self) -> RunConfig {
        RunConfig::concurrent(self.concurrent)
    }

    /// Reporter settings for these flags.
    #[must_use]
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            format: self.format.into(),
            output: self.output.clone(),
        }
    }
}

/// Arguments of `wafguard validate`.
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Suite file or directory.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub log: LogArgs,
}
