//! These structs provide the CLI interface for the budget CLI.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// budget: A command-line tool for summarizing bank statements.
///
/// The purpose of this program is to read the CSV activity statement that your bank lets you
/// download, convert each row into a typed transaction, and show how much you spent and received
/// overall and month by month.
///
/// Statements must have exactly these columns, in this order:
/// Details, Posting Date, Description, Amount, Type, Balance, Check or Slip #
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// By default the data directory is $HOME/budget. If you want it somewhere else then pass
    /// --budget-home or set BUDGET_HOME.
    Init,
    /// Check a statement's headers and copy it into the uploads directory.
    Upload(UploadArgs),
    /// Compare a statement's header row with the columns that are expected.
    Headers(HeadersArgs),
    /// List uploaded statements, most recent first.
    Files,
    /// Convert a statement and show its summary and monthly statistics.
    Process(ProcessArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where budget data and configuration is held. Defaults to ~/budget
    #[arg(long, env = "BUDGET_HOME", default_value_t = default_budget_home())]
    budget_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, budget_home: PathBuf) -> Self {
        Self {
            log_level,
            budget_home: budget_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn budget_home(&self) -> &DisplayPath {
        &self.budget_home
    }
}

/// (Not shown): Args for the `budget upload` command.
#[derive(Debug, Parser, Clone)]
pub struct UploadArgs {
    /// The statement file downloaded from your bank.
    file: PathBuf,
}

impl UploadArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// (Not shown): Args for the `budget headers` command.
#[derive(Debug, Parser, Clone)]
pub struct HeadersArgs {
    /// The statement file to check.
    file: PathBuf,
}

impl HeadersArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// How `budget process` writes its report to stdout.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Summary and monthly statistics as text tables.
    #[default]
    Table,
    /// The transactions, summary and monthly statistics as JSON.
    Json,
    /// The converted transactions as a statement CSV.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// (Not shown): Args for the `budget process` command.
#[derive(Debug, Parser, Clone)]
pub struct ProcessArgs {
    /// The statement file to process. Defaults to the most recently uploaded statement.
    file: Option<PathBuf>,

    /// How to write the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Also save the report as JSON in $BUDGET_HOME/.reports
    #[arg(long)]
    save: bool,
}

impl ProcessArgs {
    pub fn new(file: Option<PathBuf>, format: OutputFormat, save: bool) -> Self {
        Self { file, format, save }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn save(&self) -> bool {
        self.save
    }

    /// Processing a named file without saving a report does not need the budget home.
    pub fn needs_config(&self) -> bool {
        self.file.is_none() || self.save
    }
}

fn default_budget_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("budget"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --budget-home or BUDGET_HOME instead of relying on the default \
                budget home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("budget")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
