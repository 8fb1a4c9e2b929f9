//! The `process` command: convert a statement, aggregate it and render the result.

use crate::args::{OutputFormat, ProcessArgs};
use crate::commands::{Out, Uploads};
use crate::model::{Amount, AmountFormat, Dashboard};
use crate::statement::{read_statement, write_statement};
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;
use tracing::{info, warn};

/// A processed statement rendered in the requested output format.
#[derive(Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Summary, monthly statistics and transactions as text tables.
    Table(String),
    /// The whole dashboard as JSON.
    Json(serde_json::Value),
    /// The converted transactions as a statement CSV.
    Csv(String),
}

impl Debug for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Report::Table(s) => write!(f, "Report::Table({} chars)", s.len()),
            Report::Json(v) => write!(f, "Report::Json({v:?})"),
            Report::Csv(s) => write!(f, "Report::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Report::Table(s) | Report::Csv(s) => write!(f, "{s}"),
            Report::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => write!(f, "{s}"),
                Err(_) => write!(f, "{v:?}"),
            },
        }
    }
}

/// Converts a statement into transactions, computes its summary and monthly statistics, and
/// renders them.
///
/// When `args` names no file, the most recently uploaded statement is used, which requires
/// `config`. Rows that cannot be converted are skipped with a warning; a file that is not a
/// statement at all is an error.
pub async fn process(config: Option<Config>, args: &ProcessArgs) -> Result<Out<Report>> {
    let path = match (args.file(), &config) {
        (Some(file), _) => file.to_path_buf(),
        (None, Some(config)) => latest_upload(config).await?,
        (None, None) => bail!("No statement file was given and the budget home is not loaded"),
    };
    info!("Processing CSV file: {}", path.display());

    let bytes = utils::read_bytes(&path).await?;
    let statement = read_statement(bytes.as_slice()).with_context(|| {
        format!(
            "Unable to process {}, run 'budget headers {}' to check its layout",
            path.display(),
            path.display()
        )
    })?;
    let dashboard = Dashboard::new(statement);
    if dashboard.transactions().is_empty() {
        warn!("No transactions were processed from {}", path.display());
    }

    let mut message = format!(
        "Processed {} transactions from {}",
        dashboard.summary().total_transactions,
        path.display()
    );
    if dashboard.rejected_rows() > 0 {
        message.push_str(&format!(
            ", skipped {} rows that could not be read",
            dashboard.rejected_rows()
        ));
    }

    if args.save() {
        let config = config.context("Saving a report requires the budget home")?;
        let saved = config.reports().save(&path, &dashboard).await?;
        message.push_str(&format!(", saved report to {}", saved.display()));
    }

    let report = render(&dashboard, args.format())?;
    Ok(Out::new(message, report))
}

async fn latest_upload(config: &Config) -> Result<PathBuf> {
    let uploads = Uploads::scan(config).await?;
    match uploads.latest() {
        Some(file) => {
            info!("Loading most recent file: {}", file.name());
            Ok(file.path().clone())
        }
        None => bail!("No statements have been uploaded, use 'budget upload' to add one"),
    }
}

fn render(dashboard: &Dashboard, format: OutputFormat) -> Result<Report> {
    match format {
        OutputFormat::Table => Ok(Report::Table(
            Table(dashboard).to_string().trim_end().to_string(),
        )),
        OutputFormat::Json => Ok(Report::Json(
            serde_json::to_value(dashboard).context("Unable to serialize the report")?,
        )),
        OutputFormat::Csv => {
            let mut out = Vec::new();
            write_statement(&mut out, dashboard.transactions())?;
            Ok(Report::Csv(
                String::from_utf8(out).context("The statement CSV is not UTF-8")?,
            ))
        }
    }
}

/// Formats money for tables, e.g. `-1,204.10`.
fn money(value: Decimal) -> String {
    Amount::new_with_format(value.round_dp(2), AmountFormat::new(false, true, false)).to_string()
}

/// Shortens `s` to at most `max` characters.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut clipped: String = s.chars().take(max.saturating_sub(1)).collect();
        clipped.push('~');
        clipped
    }
}

/// The dashboard as text tables: the summary, the monthly statistics and the transactions.
struct Table<'a>(&'a Dashboard);

impl Display for Table<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dashboard = self.0;
        let summary = dashboard.summary();

        writeln!(f, "Summary")?;
        writeln!(f, "  Transactions:        {}", summary.total_transactions)?;
        writeln!(f, "  Total spent:         {}", money(summary.total_spent))?;
        writeln!(f, "  Total received:      {}", money(summary.total_received))?;
        writeln!(
            f,
            "  Average transaction: {}",
            money(summary.average_transaction)
        )?;
        writeln!(f, "  Date range:          {}", summary.date_range_label())?;
        if dashboard.rejected_rows() > 0 {
            writeln!(f, "  Rows skipped:        {}", dashboard.rejected_rows())?;
        }

        writeln!(f)?;
        writeln!(f, "Monthly")?;
        if dashboard.monthly_stats().is_empty() {
            writeln!(f, "  No transactions")?;
        } else {
            writeln!(
                f,
                "  {:<7}  {:>5}  {:>12}  {:>12}  {:>12}  {}",
                "Month", "Count", "Spent", "Received", "Largest", "Most common type"
            )?;
            for (month, stats) in dashboard.monthly_stats() {
                writeln!(
                    f,
                    "  {:<7}  {:>5}  {:>12}  {:>12}  {:>12}  {}",
                    month.to_string(),
                    stats.transaction_count,
                    money(stats.total_spent),
                    money(stats.total_received),
                    money(stats.largest_transaction),
                    stats.most_common_type
                )?;
            }
        }

        if !dashboard.transactions().is_empty() {
            writeln!(f)?;
            writeln!(f, "Transactions")?;
            writeln!(
                f,
                "  {:<10}  {:<6}  {:<32}  {:>12}  {:>12}  {:<15}  {}",
                "Date", "Details", "Description", "Amount", "Balance", "Category", "Check"
            )?;
            for txn in dashboard.transactions() {
                writeln!(
                    f,
                    "  {:<10}  {:<6}  {:<32}  {:>12}  {:>12}  {:<15}  {}",
                    txn.posting_date().format("%Y-%m-%d").to_string(),
                    clip(txn.details().as_str(), 6),
                    clip(txn.description(), 32),
                    money(txn.amount().value()),
                    money(txn.balance().value()),
                    txn.category().to_string(),
                    txn.check_or_slip_number().unwrap_or_default()
                )?;
            }
        }

        Ok(())
    }
}
