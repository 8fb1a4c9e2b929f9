//! Report snapshots: processed dashboards saved as JSON so they can be looked at later.

use crate::model::Dashboard;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Extension of report snapshot files.
const JSON: &str = "json";

/// Manages report file creation and rotation.
///
/// The `Reports` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::reports()` or `Reports::new()`.
#[derive(Debug, Clone)]
pub struct Reports {
    reports_dir: PathBuf,
    report_copies: u32,
}

impl Reports {
    /// Creates a new `Reports` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            reports_dir: config.reports_dir().to_path_buf(),
            report_copies: config.report_copies(),
        }
    }

    /// Saves a `Dashboard` as a pretty-printed JSON file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where the prefix is the statement's
    /// file stem and NNN is a sequence number. Automatically rotates old reports for the same
    /// statement, keeping only `report_copies` files.
    ///
    /// Returns the path to the created report file.
    pub async fn save(&self, statement: &Path, dashboard: &Dashboard) -> Result<PathBuf> {
        let prefix = report_prefix(statement);
        let date = today();
        let seq = self.next_sequence_number(&prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.{JSON}");
        let path = self.reports_dir.join(&filename);

        let json =
            serde_json::to_string_pretty(dashboard).context("Failed to serialize report to JSON")?;
        utils::write(&path, json).await?;

        self.rotate(&prefix).await?;

        Ok(path)
    }

    /// Scans the reports directory for existing files with the given prefix and date, and returns
    /// the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.reports_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Deletes the oldest reports with the given prefix until only `report_copies` remain.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, (NaiveDate, u32))> = Vec::new();

        let mut dir = utils::read_dir(&self.reports_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(stamp) = report_stamp(&name, prefix) {
                files.push((entry.path(), stamp));
            }
        }

        files.sort_by_key(|(_, stamp)| *stamp);

        let to_delete = files.len().saturating_sub(self.report_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// The statement's file stem, e.g. `Chase1234_Activity_20240131` for
/// `uploads/Chase1234_Activity_20240131.CSV`.
fn report_prefix(statement: &Path) -> String {
    statement
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| String::from("statement"))
}

/// Parses the sequence number from a report filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{JSON}"))?
        .parse()
        .ok()
}

/// Parses the date and sequence number of a report file for the given prefix.
/// Returns None if the filename is not a report for `prefix`.
fn report_stamp(filename: &str, prefix: &str) -> Option<(NaiveDate, u32)> {
    // {prefix}.YYYY-MM-DD-NNN.json, where NNN grows past three digits after 999 reports in a day
    let stamp = filename
        .strip_prefix(&format!("{prefix}."))?
        .strip_suffix(&format!(".{JSON}"))?;
    let (date, seq) = stamp.rsplit_once('-')?;
    if seq.is_empty() || !seq.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date, seq.parse().ok()?))
}
