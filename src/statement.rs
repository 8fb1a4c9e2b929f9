//! Reading bank statements from CSV and writing converted transactions back out.

use crate::error::{FormatError, RowError};
use crate::model::{Column, HeaderCheck, RawRow, TransactionRecord};
use crate::Result;
use anyhow::Context;
use std::io::{Read, Write};
use tracing::{debug, info, warn};

/// The rows of one statement file, split into those that converted and those that did not.
#[derive(Debug, Default)]
pub struct Statement {
    transactions: Vec<TransactionRecord>,
    rejected: Vec<RowError>,
}

impl Statement {
    /// The converted transactions, in file order.
    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    /// The rows that were skipped, in file order.
    pub fn rejected(&self) -> &[RowError] {
        &self.rejected
    }

    pub fn into_transactions(self) -> Vec<TransactionRecord> {
        self.transactions
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

/// Reads only the header row of a statement and compares it against the expected columns.
pub fn read_headers<R: Read>(reader: R) -> std::result::Result<HeaderCheck, FormatError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?;
    if headers.is_empty() {
        return Err(FormatError::Empty);
    }
    Ok(HeaderCheck::new(headers.iter()))
}

/// Reads a statement, converting every row that can be converted.
///
/// # Errors
/// Returns a `FormatError` when the file has no header row, the header row is not the expected
/// layout, or the underlying reader fails. Problems with individual rows are not errors: those rows
/// are logged, collected in `Statement::rejected` and left out of the transactions.
pub fn read_statement<R: Read>(reader: R) -> std::result::Result<Statement, FormatError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?;
    if headers.is_empty() {
        return Err(FormatError::Empty);
    }
    HeaderCheck::new(headers.iter()).into_result()?;

    let mut statement = Statement::default();
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(FormatError::Csv(e)),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                reject(&mut statement, RowError::Unreadable { line, source: e });
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row = RawRow::from_cells(line, record.iter());
        if row.is_header() {
            debug!("Skipping repeated header row at line {line}");
            continue;
        }

        match TransactionRecord::from_raw(&row) {
            Ok(txn) => statement.transactions.push(txn),
            Err(e) => reject(&mut statement, e),
        }
    }

    info!(
        "Read {} transactions, skipped {} rows",
        statement.transactions.len(),
        statement.rejected.len()
    );
    Ok(statement)
}

fn reject(statement: &mut Statement, e: RowError) {
    warn!("Skipping row: {e}");
    statement.rejected.push(e);
}

/// Writes transactions as a statement CSV with the standard header row.
pub fn write_statement<W: Write>(writer: W, transactions: &[TransactionRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(Column::ALL.iter().map(|c| c.header()))
        .context("Unable to write statement headers")?;
    for txn in transactions {
        wtr.write_record(txn.to_cells())
            .context("Unable to write statement row")?;
    }
    wtr.flush().context("Unable to flush statement CSV")?;
    Ok(())
}
