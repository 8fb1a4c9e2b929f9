use crate::error::RowError;
use crate::model::{Amount, Column, Details};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The format of the `Posting Date` column.
pub const POSTING_DATE_FORMAT: &str = "%m/%d/%Y";

/// One unconverted row of a statement: the text of each cell keyed by its column.
///
/// A cell that is absent from the row (because the row is shorter than the header) has no entry,
/// which is different from a cell that is present but empty.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RawRow {
    line: u64,
    cells: BTreeMap<Column, String>,
}

impl RawRow {
    /// Creates a row from cell values in statement column order. Values past the last column are
    /// ignored.
    pub fn from_cells<S, I>(line: u64, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let cells = Column::ALL
            .iter()
            .copied()
            .zip(values.into_iter().map(|s| s.into()))
            .collect();
        Self { line, cells }
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.cells.get(&column).map(|s| s.as_str())
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    /// True when this row is a repeat of the header row, which happens when statements are
    /// concatenated.
    pub fn is_header(&self) -> bool {
        self.get(Column::Details)
            .is_some_and(|s| s.trim() == Column::Details.header())
    }

    fn require(&self, column: Column) -> Result<&str, RowError> {
        self.get(column).ok_or(RowError::MissingField {
            line: self.line,
            column,
        })
    }
}

/// Represents a single row of a bank statement after conversion.
///
/// Field order is the statement's column order and must stay that way: it is the order used when
/// the record is written back out as CSV or JSON.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionRecord {
    details: Details,
    posting_date: NaiveDate,
    description: String,
    /// Negative amounts are money leaving the account.
    amount: Amount,
    transaction_type: String,
    /// The running balance after this transaction, as reported by the bank.
    balance: Amount,
    check_or_slip_number: Option<String>,
}

impl TransactionRecord {
    /// Converts a raw statement row into a typed record.
    ///
    /// # Errors
    /// Any cell that cannot be converted rejects the whole row. An empty or absent
    /// `Check or Slip #` is not an error.
    pub fn from_raw(row: &RawRow) -> Result<Self, RowError> {
        let line = row.line();

        let details = Details::from(row.require(Column::Details)?);

        let date_text = row.require(Column::PostingDate)?;
        let posting_date = NaiveDate::parse_from_str(date_text.trim(), POSTING_DATE_FORMAT)
            .map_err(|source| RowError::PostingDate {
                line,
                value: date_text.to_string(),
                source,
            })?;

        let description = row.require(Column::Description)?.to_string();
        let amount = parse_amount(row, Column::Amount)?;
        let transaction_type = row.require(Column::Type)?.to_string();
        let balance = parse_amount(row, Column::Balance)?;

        let check_or_slip_number = row
            .get(Column::CheckOrSlipNumber)
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string());

        Ok(Self {
            details,
            posting_date,
            description,
            amount,
            transaction_type,
            balance,
            check_or_slip_number,
        })
    }

    /// Writes the record back into raw statement cells.
    pub fn to_raw(&self, line: u64) -> RawRow {
        RawRow::from_cells(line, self.to_cells())
    }

    /// The record's cells as text, in statement column order.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.details.to_string(),
            self.posting_date.format(POSTING_DATE_FORMAT).to_string(),
            self.description.clone(),
            self.amount.to_string(),
            self.transaction_type.clone(),
            self.balance.to_string(),
            self.check_or_slip_number.clone().unwrap_or_default(),
        ]
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn posting_date(&self) -> NaiveDate {
        self.posting_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn check_or_slip_number(&self) -> Option<&str> {
        self.check_or_slip_number.as_deref()
    }

    /// Classifies the transaction from its `Details` and `Type` columns.
    pub fn category(&self) -> TransactionCategory {
        TransactionCategory::classify(self.details.as_str(), &self.transaction_type)
    }
}

fn parse_amount(row: &RawRow, column: Column) -> Result<Amount, RowError> {
    let value = row.require(column)?;
    Amount::from_str(value).map_err(|source| RowError::Amount {
        line: row.line(),
        column,
        value: value.to_string(),
        source,
    })
}

/// A coarse classification of a transaction, derived from the bank's `Details` and `Type` columns.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    DebitCard,
    AchCredit,
    AchDebit,
    FeeTransaction,
    CheckDeposit,
    MiscDebit,
    Deposit,
}

serde_plain::derive_display_from_serialize!(TransactionCategory);
serde_plain::derive_fromstr_from_deserialize!(TransactionCategory);

impl TransactionCategory {
    /// The first matching rule wins, so a credit is always `AchCredit` regardless of its type.
    pub fn classify(details: &str, transaction_type: &str) -> Self {
        let details = details.to_uppercase();
        let kind = transaction_type.to_uppercase();

        if details.contains("CREDIT") || kind.contains("ACH_CREDIT") {
            TransactionCategory::AchCredit
        } else if details.contains("DSLIP") || kind.contains("CHECK") {
            TransactionCategory::CheckDeposit
        } else if kind.contains("FEE") {
            TransactionCategory::FeeTransaction
        } else if kind.contains("ACH_DEBIT") {
            TransactionCategory::AchDebit
        } else if kind.contains("DEBIT_CARD") {
            TransactionCategory::DebitCard
        } else if kind.contains("DEPOSIT") {
            TransactionCategory::Deposit
        } else {
            TransactionCategory::MiscDebit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::raw_row;
    use rust_decimal::Decimal;

    #[test]
    fn test_from_raw() {
        let row = raw_row(
            2,
            [
                "DEBIT",
                "01/05/2024",
                "Coffee",
                "-4.50",
                "DEBIT_CARD",
                "995.50",
                "",
            ],
        );
        let txn = TransactionRecord::from_raw(&row).unwrap();
        assert_eq!(txn.details(), &Details::Debit);
        assert_eq!(
            txn.posting_date(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert_eq!(txn.description(), "Coffee");
        assert_eq!(txn.amount().value(), Decimal::from_str("-4.50").unwrap());
        assert_eq!(txn.transaction_type(), "DEBIT_CARD");
        assert_eq!(txn.balance().value(), Decimal::from_str("995.50").unwrap());
        assert_eq!(txn.check_or_slip_number(), None);
        assert_eq!(txn.category(), TransactionCategory::DebitCard);
    }

    #[test]
    fn test_round_trip_preserves_cells() {
        let cells = [
            "DSLIP",
            "03/17/2024",
            "DEPOSIT  ID NUMBER 12345",
            "1,250.00",
            "DEPOSIT",
            "4,240.27",
            "1042",
        ];
        let row = raw_row(9, cells);
        let txn = TransactionRecord::from_raw(&row).unwrap();
        assert_eq!(txn.to_raw(9), row);
        assert_eq!(txn.to_cells(), cells);
    }

    #[test]
    fn test_round_trip_keeps_negative_zero() {
        let cells = ["DEBIT", "01/05/2024", "x", "-0.00", "MISC", "-0.00", ""];
        let txn = TransactionRecord::from_raw(&raw_row(2, cells)).unwrap();
        assert!(!txn.amount().is_negative());
        assert_eq!(txn.to_cells(), cells);
    }

    #[test]
    fn test_empty_text_fields_are_kept() {
        let row = raw_row(2, ["", "01/05/2024", "", "1.00", "", "1.00", ""]);
        let txn = TransactionRecord::from_raw(&row).unwrap();
        assert_eq!(txn.details(), &Details::Other(String::new()));
        assert_eq!(txn.description(), "");
        assert_eq!(txn.transaction_type(), "");
    }

    #[test]
    fn test_check_number_blank_or_absent_is_none() {
        let blank = raw_row(
            2,
            ["DEBIT", "01/05/2024", "x", "-1.00", "MISC", "1.00", "   "],
        );
        let txn = TransactionRecord::from_raw(&blank).unwrap();
        assert_eq!(txn.check_or_slip_number(), None);

        let absent = raw_row(2, ["DEBIT", "01/05/2024", "x", "-1.00", "MISC", "1.00"]);
        let txn = TransactionRecord::from_raw(&absent).unwrap();
        assert_eq!(txn.check_or_slip_number(), None);
    }

    #[test]
    fn test_bad_posting_date() {
        let row = raw_row(
            4,
            ["DEBIT", "13/40/2024", "x", "-1.00", "MISC", "1.00", ""],
        );
        let err = TransactionRecord::from_raw(&row).unwrap_err();
        assert!(matches!(err, RowError::PostingDate { line: 4, .. }));
        assert!(err.to_string().contains("13/40/2024"));
    }

    #[test]
    fn test_iso_date_is_rejected() {
        let row = raw_row(
            4,
            ["DEBIT", "2024-01-05", "x", "-1.00", "MISC", "1.00", ""],
        );
        assert!(TransactionRecord::from_raw(&row).is_err());
    }

    #[test]
    fn test_bad_amount() {
        let row = raw_row(5, ["DEBIT", "01/05/2024", "x", "n/a", "MISC", "1.00", ""]);
        let err = TransactionRecord::from_raw(&row).unwrap_err();
        assert!(matches!(
            err,
            RowError::Amount {
                line: 5,
                column: Column::Amount,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_balance() {
        let row = raw_row(6, ["DEBIT", "01/05/2024", "x", "-1.00", "MISC", "", ""]);
        let err = TransactionRecord::from_raw(&row).unwrap_err();
        assert!(matches!(
            err,
            RowError::Amount {
                column: Column::Balance,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_field() {
        let row = raw_row(8, ["DEBIT", "01/05/2024", "x", "-1.00"]);
        let err = TransactionRecord::from_raw(&row).unwrap_err();
        assert!(matches!(
            err,
            RowError::MissingField {
                line: 8,
                column: Column::Type
            }
        ));
    }

    #[test]
    fn test_is_header() {
        let row = raw_row(3, ["Details", "Posting Date"]);
        assert!(row.is_header());
        let row = raw_row(3, ["DEBIT", "01/05/2024"]);
        assert!(!row.is_header());
    }

    #[test]
    fn test_serialized_field_order() {
        let row = raw_row(
            2,
            ["CREDIT", "01/10/2024", "Payroll", "2000.00", "ACH_CREDIT", "2995.50", ""],
        );
        let txn = TransactionRecord::from_raw(&row).unwrap();
        let json = serde_json::to_string(&txn).unwrap();
        assert_eq!(
            json,
            r#"{"details":"CREDIT","posting_date":"2024-01-10","description":"Payroll","amount":"2000.00","transaction_type":"ACH_CREDIT","balance":"2995.50","check_or_slip_number":null}"#
        );
    }

    #[test]
    fn test_classify() {
        use TransactionCategory::*;
        assert_eq!(TransactionCategory::classify("CREDIT", "ACH_CREDIT"), AchCredit);
        assert_eq!(TransactionCategory::classify("CREDIT", "DEBIT_CARD"), AchCredit);
        assert_eq!(TransactionCategory::classify("DSLIP", "DEPOSIT"), CheckDeposit);
        assert_eq!(TransactionCategory::classify("DEBIT", "CHECK_PAID"), CheckDeposit);
        assert_eq!(TransactionCategory::classify("DEBIT", "FEE_TRANSACTION"), FeeTransaction);
        assert_eq!(TransactionCategory::classify("DEBIT", "ACH_DEBIT"), AchDebit);
        assert_eq!(TransactionCategory::classify("debit", "debit_card"), DebitCard);
        assert_eq!(TransactionCategory::classify("DEBIT", "ATM_DEPOSIT"), Deposit);
        assert_eq!(TransactionCategory::classify("DEBIT", "ATM"), MiscDebit);
        assert_eq!(AchCredit.to_string(), "ACH_CREDIT");
    }
}
