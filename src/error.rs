use crate::model::{AmountError, Column};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A problem with the statement file as a whole. Nothing from the file can be used.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The file has no header row at all.
    #[error("the statement is empty, expected a header row")]
    Empty,

    /// The header row is not the fixed statement layout.
    #[error("unexpected statement headers, expected [{}] but found [{}]", .expected.join(", "), .found.join(", "))]
    Headers {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The header row could not be read as CSV.
    #[error("the statement could not be read as CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A problem with a single statement row. The row is skipped and the rest of the statement is kept.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    /// The row ended before reaching a required column.
    #[error("line {line}: missing the '{}' column", .column.header())]
    MissingField { line: u64, column: Column },

    /// The posting date is not `MM/DD/YYYY` or is not a real calendar date.
    #[error("line {line}: invalid posting date '{value}': {source}")]
    PostingDate {
        line: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The amount or balance is not a decimal.
    #[error("line {line}: invalid {column} '{value}': {source}")]
    Amount {
        line: u64,
        column: Column,
        value: String,
        #[source]
        source: AmountError,
    },

    /// The CSV reader could not decode the row, e.g. because it is not UTF-8.
    #[error("line {line}: unreadable row: {source}")]
    Unreadable {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

impl RowError {
    /// The 1-based line of the statement file where the row starts.
    pub fn line(&self) -> u64 {
        match self {
            RowError::MissingField { line, .. }
            | RowError::PostingDate { line, .. }
            | RowError::Amount { line, .. }
            | RowError::Unreadable { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_message() {
        let err = FormatError::Headers {
            expected: vec!["Details".to_string(), "Amount".to_string()],
            found: vec!["Date".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unexpected statement headers, expected [Details, Amount] but found [Date]"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = RowError::MissingField {
            line: 7,
            column: Column::Balance,
        };
        assert_eq!(err.to_string(), "line 7: missing the 'Balance' column");
        assert_eq!(err.line(), 7);
    }

    #[test]
    fn test_amount_message() {
        let err = RowError::Amount {
            line: 3,
            column: Column::Amount,
            value: String::new(),
            source: AmountError::Empty,
        };
        assert_eq!(err.to_string(), "line 3: invalid amount '': the amount is empty");
    }
}
