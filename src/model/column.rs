use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Represents the columns of a bank statement, in the order in which the bank writes them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Details,
    PostingDate,
    Description,
    Amount,
    Type,
    Balance,
    CheckOrSlipNumber,
}

serde_plain::derive_display_from_serialize!(Column);
serde_plain::derive_fromstr_from_deserialize!(Column);

impl Column {
    /// Every column, in statement order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Details,
        Column::PostingDate,
        Column::Description,
        Column::Amount,
        Column::Type,
        Column::Balance,
        Column::CheckOrSlipNumber,
    ];

    /// The header text for this column as it appears in the statement file.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Details => DETAILS_STR,
            Column::PostingDate => POSTING_DATE_STR,
            Column::Description => DESCRIPTION_STR,
            Column::Amount => AMOUNT_STR,
            Column::Type => TYPE_STR,
            Column::Balance => BALANCE_STR,
            Column::CheckOrSlipNumber => CHECK_OR_SLIP_STR,
        }
    }

    pub fn from_header(header: impl AsRef<str>) -> Option<Column> {
        match header.as_ref().trim() {
            DETAILS_STR => Some(Column::Details),
            POSTING_DATE_STR => Some(Column::PostingDate),
            DESCRIPTION_STR => Some(Column::Description),
            AMOUNT_STR => Some(Column::Amount),
            TYPE_STR => Some(Column::Type),
            BALANCE_STR => Some(Column::Balance),
            CHECK_OR_SLIP_STR => Some(Column::CheckOrSlipNumber),
            _ => None,
        }
    }
}

const DETAILS_STR: &str = "Details";
const POSTING_DATE_STR: &str = "Posting Date";
const DESCRIPTION_STR: &str = "Description";
const AMOUNT_STR: &str = "Amount";
const TYPE_STR: &str = "Type";
const BALANCE_STR: &str = "Balance";
const CHECK_OR_SLIP_STR: &str = "Check or Slip #";

const COLUMN_COUNT: usize = 7;

/// The outcome of comparing a statement's header row against the fixed column layout.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HeaderCheck {
    /// The headers found in the file, trimmed, without trailing empty headers.
    found: Vec<String>,
    /// The headers a statement must have.
    expected: Vec<String>,
    /// Expected headers that are not in the file.
    missing: Vec<String>,
    /// Headers in the file that are not expected.
    unexpected: Vec<String>,
}

impl HeaderCheck {
    pub fn new<S, I>(headers: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let mut found: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim().to_string())
            .collect();

        // Exports often end each line with a comma, which produces an empty last header.
        while found.last().is_some_and(|h| h.is_empty()) {
            found.pop();
        }

        let expected: Vec<String> = Column::ALL.iter().map(|c| c.header().to_string()).collect();
        let missing = expected
            .iter()
            .filter(|e| !found.contains(e))
            .cloned()
            .collect();
        let unexpected = found
            .iter()
            .filter(|f| Column::from_header(f).is_none())
            .cloned()
            .collect();

        Self {
            found,
            expected,
            missing,
            unexpected,
        }
    }

    /// True when the headers are exactly the expected headers in the expected order.
    pub fn is_match(&self) -> bool {
        self.found == self.expected
    }

    pub fn found(&self) -> &[String] {
        &self.found
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn unexpected(&self) -> &[String] {
        &self.unexpected
    }

    /// Converts a failed check into the error that rejects the whole statement.
    pub fn into_result(self) -> Result<(), FormatError> {
        if self.is_match() {
            Ok(())
        } else {
            Err(FormatError::Headers {
                expected: self.expected,
                found: self.found,
            })
        }
    }
}

impl Display for HeaderCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Found:      {}", self.found.join(", "))?;
        writeln!(f, "Expected:   {}", self.expected.join(", "))?;
        if self.is_match() {
            return write!(f, "Headers match");
        }
        if !self.missing.is_empty() {
            writeln!(f, "Missing:    {}", self.missing.join(", "))?;
        }
        if !self.unexpected.is_empty() {
            writeln!(f, "Unexpected: {}", self.unexpected.join(", "))?;
        }
        if self.missing.is_empty() && self.unexpected.is_empty() {
            writeln!(f, "The headers are out of order")?;
        }
        write!(f, "Headers do not match")
    }
}
