//! Amount type for handling monetary values as they appear in bank statements.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that may
//! or may not include a dollar sign, thousands separators or accounting-style parentheses.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Represents how dollar amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ dollar: true, commas: true, parens: false }` -> `-$60,000.00`
///  - `AmountFormat{ dollar: false, commas: true, parens: false }` -> `-60,000.00`
///  - `AmountFormat{ dollar: false, commas: false, parens: false }` -> `-60000.00`
///  - `AmountFormat{ dollar: false, commas: true, parens: true }` -> `(60,000.00)`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a dollar sign is present in the formatting.
    dollar: bool,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
    /// Whether a negative value is written in accounting parentheses instead of a minus sign.
    parens: bool,
    /// Whether a zero was written with a sign, e.g. `-0.00`.
    signed_zero: bool,
}

impl AmountFormat {
    pub const fn new(dollar: bool, commas: bool, parens: bool) -> Self {
        Self {
            dollar,
            commas,
            parens,
            signed_zero: false,
        }
    }
}

/// The largest magnitude accepted from a statement cell. Sums of many such amounts still fit in a
/// `Decimal`.
const MAX_MAGNITUDE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Bank exports write plain numbers, e.g. `-4.50` and `2995.50`.
const PLAIN_FORMAT: AmountFormat = AmountFormat::new(false, false, false);

/// Represents a dollar amount from a statement cell.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use budget_dash::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-4.50").unwrap();
/// assert_eq!(amount.to_string(), "-4.50");
///
/// let a = Amount::from_str("(5,000.00)").unwrap();
/// let b = Amount::from_str("-5000.00").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.value(), b.value());
/// assert_eq!(a.to_string(), "(5,000.00)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with plain `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: PLAIN_FORMAT,
        }
    }

    /// Creates a new Amount from a Decimal value with the specified formatting.
    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the way this amount will be written.
    pub fn format(&self) -> AmountFormat {
        self.format
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is an outflow.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }
}

/// An error that can occur when parsing statement cells into `Amount` values.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    /// The cell had no digits at all.
    #[error("the amount is empty")]
    Empty,

    /// The cell could not be read as a decimal number.
    #[error("'{text}' is not a decimal amount: {source}")]
    Invalid {
        text: String,
        #[source]
        source: rust_decimal::Error,
    },

    /// The cell is a decimal number, but far too large to be an amount on a bank statement.
    #[error("'{text}' is larger than the largest supported amount, {}", MAX_MAGNITUDE)]
    TooLarge { text: String },
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Accounting style: "(12.50)" means "-12.50"
        let (parens, inner) = match trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => (false, trimmed),
        };

        let (minus, unsigned) = match inner.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };

        let (dollar, digits) = match unsigned.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, unsigned),
        };

        // Remove commas (thousand separators)
        let without_commas = digits.replace(',', "");
        let commas = without_commas.len() < digits.len();
        if without_commas.is_empty() {
            return Err(AmountError::Empty);
        }
        if without_commas.starts_with(['-', '+']) {
            return Err(invalid(trimmed, rust_decimal::Error::ErrorString(
                "unexpected sign".to_string(),
            )));
        }

        let magnitude = Decimal::from_str(&without_commas).map_err(|e| invalid(trimmed, e))?;
        if magnitude.abs() > MAX_MAGNITUDE {
            return Err(AmountError::TooLarge {
                text: trimmed.to_string(),
            });
        }
        let value = if minus || parens {
            -magnitude
        } else {
            magnitude
        };

        Ok(Amount {
            value,
            format: AmountFormat {
                dollar,
                commas,
                parens,
                signed_zero: (minus || parens) && magnitude.is_zero(),
            },
        })
    }
}

fn invalid(text: &str, source: rust_decimal::Error) -> AmountError {
    AmountError::Invalid {
        text: text.to_string(),
        source,
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let num = self.value().abs();
        let dol = if self.format.dollar { "$" } else { "" };
        let digits = if self.format.commas {
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        } else {
            num.to_string()
        };

        let negative = self.is_negative() || (self.is_zero() && self.format.signed_zero);
        match (negative, self.format.parens) {
            (true, true) => write!(f, "({dol}{digits})"),
            (true, false) => write!(f, "-{dol}{digits}"),
            (false, _) => write!(f, "{dol}{digits}"),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
