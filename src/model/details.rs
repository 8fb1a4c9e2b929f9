use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DEBIT_STR: &str = "DEBIT";
const CREDIT_STR: &str = "CREDIT";
const DSLIP_STR: &str = "DSLIP";

/// The `Details` column of a statement, which tells whether money left or entered the account.
///
/// Unrecognized values are kept verbatim in `Other` so that they can be written back unchanged.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Details {
    Debit,
    Credit,
    /// A deposit slip.
    Dslip,
    Other(String),
}

impl Details {
    pub fn as_str(&self) -> &str {
        match self {
            Details::Debit => DEBIT_STR,
            Details::Credit => CREDIT_STR,
            Details::Dslip => DSLIP_STR,
            Details::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for Details {
    fn from(s: &str) -> Self {
        match s {
            DEBIT_STR => Details::Debit,
            CREDIT_STR => Details::Credit,
            DSLIP_STR => Details::Dslip,
            other => Details::Other(other.to_string()),
        }
    }
}

impl Default for Details {
    fn default() -> Self {
        Details::Other(String::new())
    }
}

impl FromStr for Details {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Details::from(s))
    }
}

impl Display for Details {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Details {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Details {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Details::from(s.as_str()))
    }
}
