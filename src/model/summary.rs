//! Statement-wide and per-month statistics computed from converted transactions.

use crate::model::{Amount, TransactionRecord};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month, written as `YYYY-MM`. Orders chronologically.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("'{s}' is not a YYYY-MM month");
        let (year, month) = s.split_once('-').ok_or_else(bad)?;
        let year = year.parse().map_err(|_| bad())?;
        let month = month.parse().map_err(|_| bad())?;
        Month::new(year, month).ok_or_else(bad)
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Month::from_str(&s).map_err(D::Error::custom)
    }
}

/// The first and last posting dates of a statement.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Totals across every transaction in a statement.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    pub total_transactions: usize,
    /// The sum of the negative amounts. This is zero or negative.
    pub total_spent: Decimal,
    /// The sum of the non-negative amounts.
    pub total_received: Decimal,
    /// The mean of all amounts, zero when there are no transactions.
    pub average_transaction: Decimal,
    /// `None` when there are no transactions.
    pub date_range: Option<DateRange>,
}

impl Summary {
    /// The date range as shown to a person.
    pub fn date_range_label(&self) -> String {
        match &self.date_range {
            Some(range) => range.to_string(),
            None => String::from("No date range available"),
        }
    }
}

/// Totals for the transactions posted in one calendar month.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyStats {
    pub total_spent: Decimal,
    pub total_received: Decimal,
    pub transaction_count: usize,
    /// The magnitude of the month's largest transaction, whether spent or received.
    pub largest_transaction: Decimal,
    /// The `Type` seen most often in the month. Ties go to the type that appeared first.
    pub most_common_type: String,
}

/// Computes the statement summary and the per-month statistics in one pass over `transactions`.
pub fn aggregate(transactions: &[TransactionRecord]) -> (Summary, BTreeMap<Month, MonthlyStats>) {
    let mut summary = Summary::default();
    let mut months: BTreeMap<Month, MonthAccumulator> = BTreeMap::new();
    let mut sum = Decimal::ZERO;

    for (ix, txn) in transactions.iter().enumerate() {
        let amount = txn.amount();
        let date = txn.posting_date();

        summary.total_transactions += 1;
        sum += amount.value();
        if amount.is_negative() {
            summary.total_spent += amount.value();
        } else {
            summary.total_received += amount.value();
        }

        summary.date_range = Some(match summary.date_range {
            None => DateRange {
                start: date,
                end: date,
            },
            Some(range) => DateRange {
                start: range.start.min(date),
                end: range.end.max(date),
            },
        });

        months
            .entry(Month::of(date))
            .or_default()
            .add(ix, amount, txn.transaction_type());
    }

    if summary.total_transactions > 0 {
        summary.average_transaction = sum / Decimal::from(summary.total_transactions);
    }

    let monthly = months
        .into_iter()
        .map(|(month, acc)| (month, acc.finish()))
        .collect();

    (summary, monthly)
}

#[derive(Debug, Default)]
struct MonthAccumulator {
    stats: MonthlyStats,
    /// Maps a transaction type to (occurrences, index of first occurrence).
    types: HashMap<String, (usize, usize)>,
}

impl MonthAccumulator {
    fn add(&mut self, ix: usize, amount: Amount, transaction_type: &str) {
        let stats = &mut self.stats;
        stats.transaction_count += 1;
        if amount.is_negative() {
            stats.total_spent += amount.value();
        } else {
            stats.total_received += amount.value();
        }
        stats.largest_transaction = stats.largest_transaction.max(amount.value().abs());

        self.types
            .entry(transaction_type.to_string())
            .or_insert((0, ix))
            .0 += 1;
    }

    fn finish(self) -> MonthlyStats {
        let most_common_type = self
            .types
            .into_iter()
            .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_a.cmp(count_b).then(first_b.cmp(first_a))
            })
            .map(|(transaction_type, _)| transaction_type)
            .unwrap_or_default();

        MonthlyStats {
            most_common_type,
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{coffee_and_payroll, record};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_coffee_and_payroll() {
        let transactions = coffee_and_payroll();
        let (summary, monthly) = aggregate(&transactions);

        assert_eq!(summary.total_transactions, 2);
        assert_eq!(summary.total_spent, dec("-4.50"));
        assert_eq!(summary.total_received, dec("2000.00"));
        assert_eq!(summary.average_transaction, dec("997.75"));
        assert_eq!(
            summary.date_range,
            Some(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            })
        );
        assert_eq!(summary.date_range_label(), "2024-01-05 to 2024-01-10");

        assert_eq!(monthly.len(), 1);
        let january = monthly.get(&Month::new(2024, 1).unwrap()).unwrap();
        assert_eq!(january.transaction_count, 2);
        assert_eq!(january.largest_transaction, dec("2000.00"));
        assert_eq!(january.total_spent, dec("-4.50"));
        assert_eq!(january.total_received, dec("2000.00"));
        assert_eq!(january.most_common_type, "DEBIT_CARD");
    }

    #[test]
    fn test_empty() {
        let (summary, monthly) = aggregate(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.average_transaction, Decimal::ZERO);
        assert_eq!(summary.date_range, None);
        assert_eq!(summary.date_range_label(), "No date range available");
        assert!(monthly.is_empty());
    }

    #[test]
    fn test_totals_add_up_and_months_partition() {
        let transactions = vec![
            record("DEBIT", "02/28/2024", "-12.00", "DEBIT_CARD"),
            record("DEBIT", "01/31/2024", "-1,000.00", "ACH_DEBIT"),
            record("CREDIT", "03/01/2024", "250.25", "ACH_CREDIT"),
            record("DEBIT", "02/01/2024", "0.00", "MISC_DEBIT"),
            record("DSLIP", "12/15/2023", "(40.00)", "DEPOSIT"),
            record("CREDIT", "03/02/2024", "19.75", "ACH_CREDIT"),
        ];
        let (summary, monthly) = aggregate(&transactions);

        let sum: Decimal = transactions.iter().map(|t| t.amount().value()).sum();
        assert_eq!(summary.total_spent + summary.total_received, sum);
        assert_eq!(summary.total_spent, dec("-1052.00"));
        assert_eq!(summary.total_received, dec("270.00"));

        let counted: usize = monthly.values().map(|m| m.transaction_count).sum();
        assert_eq!(counted, summary.total_transactions);

        let labels: Vec<String> = monthly.keys().map(|m| m.to_string()).collect();
        assert_eq!(labels, ["2023-12", "2024-01", "2024-02", "2024-03"]);

        let december = &monthly[&Month::new(2023, 12).unwrap()];
        assert_eq!(december.largest_transaction, dec("40.00"));
        assert_eq!(december.total_spent, dec("-40.00"));
    }

    #[test]
    fn test_most_common_type_ties_go_to_first_seen() {
        let transactions = vec![
            record("DEBIT", "05/01/2024", "-1.00", "ACH_DEBIT"),
            record("DEBIT", "05/02/2024", "-1.00", "DEBIT_CARD"),
            record("DEBIT", "05/03/2024", "-1.00", "DEBIT_CARD"),
            record("DEBIT", "05/04/2024", "-1.00", "ACH_DEBIT"),
        ];
        let (_, monthly) = aggregate(&transactions);
        let may = &monthly[&Month::new(2024, 5).unwrap()];
        assert_eq!(may.most_common_type, "ACH_DEBIT");

        let mut transactions = transactions;
        transactions.push(record("DEBIT", "05/05/2024", "-1.00", "DEBIT_CARD"));
        let (_, monthly) = aggregate(&transactions);
        let may = &monthly[&Month::new(2024, 5).unwrap()];
        assert_eq!(may.most_common_type, "DEBIT_CARD");
    }

    #[test]
    fn test_average_keeps_precision() {
        let transactions = vec![
            record("DEBIT", "05/01/2024", "-1.00", "X"),
            record("DEBIT", "05/02/2024", "-1.00", "X"),
            record("CREDIT", "05/03/2024", "1.00", "X"),
        ];
        let (summary, _) = aggregate(&transactions);
        assert_eq!(summary.average_transaction.round_dp(2), dec("-0.33"));
    }

    #[test]
    fn test_month_parse_and_display() {
        let month = Month::from_str("2024-03").unwrap();
        assert_eq!(month, Month::new(2024, 3).unwrap());
        assert_eq!(month.to_string(), "2024-03");
        assert!(Month::from_str("2024-13").is_err());
        assert!(Month::from_str("March").is_err());
        assert!(Month::new(2024, 0).is_none());
    }

    #[test]
    fn test_monthly_json_keys() {
        let (_, monthly) = aggregate(&coffee_and_payroll());
        let json = serde_json::to_value(&monthly).unwrap();
        assert_eq!(json["2024-01"]["transaction_count"], 2);
        assert_eq!(json["2024-01"]["largest_transaction"], "2000.00");
    }
}
