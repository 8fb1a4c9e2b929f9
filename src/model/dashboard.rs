use crate::model::{aggregate, Month, MonthlyStats, Summary, TransactionRecord};
use crate::statement::Statement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything computed from one statement: the transactions, the summary and the monthly
/// statistics.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Dashboard {
    transactions: Vec<TransactionRecord>,
    summary: Summary,
    monthly_stats: BTreeMap<Month, MonthlyStats>,
    /// The number of statement rows that could not be converted.
    rejected_rows: usize,
}

impl Dashboard {
    pub fn new(statement: Statement) -> Self {
        let rejected_rows = statement.rejected().len();
        let transactions = statement.into_transactions();
        let (summary, monthly_stats) = aggregate(&transactions);
        Self {
            transactions,
            summary,
            monthly_stats,
            rejected_rows,
        }
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn monthly_stats(&self) -> &BTreeMap<Month, MonthlyStats> {
        &self.monthly_stats
    }

    pub fn rejected_rows(&self) -> usize {
        self.rejected_rows
    }
}
