//! Types that represent the statement data model, such as `TransactionRecord` and `Summary`.
mod amount;
mod column;
mod dashboard;
mod details;
mod summary;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat};
pub use column::{Column, HeaderCheck};
pub use dashboard::Dashboard;
pub use details::Details;
pub use summary::{aggregate, DateRange, Month, MonthlyStats, Summary};
pub use transaction::{RawRow, TransactionCategory, TransactionRecord, POSTING_DATE_FORMAT};
