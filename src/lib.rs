//! budget-dash reads the CSV activity statements that banks let you download, converts each row
//! into a typed transaction, and summarizes spending and income overall and by month.

pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
mod reports;
pub mod statement;
mod utils;


pub use config::Config;
pub use error::{Error, FormatError, Result, RowError};
