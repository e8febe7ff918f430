//! Price History Adapters
//!
//! Daily candle sources for the trend tool: the Tushare API and local CSV files.

pub mod tushare;
pub mod csv_file;

pub use tushare::{TushareClient, TushareConfig};
pub use csv_file::CsvBarSource;
