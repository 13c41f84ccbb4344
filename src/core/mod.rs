//! Core conversion logic and application plumbing

pub mod config;
pub mod convert;
pub mod converter;
pub mod history;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use convert::ConversionError;
pub use converter::{Converter, Selection};
pub use history::{HISTORY_LIMIT, Transaction, TransactionHistory};
pub use rates::{RateProvider, RateTable};
