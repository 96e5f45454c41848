//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod currency;
pub mod history;
pub mod log;
pub mod rates;
pub mod recover;
pub mod trend;

// Re-export main types for cleaner imports
pub use convert::{Conversion, ConversionError, Selection};
pub use currency::CurrencyCode;
pub use history::{ConversionRecord, HistoryError, HistoryStore};
pub use rates::{FetchError, FetchFailure, RateProvider, RateTable};
pub use trend::TrendPoint;
