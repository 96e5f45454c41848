//! Terminal front end

pub mod convert;
pub mod history;
pub mod interactive;
pub mod rates;
pub mod setup;
pub mod trend;
pub mod ui;
