//! Conversion records and the history store abstraction

use crate::core::convert::Conversion;
use crate::core::currency::CurrencyCode;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged conversion. Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    #[serde(with = "record_date")]
    pub date: NaiveDateTime,
    pub amount: f64,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub result: f64,
}

impl ConversionRecord {
    pub fn from_conversion(conversion: &Conversion, date: NaiveDateTime) -> Self {
        Self {
            date,
            amount: conversion.amount,
            from_currency: conversion.from.clone(),
            to_currency: conversion.to.clone(),
            result: conversion.result,
        }
    }

    /// Text that `search` queries are matched against. Numbers use their
    /// shortest round-trip form with a decimal point, so `100.0` matches.
    pub fn search_text(&self) -> String {
        format!(
            "{} {:?} {} {} {:?}",
            self.date.format(DATE_FORMAT),
            self.amount,
            self.from_currency,
            self.to_currency,
            self.result
        )
    }

    /// JSON has no representation for infinities or NaN.
    pub fn is_finite(&self) -> bool {
        self.amount.is_finite() && self.result.is_finite()
    }

    pub fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || self
                .search_text()
                .to_lowercase()
                .contains(&query.to_lowercase())
    }
}

mod record_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(D::Error::custom)
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Refusing to log a non-finite conversion from {from} to {to}")]
    NonFinite {
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
        result: f64,
    },
    #[error("Failed to write history file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An ordered, append-only log of conversions.
///
/// Reads never fail: a missing or unreadable log is an empty log.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: ConversionRecord) -> Result<(), HistoryError>;

    /// All records, oldest first.
    fn load_all(&self) -> Vec<ConversionRecord>;

    fn search(&self, query: &str) -> Vec<ConversionRecord> {
        self.load_all()
            .into_iter()
            .filter(|record| record.matches(query))
            .collect()
    }
}
