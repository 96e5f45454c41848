//! Exchange rate snapshots and the provider abstraction

use crate::core::currency::CurrencyCode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Rates for one base currency, as returned by a single fetch.
///
/// Every rate held is finite and strictly positive. A table is never
/// patched; a new fetch produces a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: CurrencyCode,
    fetched_at: DateTime<Utc>,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl RateTable {
    /// Builds a table from raw provider entries.
    ///
    /// Keys that are not currency codes and rates that are not positive
    /// are skipped with a warning.
    pub fn from_raw<I, K>(base: CurrencyCode, fetched_at: DateTime<Utc>, raw: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut rates = BTreeMap::new();
        for (key, rate) in raw {
            let key = key.as_ref();
            let Ok(code) = key.parse::<CurrencyCode>() else {
                warn!(%base, key, "Skipping rate with invalid currency code");
                continue;
            };
            if !rate.is_finite() || rate <= 0.0 {
                warn!(%base, %code, rate, "Skipping non-positive rate");
                continue;
            }
            rates.insert(code, rate);
        }
        Self {
            base,
            fetched_at,
            rates,
        }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn get(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }
}

/// Why a fetch failed. Kept for logs; callers only see [`FetchError`].
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The rate provider could not deliver rates for `base`.
#[derive(Debug, Error)]
#[error("Exchange rate provider unavailable for {base}")]
pub struct FetchError {
    pub base: CurrencyCode,
    #[source]
    pub cause: FetchFailure,
}

impl FetchError {
    pub fn new(base: &CurrencyCode, cause: FetchFailure) -> Self {
        Self {
            base: base.clone(),
            cause,
        }
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError>;
}
