//! Currency codes and the default set offered to the user

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Currencies offered when the configuration does not list any.
pub const DEFAULT_CURRENCIES: [&str; 5] = ["USD", "EUR", "RUB", "GBP", "JPY"];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid currency code: '{0}'")]
pub struct CurrencyCodeError(pub String);

/// An ISO-4217-like code, always three upper-case ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CurrencyCode(trimmed.to_ascii_uppercase()))
        } else {
            Err(CurrencyCodeError(s.to_string()))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn default_currencies() -> Vec<CurrencyCode> {
    DEFAULT_CURRENCIES
        .iter()
        .map(|c| CurrencyCode(c.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_case() {
        let code: CurrencyCode = " usd ".parse().unwrap();
        assert_eq!(code.as_str(), "USD");
    }

    #[test]
    fn test_parse_rejects_invalid_codes() {
        for input in ["", "US", "USDT", "U$D", "12A"] {
            assert!(input.parse::<CurrencyCode>().is_err(), "{input} accepted");
        }
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let code: CurrencyCode = "eur".parse().unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");

        let parsed: CurrencyCode = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(parsed.as_str(), "GBP");
        assert!(serde_json::from_str::<CurrencyCode>("\"pounds\"").is_err());
    }

    #[test]
    fn test_default_currencies() {
        let codes: Vec<String> = default_currencies().into_iter().map(String::from).collect();
        assert_eq!(codes, ["USD", "EUR", "RUB", "GBP", "JPY"]);
    }
}
