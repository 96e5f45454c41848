//! Amount conversion and the source/target currency selection

use crate::core::currency::CurrencyCode;
use crate::core::rates::RateTable;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("Enter a valid non-negative number (got '{0}')")]
    Input(String),
    #[error("Rate for {0} is unavailable")]
    RateUnavailable(CurrencyCode),
    #[error("Converting {from} to {to} gives a result out of range")]
    OutOfRange {
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
    },
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
    pub result: f64,
}

impl Conversion {
    /// Human readable line, e.g. `100 USD = 92.0000 EUR`.
    pub fn describe(&self, precision: usize) -> String {
        format!(
            "{} {} = {:.precision$} {}",
            self.amount, self.from, self.result, self.to
        )
    }
}

/// Parses user input into an amount. A decimal comma is accepted.
pub fn parse_amount(input: &str) -> Result<f64, ConversionError> {
    let normalised = input.trim().replace(',', ".");
    match normalised.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(ConversionError::Input(input.to_string())),
    }
}

/// Converts `amount_input` from `from` to `to`.
///
/// `rates` must have been fetched with `from` as base. The amount is
/// validated before the rate lookup.
pub fn convert(
    amount_input: &str,
    from: &CurrencyCode,
    to: &CurrencyCode,
    rates: &RateTable,
) -> Result<Conversion, ConversionError> {
    let amount = parse_amount(amount_input)?;
    let rate = rates
        .get(to)
        .ok_or_else(|| ConversionError::RateUnavailable(to.clone()))?;
    debug!(%from, %to, amount, rate, "Converting");

    let result = amount * rate;
    if !result.is_finite() {
        return Err(ConversionError::OutOfRange {
            amount,
            from: from.clone(),
            to: to.clone(),
        });
    }

    Ok(Conversion {
        amount,
        from: from.clone(),
        to: to.clone(),
        rate,
        result,
    })
}

/// The pair of currencies currently picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl Selection {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }
}
