use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Minor-unit digits used for codes missing from the decimals table.
pub const DEFAULT_MINOR_UNITS: u32 = 2;

/// ISO-like currency code attached to expenses, settlements, balances and debts.
///
/// The engine accepts any three-letter code: a code missing from the decimals
/// table is still a valid currency, it just uses [`DEFAULT_MINOR_UNITS`].
///
/// ## Minor units
///
/// Monetary values are [`Money`](crate::Money) amounts in **minor units**. `minor_units()`
/// returns how many decimal digits separate major from minor units:
/// - USD has 2, so `10.50 USD` ⇄ `1050`
/// - JPY has 0, so `1500 JPY` ⇄ `1500`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Canonical (upper-case) currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of fraction digits used when converting or formatting amounts.
    #[must_use]
    pub fn minor_units(&self) -> u32 {
        minor_units(self.code())
    }
}

/// Static currency-decimals table, shared with the client-side twin.
#[must_use]
pub fn minor_units(code: &str) -> u32 {
    match code {
        "USD" | "EUR" | "GBP" | "CAD" | "AUD" | "CHF" | "HKD" | "SGD" | "THB" | "INR" | "CNY"
        | "NZD" | "MXN" => 2,
        "JPY" | "KRW" => 0,
        _ => DEFAULT_MINOR_UNITS,
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::InvalidCurrency(format!(
                "expected a three-letter code, got \"{value}\""
            )));
        }
        Ok(Currency(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl core::str::FromStr for Currency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}
