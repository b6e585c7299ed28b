//! Integer money.
//!
//! Every amount in the engine is a [`Money`]: a signed number of **minor
//! units** of its currency (cents for USD, whole yen for JPY). Floating point
//! only appears transiently inside split and conversion formulas, and always
//! comes back through [`round_half_up`].

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Rounds to the nearest integer, halves going up: `⌊x + 0.5⌋`.
///
/// This is `Math.round` of the client-side twin, not banker's rounding and not
/// `f64::round` (which rounds halves away from zero): `-2.5` becomes `-2`.
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `10^exp` as a float, for decimal normalization.
pub(crate) fn pow10(exp: u32) -> f64 {
    10f64.powi(exp as i32)
}

/// Signed money amount in **minor units** of some currency.
///
/// Use this type for all monetary values in the engine (expense amounts,
/// shares, balances, debts). The currency travels alongside it, never inside.
///
/// The value is signed:
/// - positive = the member is owed money
/// - negative = the member owes money
///
/// Serialized as a bare integer.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let usd = Currency::try_from("USD").unwrap();
/// assert_eq!(Money::new(12_34).format_minor(&usd), "12.34 USD");
/// assert_eq!(Money::parse_major("10,5", &usd).unwrap(), Money::new(1050));
/// assert!(Money::parse_major("12.345", &usd).is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Rounds a fractional minor-unit amount half up.
    #[must_use]
    pub fn round_half_up(value: f64) -> Self {
        Self(round_half_up(value))
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Formats as a major-unit string followed by the currency code.
    #[must_use]
    pub fn format_minor(self, currency: &Currency) -> String {
        let decimals = currency.minor_units();
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        if decimals == 0 {
            return format!("{sign}{abs} {currency}");
        }
        let scale = 10u64.pow(decimals);
        let major = abs / scale;
        let minor = abs % scale;
        let width = decimals as usize;
        format!("{sign}{major}.{minor:0width$} {currency}")
    }

    /// Parses a decimal string in major units into minor units of `currency`.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - at most `currency.minor_units()` fractional digits
    /// - rejects empty/invalid strings
    pub fn parse_major(s: &str, currency: &Currency) -> ResultEngine<Self> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(invalid)?;
        let minor_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let major: i64 = major_str.parse().map_err(|_| invalid())?;

        let decimals = currency.minor_units();
        let minor: i64 = match minor_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                if frac.len() > decimals as usize {
                    return Err(EngineError::InvalidAmount(format!(
                        "too many decimals for {currency}"
                    )));
                }
                let padding = decimals - frac.len() as u32;
                frac.parse::<i64>().map_err(|_| invalid())? * 10i64.pow(padding)
            }
        };

        let total = major
            .checked_mul(10i64.pow(decimals))
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(overflow)?;

        if negative {
            total.checked_neg().map(Money).ok_or_else(overflow)
        } else {
            Ok(Money(total))
        }
    }
}

/// Raw minor units; use [`Money::format_minor`] for display to users.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
