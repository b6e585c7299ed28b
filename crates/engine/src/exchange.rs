//! Currency conversion through a pivot currency.
//!
//! The rate table only stores rates *to* one baseline currency (a star, not a
//! full matrix), so an external provider needs one quote per currency. Any
//! pairwise rate is derived through that pivot.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    Currency, Money,
    balances::{CurrencyBalances, MemberBalances},
    money::pow10,
};

/// Rates from each listed currency to `target`.
///
/// A currency missing from `rates` has an unknown rate; that is not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub target: Currency,
    #[serde(default)]
    pub rates: IndexMap<Currency, f64>,
}

impl RateTable {
    pub fn new(target: Currency) -> Self {
        Self {
            target,
            rates: IndexMap::new(),
        }
    }

    /// Builds a table from provider quotes, skipping quotes for the target
    /// itself.
    pub fn from_quotes(
        target: Currency,
        quotes: impl IntoIterator<Item = (Currency, f64)>,
    ) -> Self {
        let rates = quotes
            .into_iter()
            .filter(|(currency, _)| *currency != target)
            .collect();
        Self { target, rates }
    }

    /// Rate from `currency` to the pivot.
    pub fn rate_to_target(&self, currency: &Currency) -> Option<f64> {
        if *currency == self.target {
            Some(1.0)
        } else {
            self.rates.get(currency).copied()
        }
    }
}

/// Derives the rate converting one unit of `from` into `to`.
///
/// Returns `1.0` for identical currencies whatever the table holds, and
/// `None` when either leg to the pivot is unknown.
pub fn get_conversion_rate(from: &Currency, to: &Currency, table: &RateTable) -> Option<f64> {
    if from == to {
        return Some(1.0);
    }
    let from_to_target = table.rate_to_target(from)?;
    let to_to_target = table.rate_to_target(to)?;
    Some(from_to_target / to_to_target)
}

/// Converts minor units of `from` into minor units of `to`.
///
/// The amount is first normalized to major units, since currencies differ in
/// minor-unit granularity (JPY has none), then rounded half up.
#[must_use]
pub fn convert_amount(amount: Money, from: &Currency, to: &Currency, rate: f64) -> Money {
    let display_amount = amount.minor() as f64 / pow10(from.minor_units());
    Money::round_half_up(display_amount * rate * pow10(to.minor_units()))
}

/// Collapses multi-currency balances into `target`.
///
/// Every member referenced in any currency gets an entry. A balance held in a
/// currency with no derivable rate to `target` is left out of that member's
/// total.
pub fn convert_balances_to_currency(
    net_balances: &CurrencyBalances,
    target: &Currency,
    table: &RateTable,
) -> MemberBalances {
    let mut combined = MemberBalances::new();

    for (currency, member_balances) in net_balances {
        let rate = get_conversion_rate(currency, target, table);
        for (member, &balance) in member_balances {
            let total = combined.entry(member.clone()).or_insert(Money::ZERO);
            if currency == target {
                *total += balance;
                continue;
            }
            match rate {
                Some(rate) => *total += convert_amount(balance, currency, target, rate),
                None => tracing::debug!(
                    "no rate from {currency} to {target}: dropping {balance} of {member}"
                ),
            }
        }
    }

    combined
}
