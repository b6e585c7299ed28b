//! Currency consolidator.
//!
//! Two entry points produce the final debt list:
//! - [`simplify_debts`] simplifies every currency on its own;
//! - [`simplify_debts_in_currency`] first collapses all balances into one
//!   target currency.
//!
//! When a rate table is available, both then convert debts into the
//! creditor's preferred currency and net debts flowing in opposite directions
//! between the same two members. Conversions that cannot be derived fall back
//! to leaving the debt as it was.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    Currency, MemberId, Money,
    balances::CurrencyBalances,
    exchange::{RateTable, convert_amount, convert_balances_to_currency, get_conversion_rate},
    grouping::{SettledBy, merge_balances},
    simplify::{Debt, greedy_simplify},
};

/// Member → preferred settlement currency.
pub type Preferences = HashMap<MemberId, Currency>;

/// Simplifies debts independently for each currency.
///
/// Without `rates` the raw per-currency debts are returned.
pub fn simplify_debts(
    net_balances: &CurrencyBalances,
    settled_by: &SettledBy,
    preferences: &Preferences,
    rates: Option<&RateTable>,
) -> Vec<Debt> {
    let mut debts = Vec::new();
    for (currency, member_balances) in net_balances {
        let effective = merge_balances(member_balances, settled_by);
        debts.extend(greedy_simplify(&effective, currency));
    }

    match rates {
        Some(rates) => {
            let converted = apply_member_settlement_currencies(debts, preferences, rates);
            consolidate_opposite_debts(converted, preferences, rates)
        }
        None => debts,
    }
}

/// Simplifies debts after collapsing every currency into `target`.
pub fn simplify_debts_in_currency(
    net_balances: &CurrencyBalances,
    settled_by: &SettledBy,
    target: &Currency,
    rates: &RateTable,
    preferences: &Preferences,
) -> Vec<Debt> {
    let combined = convert_balances_to_currency(net_balances, target, rates);
    let effective = merge_balances(&combined, settled_by);
    let debts = greedy_simplify(&effective, target);
    let converted = apply_member_settlement_currencies(debts, preferences, rates);
    consolidate_opposite_debts(converted, preferences, rates)
}

/// Converts each debt into its creditor's preferred currency when a rate is
/// known; otherwise keeps it unchanged.
pub fn apply_member_settlement_currencies(
    debts: Vec<Debt>,
    preferences: &Preferences,
    rates: &RateTable,
) -> Vec<Debt> {
    if preferences.is_empty() {
        return debts;
    }

    debts
        .into_iter()
        .map(|debt| {
            let Some(preferred) = preferences.get(&debt.to) else {
                return debt;
            };
            if *preferred == debt.currency {
                return debt;
            }
            match get_conversion_rate(&debt.currency, preferred, rates) {
                Some(rate) => Debt {
                    amount: convert_amount(debt.amount, &debt.currency, preferred, rate),
                    currency: preferred.clone(),
                    ..debt
                },
                None => {
                    tracing::debug!(
                        "no rate from {} to {preferred}: keeping debt {} -> {} unconverted",
                        debt.currency,
                        debt.from,
                        debt.to
                    );
                    debt
                }
            }
        })
        .collect()
}

fn pair_key(a: &MemberId, b: &MemberId) -> (MemberId, MemberId) {
    if a < b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Nets debts flowing in both directions between the same two members.
///
/// Pairs keep the order in which they were first seen. For a pair with
/// opposite flows every leg is converted into the pivot currency and summed,
/// counting the direction of the pair's first debt as positive; the pair is
/// replaced by one debt for the net amount, in the receiver's preferred
/// currency when convertible. A pair netting to zero disappears; a pair with
/// an unconvertible leg is left as it was.
pub fn consolidate_opposite_debts(
    debts: Vec<Debt>,
    preferences: &Preferences,
    rates: &RateTable,
) -> Vec<Debt> {
    let mut pairs: IndexMap<(MemberId, MemberId), Vec<Debt>> = IndexMap::new();
    for debt in debts {
        pairs
            .entry(pair_key(&debt.from, &debt.to))
            .or_default()
            .push(debt);
    }

    let pivot = &rates.target;
    let mut result = Vec::new();

    for pair_debts in pairs.into_values() {
        let member_a = pair_debts[0].from.clone();
        let member_b = pair_debts[0].to.clone();

        let has_opposite = pair_debts.iter().any(|d| d.from != member_a);
        if !has_opposite {
            result.extend(pair_debts);
            continue;
        }

        let Some(net) = net_in_pivot(&pair_debts, &member_a, pivot, rates) else {
            tracing::debug!(
                "cannot net {member_a} and {member_b} in {pivot}: left unnetted"
            );
            result.extend(pair_debts);
            continue;
        };
        if net.is_zero() {
            tracing::trace!("debts between {member_a} and {member_b} cancel out");
            continue;
        }

        let (from, to) = if net.is_positive() {
            (member_a, member_b)
        } else {
            (member_b, member_a)
        };
        let amount = net.abs();

        let converted = preferences
            .get(&to)
            .filter(|preferred| *preferred != pivot)
            .and_then(|preferred| {
                get_conversion_rate(pivot, preferred, rates).map(|rate| {
                    (
                        convert_amount(amount, pivot, preferred, rate),
                        preferred.clone(),
                    )
                })
            });
        let (amount, currency) = converted.unwrap_or((amount, pivot.clone()));

        result.push(Debt {
            from,
            to,
            amount,
            currency,
        });
    }

    result
}

/// Signed sum of a pair's debts in the pivot currency, `None` if any leg has
/// no rate.
fn net_in_pivot(
    pair_debts: &[Debt],
    member_a: &MemberId,
    pivot: &Currency,
    rates: &RateTable,
) -> Option<Money> {
    let mut net = Money::ZERO;
    for debt in pair_debts {
        let rate = get_conversion_rate(&debt.currency, pivot, rates)?;
        let amount = convert_amount(debt.amount, &debt.currency, pivot, rate);
        if debt.from == *member_a {
            net += amount;
        } else {
            net -= amount;
        }
    }
    Some(net)
}
