//! Balance aggregator: folds expenses and settlements into net balances.
//!
//! Balances are kept per currency and never converted here. A positive
//! balance means the member is owed money, a negative one that the member owes.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    Currency, MemberId, Money,
    split::{Shares, SplitMethod, calculate_split},
};

/// Net balance per member, in first-reference order.
pub type MemberBalances = IndexMap<MemberId, Money>;

/// Net balances per currency, in first-encounter order.
pub type CurrencyBalances = IndexMap<Currency, MemberBalances>;

/// A payment by one member, shared among the involved members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub amount: Money,
    pub paid_by: MemberId,
    pub split_method: SplitMethod,
    pub involved_members: Vec<MemberId>,
    #[serde(default)]
    pub split_details: HashMap<MemberId, f64>,
    /// `None` means the trip's default currency.
    #[serde(default)]
    pub currency: Option<Currency>,
}

/// A direct repayment from one member to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    /// `None` means the trip's default currency.
    #[serde(default)]
    pub currency: Option<Currency>,
}

impl Expense {
    /// Per-member shares of this expense.
    pub fn shares(&self) -> Shares {
        calculate_split(
            self.amount,
            self.split_method,
            &self.involved_members,
            &self.split_details,
        )
    }
}

/// Computes per-currency, per-member net balances.
///
/// Every member referenced in a currency gets an entry, even when it nets to
/// zero. For a single currency the balances sum to zero as long as every
/// expense's shares sum to its amount.
pub fn compute_net_balances(
    expenses: &[Expense],
    settlements: &[Settlement],
    trip_currency: &Currency,
) -> CurrencyBalances {
    let mut balances = CurrencyBalances::new();

    for expense in expenses {
        let currency = expense.currency.as_ref().unwrap_or(trip_currency);
        let shares = expense.shares();
        let book = balances.entry(currency.clone()).or_default();

        *book.entry(expense.paid_by.clone()).or_insert(Money::ZERO) += expense.amount;
        for (member, share) in shares {
            *book.entry(member).or_insert(Money::ZERO) -= share;
        }
    }

    for settlement in settlements {
        let currency = settlement.currency.as_ref().unwrap_or(trip_currency);
        let book = balances.entry(currency.clone()).or_default();

        *book.entry(settlement.from.clone()).or_insert(Money::ZERO) += settlement.amount;
        *book.entry(settlement.to.clone()).or_insert(Money::ZERO) -= settlement.amount;
    }

    tracing::trace!(
        "computed balances for {} expenses and {} settlements in {} currencies",
        expenses.len(),
        settlements.len(),
        balances.len()
    );
    balances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> MemberId {
        MemberId::new(value).unwrap()
    }

    fn usd() -> Currency {
        Currency::try_from("USD").unwrap()
    }

    fn even(amount: i64, paid_by: &str, involved: &[&str], currency: Option<&str>) -> Expense {
        Expense {
            amount: Money::new(amount),
            paid_by: id(paid_by),
            split_method: SplitMethod::Even,
            involved_members: involved.iter().map(|m| id(m)).collect(),
            split_details: HashMap::new(),
            currency: currency.map(|c| Currency::try_from(c).unwrap()),
        }
    }

    #[test]
    fn payer_gets_amount_and_pays_own_share() {
        let balances = compute_net_balances(&[even(100, "A", &["A", "B", "C"], None)], &[], &usd());
        let book = &balances[&usd()];
        assert_eq!(book[&id("A")], Money::new(66));
        assert_eq!(book[&id("B")], Money::new(-33));
        assert_eq!(book[&id("C")], Money::new(-33));
    }

    #[test]
    fn explicit_currency_gets_its_own_book() {
        let balances = compute_net_balances(
            &[
                even(100, "A", &["B"], None),
                even(5000, "B", &["A"], Some("JPY")),
            ],
            &[],
            &usd(),
        );
        let codes: Vec<&str> = balances.keys().map(Currency::code).collect();
        assert_eq!(codes, vec!["USD", "JPY"]);
        let jpy = Currency::try_from("JPY").unwrap();
        assert_eq!(balances[&jpy][&id("B")], Money::new(5000));
        assert_eq!(balances[&jpy][&id("A")], Money::new(-5000));
    }

    #[test]
    fn settlement_moves_debtor_towards_zero() {
        let settlement = Settlement {
            from: id("B"),
            to: id("A"),
            amount: Money::new(33),
            currency: None,
        };
        let balances = compute_net_balances(
            &[even(100, "A", &["A", "B", "C"], None)],
            &[settlement],
            &usd(),
        );
        let book = &balances[&usd()];
        assert_eq!(book[&id("A")], Money::new(33));
        assert_eq!(book[&id("B")], Money::ZERO);
        assert_eq!(book[&id("C")], Money::new(-33));
    }

    #[test]
    fn members_netting_to_zero_are_kept() {
        let balances = compute_net_balances(&[even(100, "A", &["A"], None)], &[], &usd());
        assert_eq!(balances[&usd()].get(&id("A")), Some(&Money::ZERO));
    }

    #[test]
    fn entries_follow_first_reference_order() {
        let balances = compute_net_balances(&[even(90, "C", &["B", "A", "C"], None)], &[], &usd());
        let order: Vec<&str> = balances[&usd()].keys().map(MemberId::as_str).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn expense_deserializes_from_camel_case() {
        let raw = r#"{
            "amount": 1000,
            "paidBy": "1",
            "splitMethod": "ratio",
            "involvedMembers": ["1", "2"],
            "splitDetails": {"1": 1, "2": 3},
            "currency": null
        }"#;
        let expense: Expense = serde_json::from_str(raw).unwrap();
        assert_eq!(expense.currency, None);
        assert_eq!(expense.amount, Money::new(1000));
        assert_eq!(expense.shares()[&id("2")], Money::new(750));
    }
}
