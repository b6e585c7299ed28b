//! Debt simplifier: greedy matching of largest creditors with largest debtors.
//!
//! This is the usual minimum-transactions heuristic, not a global optimum.
//! Output must be reproducible by the client-side twin, so ties keep their
//! encounter order (stable sort).

use serde::{Deserialize, Serialize};

use crate::{Currency, MemberId, Money, balances::MemberBalances};

/// A settling transaction: `from` pays `to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub currency: Currency,
}

struct Position<'a> {
    member: &'a MemberId,
    amount: Money,
}

/// Reduces one currency's effective balances to settling transactions.
///
/// Every emitted amount is positive, the total equals the sum of positive
/// balances, and at most `creditors + debtors - 1` debts are produced.
pub fn greedy_simplify(effective: &MemberBalances, currency: &Currency) -> Vec<Debt> {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();
    for (member, &balance) in effective {
        if balance.is_positive() {
            creditors.push(Position {
                member,
                amount: balance,
            });
        } else if balance.is_negative() {
            debtors.push(Position {
                member,
                amount: -balance,
            });
        }
    }

    creditors.sort_by(|a, b| b.amount.cmp(&a.amount));
    debtors.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut debts = Vec::new();
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let creditor = &mut creditors[ci];
        let debtor = &mut debtors[di];
        let transfer = creditor.amount.min(debtor.amount);
        if transfer.is_positive() {
            debts.push(Debt {
                from: debtor.member.clone(),
                to: creditor.member.clone(),
                amount: transfer,
                currency: currency.clone(),
            });
        }
        creditor.amount -= transfer;
        debtor.amount -= transfer;
        if creditor.amount.is_zero() {
            ci += 1;
        }
        if debtor.amount.is_zero() {
            di += 1;
        }
    }

    tracing::trace!("simplified {currency} balances into {} debts", debts.len());
    debts
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

    fn balances(entries: &[(&str, i64)]) -> MemberBalances {
        entries.iter().map(|(m, b)| (id(m), Money::new(*b))).collect()
    }

    fn flows(debts: &[Debt]) -> Vec<(&str, &str, i64)> {
        debts
            .iter()
            .map(|d| (d.from.as_str(), d.to.as_str(), d.amount.minor()))
            .collect()
    }

    #[test]
    fn one_creditor_two_debtors() {
        let debts = greedy_simplify(&balances(&[("A", 66), ("B", -33), ("C", -33)]), &usd());
        assert_eq!(flows(&debts), vec![("B", "A", 33), ("C", "A", 33)]);
        assert!(debts.iter().all(|d| d.currency == usd()));
    }

    #[test]
    fn largest_positions_are_matched_first() {
        let debts = greedy_simplify(
            &balances(&[("A", 10), ("B", 50), ("C", -20), ("D", -40)]),
            &usd(),
        );
        assert_eq!(
            flows(&debts),
            vec![("D", "B", 40), ("C", "B", 10), ("C", "A", 10)]
        );
    }

    #[test]
    fn ties_keep_encounter_order() {
        let debts = greedy_simplify(
            &balances(&[("X", -5), ("A", 5), ("Y", -5), ("B", 5)]),
            &usd(),
        );
        assert_eq!(flows(&debts), vec![("X", "A", 5), ("Y", "B", 5)]);
    }

    #[test]
    fn zero_balances_produce_nothing() {
        assert!(greedy_simplify(&balances(&[("A", 0), ("B", 0)]), &usd()).is_empty());
        assert!(greedy_simplify(&MemberBalances::new(), &usd()).is_empty());
    }

    #[test]
    fn unbalanced_input_stops_when_a_side_runs_out() {
        let debts = greedy_simplify(&balances(&[("A", 100), ("B", -30)]), &usd());
        assert_eq!(flows(&debts), vec![("B", "A", 30)]);
    }

    #[test]
    fn debt_serializes_flat() {
        let debt = Debt {
            from: id("B"),
            to: id("A"),
            amount: Money::new(33),
            currency: usd(),
        };
        assert_eq!(
            serde_json::to_string(&debt).unwrap(),
            r#"{"from":"B","to":"A","amount":33,"currency":"USD"}"#
        );
    }
}
