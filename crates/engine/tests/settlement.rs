use std::collections::HashMap;

use engine::{
    Currency, CurrencyBalances, Debt, Expense, GroupingMode, MemberBalances, MemberId, Money,
    Preferences, RateTable, SettledBy, SplitMethod, Trip, calculate_split,
    consolidate_opposite_debts, convert_amount, convert_balances_to_currency,
    get_conversion_rate, greedy_simplify, simplify_debts_in_currency,
};

fn id(value: &str) -> MemberId {
    MemberId::new(value).unwrap()
}

fn c(code: &str) -> Currency {
    Currency::try_from(code).unwrap()
}

fn debt(from: &str, to: &str, amount: i64, currency: &str) -> Debt {
    Debt {
        from: id(from),
        to: id(to),
        amount: Money::new(amount),
        currency: c(currency),
    }
}

fn balances(entries: &[(&str, i64)]) -> MemberBalances {
    entries.iter().map(|(m, b)| (id(m), Money::new(*b))).collect()
}

fn convert(amount: i64, from: &str, to: &str, rate: f64) -> i64 {
    convert_amount(Money::new(amount), &c(from), &c(to), rate).minor()
}

fn trip(json: &str) -> Trip {
    serde_json::from_str(json).unwrap()
}

#[test]
fn even_split_and_balances_of_a_shared_dinner() {
    let involved = vec![id("A"), id("B"), id("C")];
    let shares = calculate_split(Money::new(100), SplitMethod::Even, &involved, &HashMap::new());
    assert_eq!(shares[&id("A")], Money::new(34));
    assert_eq!(shares[&id("B")], Money::new(33));
    assert_eq!(shares[&id("C")], Money::new(33));

    let expense = Expense {
        amount: Money::new(100),
        paid_by: id("A"),
        split_method: SplitMethod::Even,
        involved_members: involved,
        split_details: HashMap::new(),
        currency: None,
    };
    let net = engine::compute_net_balances(&[expense], &[], &c("USD"));
    assert_eq!(net[&c("USD")], balances(&[("A", 66), ("B", -33), ("C", -33)]));
    assert_eq!(net[&c("USD")].values().sum::<Money>(), Money::ZERO);
}

#[test]
fn single_creditor_is_paid_by_each_debtor() {
    let debts = greedy_simplify(&balances(&[("A", 66), ("B", -33), ("C", -33)]), &c("USD"));
    assert_eq!(
        debts,
        vec![debt("B", "A", 33, "USD"), debt("C", "A", 33, "USD")]
    );
}

#[test]
fn dollars_to_yen_normalizes_decimals() {
    assert_eq!(convert(1000, "USD", "JPY", 150.0), 1500);
}

#[test]
fn opposite_debts_in_different_currencies_are_netted() {
    let rates = RateTable::from_quotes(c("USD"), [(c("EUR"), 1.125), (c("JPY"), 0.0064)]);
    assert_eq!(convert(80, "EUR", "USD", 1.125), 90);

    let input = vec![debt("A", "B", 100, "USD"), debt("B", "A", 80, "EUR")];
    let debts = consolidate_opposite_debts(input.clone(), &Preferences::new(), &rates);
    assert_eq!(debts, vec![debt("A", "B", 10, "USD")]);

    let prefs: Preferences = [(id("B"), c("EUR"))].into_iter().collect();
    let debts = consolidate_opposite_debts(input, &prefs, &rates);
    let rate = get_conversion_rate(&c("USD"), &c("EUR"), &rates).unwrap();
    assert_eq!(
        debts,
        vec![debt("A", "B", convert(10, "USD", "EUR", rate), "EUR")]
    );
}

#[test]
fn full_trip_settles_per_currency_with_grouping() {
    let t = trip(
        r#"{
            "currency": "USD",
            "members": [
                {"id": "A", "name": "Ann"},
                {"id": "B", "name": "Ben"},
                {"id": "C", "name": "Cat", "settledBy": "B"}
            ],
            "expenses": [
                {"amount": 9000, "paidBy": "A", "splitMethod": "even",
                 "involvedMembers": ["A", "B", "C"]},
                {"amount": 1000, "paidBy": "B", "splitMethod": "percentage",
                 "involvedMembers": ["A", "B"], "splitDetails": {"A": 25, "B": 75}}
            ],
            "settlements": [
                {"from": "B", "to": "A", "amount": 1000}
            ]
        }"#,
    );

    let net = t.net_balances();
    assert_eq!(
        net[&c("USD")],
        balances(&[
            ("A", 9000 - 3000 - 250 - 1000),
            ("B", 1000 - 3000 - 750 + 1000),
            ("C", -3000),
        ])
    );

    let debts = t.settle(None, GroupingMode::SingleLevel).unwrap();
    assert_eq!(debts, vec![debt("B", "A", 4750, "USD")]);
}

#[test]
fn full_trip_in_single_target_currency() {
    let t = trip(
        r#"{
            "currency": "USD",
            "settlementCurrency": "USD",
            "members": [
                {"id": "A", "name": "Ann"},
                {"id": "B", "name": "Ben", "settlementCurrency": "JPY"}
            ],
            "expenses": [
                {"amount": 2000, "paidBy": "A", "splitMethod": "even",
                 "involvedMembers": ["A", "B"]},
                {"amount": 3000, "paidBy": "B", "splitMethod": "amount",
                 "involvedMembers": ["A"], "splitDetails": {"A": 3000}, "currency": "JPY"}
            ]
        }"#,
    );
    let rates = RateTable::from_quotes(c("USD"), [(c("JPY"), 0.01)]);

    // A: +1000 USD, -3000 JPY (= -3000 cents) → net -2000 cents, paid to B in yen.
    let debts = t.settle(Some(&rates), GroupingMode::SingleLevel).unwrap();
    assert_eq!(debts, vec![debt("A", "B", 2000, "JPY")]);
}

#[test]
fn unconvertible_balances_are_excluded_not_counted() {
    let net: CurrencyBalances = [
        (c("USD"), balances(&[("A", 500), ("B", -500)])),
        (c("GBP"), balances(&[("A", -700), ("C", 700)])),
    ]
    .into_iter()
    .collect();
    let rates = RateTable::new(c("USD"));

    let combined = convert_balances_to_currency(&net, &c("USD"), &rates);
    assert_eq!(combined, balances(&[("A", 500), ("B", -500), ("C", 0)]));

    let debts = simplify_debts_in_currency(
        &net,
        &SettledBy::new(),
        &c("USD"),
        &rates,
        &Preferences::new(),
    );
    assert_eq!(debts, vec![debt("B", "A", 500, "USD")]);
}

#[test]
fn same_snapshot_gives_identical_debts() {
    let json = r#"{
        "currency": "EUR",
        "expenses": [
            {"amount": 1001, "paidBy": "1", "splitMethod": "ratio",
             "involvedMembers": ["2", "3", "4"], "splitDetails": {"2": 1, "3": 1, "4": 1}},
            {"amount": 500, "paidBy": "2", "splitMethod": "even", "involvedMembers": ["1", "3"]}
        ]
    }"#;
    let first = trip(json).settle(None, GroupingMode::SingleLevel).unwrap();
    let second = trip(json).settle(None, GroupingMode::SingleLevel).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}
