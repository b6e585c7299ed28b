//! Trip snapshot: the input the calling layer hands to the engine.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{
    Currency, ResultEngine,
    balances::{CurrencyBalances, Expense, Settlement, compute_net_balances},
    consolidate::{simplify_debts, simplify_debts_in_currency},
    exchange::RateTable,
    grouping::GroupingMode,
    member::{Member, settled_by_map, settlement_preferences},
    simplify::Debt,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Default currency of expenses and settlements without one.
    pub currency: Currency,
    /// When set, all balances are collapsed into this currency before
    /// simplification. `None` settles every currency separately.
    #[serde(default)]
    pub settlement_currency: Option<Currency>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

impl Trip {
    /// Per-currency net balances of every referenced member.
    pub fn net_balances(&self) -> CurrencyBalances {
        compute_net_balances(&self.expenses, &self.settlements, &self.currency)
    }

    /// Settling transactions for the trip.
    ///
    /// Balances are collapsed into the trip's settlement currency when one is
    /// set and `rates` is supplied; otherwise each currency is simplified on
    /// its own. Only [`GroupingMode::Transitive`] can fail, on a grouping
    /// cycle.
    pub fn settle(
        &self,
        rates: Option<&RateTable>,
        grouping: GroupingMode,
    ) -> ResultEngine<Vec<Debt>> {
        let net_balances = self.net_balances();
        let settled_by = grouping.edges(&settled_by_map(&self.members))?;
        let preferences = settlement_preferences(&self.members);

        let debts = match (&self.settlement_currency, rates) {
            (Some(target), Some(rates)) => {
                simplify_debts_in_currency(&net_balances, &settled_by, target, rates, &preferences)
            }
            (Some(target), None) => {
                tracing::debug!(
                    "no rate table supplied: settling per currency instead of in {target}"
                );
                simplify_debts(&net_balances, &settled_by, &preferences, None)
            }
            (None, rates) => simplify_debts(&net_balances, &settled_by, &preferences, rates),
        };
        Ok(debts)
    }

    /// Currencies other than `target` an external rate provider must quote to
    /// settle this trip, in first-use order.
    pub fn currencies_needing_rates(&self, target: &Currency) -> Vec<Currency> {
        let mut needed: IndexSet<Currency> = IndexSet::new();
        let used = self
            .expenses
            .iter()
            .map(|e| e.currency.as_ref())
            .chain(self.settlements.iter().map(|s| s.currency.as_ref()))
            .map(|c| c.unwrap_or(&self.currency))
            .chain(self.members.iter().filter_map(|m| m.settlement_currency.as_ref()));
        for currency in used {
            if currency != target {
                needed.insert(currency.clone());
            }
        }
        needed.into_iter().collect()
    }
}
