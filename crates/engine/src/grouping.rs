//! Grouping resolver: folds grouped members into the member settling for them.
//!
//! The default resolution is a single pass over the edges, one level deep: if
//! `A` is settled by `B` and `B` by `C`, where `A`'s balance ends up depends on
//! edge order. [`GroupingMode::Transitive`] follows every chain to its root
//! first and rejects cycles; it is opt-in.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{EngineError, MemberId, Money, ResultEngine, balances::MemberBalances};

/// Member → payer edges, processed in order.
pub type SettledBy = IndexMap<MemberId, MemberId>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// One pass over the edges, exactly as the client-side twin does it.
    #[default]
    SingleLevel,
    /// Every member is folded into the root of its chain.
    Transitive,
}

impl GroupingMode {
    /// Returns the edges to fold with under this mode.
    pub fn edges(self, settled_by: &SettledBy) -> ResultEngine<SettledBy> {
        match self {
            GroupingMode::SingleLevel => Ok(settled_by.clone()),
            GroupingMode::Transitive => resolve_chains(settled_by),
        }
    }
}

/// Folds each grouped member's balance into its payer's balance.
///
/// Members without a balance entry are skipped; a payer without one is created
/// at zero at the end of the map. The folded member's entry is removed and
/// the remaining entries keep their relative order. The fold is literal: a
/// member settled by itself has its entry removed.
pub fn merge_balances(balances: &MemberBalances, settled_by: &SettledBy) -> MemberBalances {
    let mut merged = balances.clone();
    for (member, payer) in settled_by {
        let Some(&balance) = merged.get(member) else {
            continue;
        };
        *merged.entry(payer.clone()).or_insert(Money::ZERO) += balance;
        merged.shift_remove(member);
        tracing::trace!("folded {member} ({balance}) into {payer}");
    }
    merged
}

/// Rewrites every edge to point at the root of its chain. Self-edges are
/// dropped.
///
/// Fails with [`EngineError::GroupingCycle`] when following the edges from a
/// member comes back to a member already visited on that walk.
pub fn resolve_chains(settled_by: &SettledBy) -> ResultEngine<SettledBy> {
    let mut resolved = SettledBy::with_capacity(settled_by.len());
    for (member, payer) in settled_by {
        if member == payer {
            continue;
        }
        let mut visited = HashSet::from([member]);
        let mut root = payer;
        while let Some(next) = settled_by.get(root) {
            if next == root {
                break;
            }
            if !visited.insert(root) {
                return Err(EngineError::GroupingCycle(member.to_string()));
            }
            root = next;
        }
        if root == member {
            return Err(EngineError::GroupingCycle(member.to_string()));
        }
        resolved.insert(member.clone(), root.clone());
    }
    Ok(resolved)
}
