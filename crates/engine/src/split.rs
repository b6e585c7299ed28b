//! Split calculator: one expense total into exact per-member integer shares.
//!
//! The result must agree bit for bit with the client-side twin, so the order
//! of `involved` is significant: remainders of an `even` split go to the first
//! members, rounding error of `percentage`/`ratio` is absorbed by the last one.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{MemberId, Money};

/// Per-member share of one expense, in `involved` order.
pub type Shares = IndexMap<MemberId, Money>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Equal parts; the first `total mod n` members pay one extra minor unit.
    Even,
    /// Weights are percentages of the total.
    Percentage,
    /// Weights are the shares themselves, in minor units.
    Amount,
    /// Weights are proportional parts.
    Ratio,
}

/// Splits `total` among `involved` according to `method`.
///
/// Missing weights count as zero. An `amount` split is not checked against
/// `total`; that is the caller's responsibility.
pub fn calculate_split(
    total: Money,
    method: SplitMethod,
    involved: &[MemberId],
    weights: &HashMap<MemberId, f64>,
) -> Shares {
    let weight = |member: &MemberId| weights.get(member).copied().unwrap_or(0.0);

    match method {
        SplitMethod::Even => even(total, involved),
        SplitMethod::Percentage => {
            proportional(total, involved, |member| {
                total.minor() as f64 * weight(member) / 100.0
            })
        }
        SplitMethod::Amount => involved
            .iter()
            .map(|member| (member.clone(), Money::new(weight(member).trunc() as i64)))
            .collect(),
        SplitMethod::Ratio => {
            let total_weight: f64 = involved.iter().map(weight).sum();
            if total_weight == 0.0 {
                return involved
                    .iter()
                    .map(|member| (member.clone(), Money::ZERO))
                    .collect();
            }
            proportional(total, involved, |member| {
                total.minor() as f64 * weight(member) / total_weight
            })
        }
    }
}

fn even(total: Money, involved: &[MemberId]) -> Shares {
    let mut shares = Shares::with_capacity(involved.len());
    if involved.is_empty() {
        return shares;
    }
    let total = total.minor();
    let count = involved.len() as i64;
    let base = total.div_euclid(count);
    let remainder = total - base * count;
    for (i, member) in involved.iter().enumerate() {
        let extra = i64::from((i as i64) < remainder);
        shares.insert(member.clone(), Money::new(base + extra));
    }
    shares
}

/// Rounds every share but the last; the last member takes what is left.
fn proportional(
    total: Money,
    involved: &[MemberId],
    exact_share: impl Fn(&MemberId) -> f64,
) -> Shares {
    let mut shares = Shares::with_capacity(involved.len());
    let mut allocated = Money::ZERO;
    let last = involved.len().saturating_sub(1);
    for (i, member) in involved.iter().enumerate() {
        if i == last {
            shares.insert(member.clone(), total - allocated);
        } else {
            let share = Money::round_half_up(exact_share(member));
            shares.insert(member.clone(), share);
            allocated += share;
        }
    }
    shares
}
