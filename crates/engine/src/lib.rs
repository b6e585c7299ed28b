//! Balance-and-settlement engine for multi-member, multi-currency trips.
//!
//! Given a trip's expenses and settlements, the engine computes each member's
//! net balance per currency and derives a small set of settling transactions,
//! optionally collapsed into preferred currencies.
//!
//! Everything here is a pure function of its inputs: no I/O, no shared state.
//! Input order matters (split remainders, greedy tie-breaks) and is preserved
//! end to end with insertion-ordered maps, so the same snapshot always yields
//! the same debts as the client-side twin.
//!
//! ```rust
//! use engine::{GroupingMode, Money, Trip};
//!
//! let trip: Trip = serde_json::from_str(r#"{
//!     "currency": "USD",
//!     "expenses": [{
//!         "amount": 100,
//!         "paidBy": "A",
//!         "splitMethod": "even",
//!         "involvedMembers": ["A", "B", "C"]
//!     }]
//! }"#).unwrap();
//!
//! let debts = trip.settle(None, GroupingMode::SingleLevel).unwrap();
//! assert_eq!(debts.len(), 2);
//! assert_eq!(debts[0].amount, Money::new(33));
//! ```

pub use balances::{CurrencyBalances, Expense, MemberBalances, Settlement, compute_net_balances};
pub use consolidate::{
    Preferences, apply_member_settlement_currencies, consolidate_opposite_debts, simplify_debts,
    simplify_debts_in_currency,
};
pub use currency::Currency;
pub use error::EngineError;
pub use exchange::{RateTable, convert_amount, convert_balances_to_currency, get_conversion_rate};
pub use grouping::{GroupingMode, SettledBy, merge_balances, resolve_chains};
pub use member::{Member, MemberId, MemberUpdate, Patch, settled_by_map, settlement_preferences};
pub use money::Money;
pub use simplify::{Debt, greedy_simplify};
pub use split::{Shares, SplitMethod, calculate_split};
pub use trip::Trip;

mod balances;
mod consolidate;
pub mod currency;
mod error;
mod exchange;
mod grouping;
mod member;
pub mod money;
mod simplify;
mod split;
mod trip;

pub type ResultEngine<T> = Result<T, EngineError>;
