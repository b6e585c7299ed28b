//! The module contains the errors the engine can throw.
//!
//! Business conditions (missing rates, zero weights, unknown currencies in the
//! decimals table) never produce an error: they fall back to a documented
//! value. Errors only come from parsing boundary values and from the opt-in
//! transitive grouping.
//!
//! - [`InvalidCurrency`] thrown when a currency code is not three ASCII letters.
//! - [`InvalidId`] thrown when a member id is empty.
//! - [`InvalidAmount`] thrown when a major-unit amount string cannot be parsed.
//! - [`GroupingCycle`] thrown when `settled_by` edges form a cycle.
//!
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`GroupingCycle`]: EngineError::GroupingCycle
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Grouping cycle through member \"{0}\"")]
    GroupingCycle(String),
}
