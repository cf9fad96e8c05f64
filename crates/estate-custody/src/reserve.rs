//! Yield-bearing reserve interface.
//!
//! The reserve holds deposited value and grows it. How yield accrues is the
//! reserve's business; custody only relies on the withdrawal contract:
//!
//! - `withdraw(amount)` returns `amount` plus its proportional share of
//!   accrued yield
//! - `withdraw_all()` returns the entire position

use crate::types::Amount;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReserveError {
    #[error("Reserve unavailable: {0}")]
    Unavailable(String),

    #[error("Insufficient reserve position: requested {requested}, available {available}")]
    InsufficientPosition { requested: Amount, available: Amount },

    #[error("Reserve returned {returned} for a withdrawal of {requested}")]
    Shortfall { requested: Amount, returned: Amount },
}

/// External yield-bearing holding facility.
pub trait ReserveAdapter {
    /// Place `amount` into the reserve.
    fn deposit(&mut self, amount: Amount) -> Result<(), ReserveError>;

    /// Withdraw `amount` of principal, returning it with its accrued yield.
    fn withdraw(&mut self, amount: Amount) -> Result<Amount, ReserveError>;

    /// Liquidate the whole position (principal and all yield).
    fn withdraw_all(&mut self) -> Result<Amount, ReserveError>;

    /// Current value of the position, yield included.
    fn position(&self) -> Amount;
}
