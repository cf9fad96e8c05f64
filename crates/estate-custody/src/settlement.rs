//! Settlement asset interface: moves value between participants and custody.

use crate::types::{Address, Amount};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Insufficient funds at {holder}: have {have}, need {need}")]
    InsufficientFunds {
        holder: Address,
        have: Amount,
        need: Amount,
    },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// The asset custody is denominated in.
pub trait SettlementAsset {
    /// Move `amount` from `from` into custody.
    fn pull(&mut self, from: &Address, amount: Amount) -> Result<(), SettlementError>;

    /// Move `amount` out of custody to `to`.
    fn push(&mut self, to: &Address, amount: Amount) -> Result<(), SettlementError>;
}
