//! Error taxonomy for custody operations.
//!
//! Every variant aborts the call with no state mutation. Registry saturation
//! (duplicate, over-allocation, full table) is not an error; see
//! [`crate::registry::EditOutcome`].

use crate::attestation::AttestationError;
use crate::checkin::ConfigError;
use crate::reserve::ReserveError;
use crate::settlement::SettlementError;
use crate::types::{Address, Amount, State};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Unauthorized caller: {0}")]
    Unauthorized(Address),

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    #[error("Beneficiary changes are blocked in state {0}")]
    AdministrativeChangeBlocked(State),

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Funds are locked after distribution")]
    PostDistributionLock,

    #[error("Payout already completed")]
    PayoutAlreadyCompleted,

    #[error("{operation} is not allowed in state {state}")]
    InvalidState {
        operation: &'static str,
        state: State,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reserve error: {0}")]
    Reserve(#[from] ReserveError),

    #[error("Attestation error: {0}")]
    Attestation(#[from] AttestationError),

    #[error("Settlement error: {0}")]
    Settlement(#[from] SettlementError),

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Inconsistent stored state: {0}")]
    InconsistentState(&'static str),
}
