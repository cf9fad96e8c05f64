//! Events emitted by custody operations.
//!
//! Events are committed only when the call that produced them succeeds.

use crate::types::{Address, Amount, State, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustodyEvent {
    /// Owner value entered custody and was placed in the reserve.
    Deposited { amount: Amount },

    /// Principal returned to the owner.
    Withdrawn { amount: Amount },

    /// Owner confirmed liveness.
    CheckedIn { at: Timestamp },

    /// Lifecycle transition.
    StateChanged { from: State, to: State },

    BeneficiaryAdded { address: Address, percentage: u8 },

    BeneficiaryRemoved { address: Address },

    /// Distribution transfer to a beneficiary or the notary.
    PayoutMade { amount: Amount, recipient: Address },
}

impl CustodyEvent {
    /// Payout amount and recipient, if this is a payout.
    pub fn payout(&self) -> Option<(Amount, Address)> {
        match self {
            CustodyEvent::PayoutMade { amount, recipient } => Some((*amount, *recipient)),
            _ => None,
        }
    }

    pub fn is_payout(&self) -> bool {
        self.payout().is_some()
    }
}

impl fmt::Display for CustodyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustodyEvent::Deposited { amount } => write!(f, "Deposited({})", amount),
            CustodyEvent::Withdrawn { amount } => write!(f, "Withdrawn({})", amount),
            CustodyEvent::CheckedIn { at } => write!(f, "CheckedIn(at {})", at),
            CustodyEvent::StateChanged { from, to } => write!(f, "StateChanged({} -> {})", from, to),
            CustodyEvent::BeneficiaryAdded {
                address,
                percentage,
            } => write!(f, "BeneficiaryAdded({}, {}%)", address, percentage),
            CustodyEvent::BeneficiaryRemoved { address } => {
                write!(f, "BeneficiaryRemoved({})", address)
            }
            CustodyEvent::PayoutMade { amount, recipient } => {
                write!(f, "PayoutMade({}, {})", amount, recipient)
            }
        }
    }
}
