//! Estate Custody
//!
//! Inactivity-triggered custody of one owner's estate, with a one-time
//! pro-rata payout to a fixed set of beneficiaries.
//!
//! # Concepts
//!
//! - **Owner**: deposits, withdraws, checks in, edits beneficiaries
//! - **Notary**: uploads the death attestation; receives any unallocated share
//! - **Check-in**: resets the inactivity clock
//! - **Reserve**: yield-bearing venue holding deposited value; only the
//!   principal is tracked, the yield is swept into the distribution
//!
//! # Lifecycle
//!
//! ```text
//! ACTIVE --(no check-in past period)--> WARNING --(grace expired)--> VERIFICATION
//!    ^                                     |                              |
//!    +------------- check-in --------------+              (attested deceased)
//!                                                                         v
//!                                                                   DISTRIBUTION
//! ```
//!
//! Transitions happen lazily, when `evaluate()` runs. Entering DISTRIBUTION
//! pays out in the same call; afterwards the instance is locked.
//!
//! # Example
//!
//! ```ignore
//! use estate_custody::{Custody, CustodyConfig, Invocation};
//!
//! let mut estate = Custody::new(owner, notary, CustodyConfig::default(), now,
//!                               reserve, oracle, token)?;
//! estate.deposit(&Invocation::new(owner, now), 1_000)?;
//! estate.add_beneficiary(&Invocation::new(owner, now), heir, 50)?;
//!
//! // later, from anyone
//! let receipt = estate.evaluate(&Invocation::new(keeper, later))?;
//! println!("now {}", receipt.outcome);
//! ```

pub mod access;
pub mod attestation;
pub mod checkin;
pub mod custody;
pub mod distribution;
pub mod error;
pub mod events;
pub mod ledger;
pub mod registry;
pub mod reserve;
pub mod settlement;
pub mod status;
pub mod transition;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use attestation::{Attestation, AttestationError, DeathAttestationAdapter};
pub use checkin::{ConfigError, CustodyConfig};
pub use custody::{Custody, CustodyState, Receipt};
pub use distribution::{Payout, PayoutPlan};
pub use error::CustodyError;
pub use events::CustodyEvent;
pub use registry::{Beneficiary, EditOutcome, RejectReason, MAX_BENEFICIARIES};
pub use reserve::{ReserveAdapter, ReserveError};
pub use settlement::{SettlementAsset, SettlementError};
pub use status::LivenessStatus;
pub use types::{Address, Amount, Invocation, State, Timestamp, DAY};
