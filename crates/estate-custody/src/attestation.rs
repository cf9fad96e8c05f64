//! Death-attestation oracle interface.
//!
//! The oracle owns verification of the underlying evidence. Custody writes
//! through it on behalf of the notary and reads a single boolean back.

use crate::types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttestationError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("No attestation recorded for {0}")]
    NotRecorded(Address),
}

/// A recorded attestation about one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub deceased: bool,
    /// Supporting evidence as submitted. May be empty.
    pub proof: Vec<u8>,
    pub recorded_at: Timestamp,
}

/// External oracle holding `owner -> attestation` facts.
pub trait DeathAttestationAdapter {
    /// Whether the owner is attested deceased. Unknown owners are not.
    fn is_deceased(&self, owner: &Address) -> Result<bool, AttestationError>;

    /// Proof bytes of the latest attestation for `owner`.
    fn get_proof(&self, owner: &Address) -> Result<Vec<u8>, AttestationError>;

    /// Record an attestation. Later records replace earlier ones.
    fn record(
        &mut self,
        owner: Address,
        deceased: bool,
        proof: Vec<u8>,
        recorded_at: Timestamp,
    ) -> Result<(), AttestationError>;
}
