//! In-memory death attestation oracle.

use estate_custody::{Address, Attestation, AttestationError, DeathAttestationAdapter, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// SHA-256 of a proof, hex encoded. Used to refer to evidence in logs
/// without printing it.
pub fn proof_digest(proof: &[u8]) -> String {
    hex::encode(Sha256::digest(proof))
}

/// Latest attestation per owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationBook {
    records: BTreeMap<Address, Attestation>,
}

impl AttestationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: &Address) -> Option<&Attestation> {
        self.records.get(owner)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DeathAttestationAdapter for AttestationBook {
    fn is_deceased(&self, owner: &Address) -> Result<bool, AttestationError> {
        Ok(self.records.get(owner).is_some_and(|a| a.deceased))
    }

    fn get_proof(&self, owner: &Address) -> Result<Vec<u8>, AttestationError> {
        self.records
            .get(owner)
            .map(|a| a.proof.clone())
            .ok_or(AttestationError::NotRecorded(*owner))
    }

    fn record(
        &mut self,
        owner: Address,
        deceased: bool,
        proof: Vec<u8>,
        recorded_at: Timestamp,
    ) -> Result<(), AttestationError> {
        log::info!(
            "Oracle: {} attested deceased={} at {} (proof sha256 {})",
            owner,
            deceased,
            recorded_at,
            proof_digest(&proof)
        );
        self.records.insert(
            owner,
            Attestation {
                deceased,
                proof,
                recorded_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x01;
        bytes[19] = seed;
        Address::new(bytes)
    }

    #[test]
    fn test_unknown_owner_is_not_deceased() {
        let book = AttestationBook::new();
        assert!(!book.is_deceased(&addr(1)).unwrap());
        assert_eq!(
            book.get_proof(&addr(1)),
            Err(AttestationError::NotRecorded(addr(1)))
        );
    }

    #[test]
    fn test_latest_record_wins() {
        let mut book = AttestationBook::new();
        book.record(addr(1), true, b"first".to_vec(), 10).unwrap();
        book.record(addr(1), false, b"retraction".to_vec(), 20).unwrap();

        assert!(!book.is_deceased(&addr(1)).unwrap());
        assert_eq!(book.get_proof(&addr(1)).unwrap(), b"retraction".to_vec());
        assert_eq!(book.get(&addr(1)).unwrap().recorded_at, 20);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_proof_digest() {
        assert_eq!(
            proof_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(proof_digest(b"abc").len(), 64);
    }

    #[test]
    fn test_book_serde() {
        let mut book = AttestationBook::new();
        book.record(addr(1), true, vec![1, 2, 3], 5).unwrap();
        let json = serde_json::to_string(&book).unwrap();
        let restored: AttestationBook = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, book);
    }
}
