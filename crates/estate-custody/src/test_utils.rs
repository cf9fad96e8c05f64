//! Shared test utilities for estate-custody tests.
//!
//! Deterministic addresses and minimal in-memory collaborators.

use std::collections::HashMap;

use crate::attestation::{Attestation, AttestationError, DeathAttestationAdapter};
use crate::checkin::CustodyConfig;
use crate::custody::Custody;
use crate::reserve::{ReserveAdapter, ReserveError};
use crate::settlement::{SettlementAsset, SettlementError};
use crate::types::{Address, Amount, Timestamp, ADDRESS_LEN};

/// Deterministic address from a seed byte.
///
/// The bytes are `[0x01, 0x00, ..., 0x00, seed]`, never the zero sentinel.
pub fn test_address(seed: u8) -> Address {
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes[0] = 0x01;
    bytes[ADDRESS_LEN - 1] = seed;
    Address::new(bytes)
}

pub fn owner() -> Address {
    test_address(1)
}

pub fn notary() -> Address {
    test_address(2)
}

pub fn stranger() -> Address {
    test_address(3)
}

/// Reserve whose yield is credited by hand.
#[derive(Debug, Clone, Default)]
pub struct MockReserve {
    pub basis: Amount,
    pub position: Amount,
    pub fail: bool,
}

impl MockReserve {
    pub fn credit_yield(&mut self, amount: Amount) {
        self.position += amount;
    }
}

impl ReserveAdapter for MockReserve {
    fn deposit(&mut self, amount: Amount) -> Result<(), ReserveError> {
        if self.fail {
            return Err(ReserveError::Unavailable("mock failure".into()));
        }
        self.basis += amount;
        self.position += amount;
        Ok(())
    }

    fn withdraw(&mut self, amount: Amount) -> Result<Amount, ReserveError> {
        if self.fail {
            return Err(ReserveError::Unavailable("mock failure".into()));
        }
        let returned = (u128::from(amount) * u128::from(self.position) / u128::from(self.basis)) as Amount;
        self.basis -= amount;
        self.position -= returned;
        Ok(returned)
    }

    fn withdraw_all(&mut self) -> Result<Amount, ReserveError> {
        if self.fail {
            return Err(ReserveError::Unavailable("mock failure".into()));
        }
        let all = self.position;
        self.basis = 0;
        self.position = 0;
        Ok(all)
    }

    fn position(&self) -> Amount {
        self.position
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    pub records: HashMap<Address, Attestation>,
}

impl DeathAttestationAdapter for MockOracle {
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

/// Token with plain per-address balances.
#[derive(Debug, Clone, Default)]
pub struct MockToken {
    pub balances: HashMap<Address, Amount>,
    /// Reject pushes to this address.
    pub blocked: Option<Address>,
}

impl MockToken {
    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }
}

impl SettlementAsset for MockToken {
    fn pull(&mut self, from: &Address, amount: Amount) -> Result<(), SettlementError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(SettlementError::InsufficientFunds {
                holder: *from,
                have,
                need: amount,
            });
        }
        self.balances.insert(*from, have - amount);
        Ok(())
    }

    fn push(&mut self, to: &Address, amount: Amount) -> Result<(), SettlementError> {
        if self.blocked == Some(*to) {
            return Err(SettlementError::Rejected(format!("{} is blocked", to)));
        }
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

pub type TestCustody = Custody<MockReserve, MockOracle, MockToken>;

/// Fresh instance created at time 0 with default periods; the owner holds
/// `owner_funds` of the settlement asset.
pub fn make_test_custody(owner_funds: Amount) -> TestCustody {
    let mut token = MockToken::default();
    token.balances.insert(owner(), owner_funds);
    Custody::new(
        owner(),
        notary(),
        CustodyConfig::default(),
        0,
        MockReserve::default(),
        MockOracle::default(),
        token,
    )
    .unwrap()
}
