//! The two fixed identities of an estate and the guards built on them.

use crate::error::CustodyError;
use crate::types::{Address, Invocation};
use serde::{Deserialize, Serialize};

/// Owner and notary, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    notary: Address,
}

impl AccessControl {
    /// Neither identity may be the empty sentinel.
    pub fn new(owner: Address, notary: Address) -> Result<Self, CustodyError> {
        if owner.is_zero() || notary.is_zero() {
            return Err(CustodyError::InvalidAddress);
        }
        Ok(Self { owner, notary })
    }

    /// Re-check a deserialized value, which bypasses [`AccessControl::new`].
    pub fn validate(&self) -> Result<(), CustodyError> {
        Self::new(self.owner, self.notary).map(|_| ())
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn notary(&self) -> Address {
        self.notary
    }

    pub fn require_owner(&self, call: &Invocation) -> Result<(), CustodyError> {
        if call.caller != self.owner {
            return Err(CustodyError::Unauthorized(call.caller));
        }
        Ok(())
    }

    pub fn require_notary(&self, call: &Invocation) -> Result<(), CustodyError> {
        if call.caller != self.notary {
            return Err(CustodyError::Unauthorized(call.caller));
        }
        Ok(())
    }
}
