//! Beneficiary slot table.
//!
//! Fixed capacity, indexed by slot. `add` claims the first empty slot, so an
//! index freed by `remove` is reused and active order follows slot index
//! rather than insertion time.
//!
//! Two failure categories are kept apart:
//!
//! - malformed input (empty address, percentage outside 1..=100) is an
//!   error and aborts the call
//! - saturation (duplicate address, total above 100%, no free slot, removing
//!   an unknown address) succeeds as [`EditOutcome::Rejected`] and changes
//!   nothing

use crate::error::CustodyError;
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of beneficiary slots.
pub const MAX_BENEFICIARIES: usize = 10;

/// Total allocation that makes a payout fully determined.
pub const FULL_ALLOCATION: u32 = 100;

/// A payout address and its share of the eventual distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub payout_address: Address,
    /// Whole percent, 1..=100 for occupied slots.
    pub percentage: u8,
}

impl Beneficiary {
    /// How an empty slot appears in a full-table snapshot.
    pub const EMPTY: Beneficiary = Beneficiary {
        payout_address: Address::ZERO,
        percentage: 0,
    };
}

/// Result of a registry edit that passed structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOutcome {
    /// The table changed and an event was emitted.
    Applied,
    /// Nothing changed and no event was emitted.
    Rejected(RejectReason),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The address already occupies a slot.
    DuplicateAddress,
    /// The new total would exceed 100%.
    AllocationExceeded,
    /// Every slot is occupied.
    RegistryFull,
    /// No occupied slot holds the address.
    NotFound,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::DuplicateAddress => "address already registered",
            RejectReason::AllocationExceeded => "allocation would exceed 100%",
            RejectReason::RegistryFull => "no free slot",
            RejectReason::NotFound => "address not registered",
        };
        f.write_str(reason)
    }
}

/// Slot table of beneficiaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryRegistry {
    slots: [Option<Beneficiary>; MAX_BENEFICIARIES],
}

impl BeneficiaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the first free slot for `address`.
    pub fn add(&mut self, address: Address, percentage: u8) -> Result<EditOutcome, CustodyError> {
        if address.is_zero() {
            return Err(CustodyError::InvalidAddress);
        }
        if percentage == 0 || u32::from(percentage) > FULL_ALLOCATION {
            return Err(CustodyError::InvalidAmount(u64::from(percentage)));
        }

        if self.position(&address).is_some() {
            return Ok(EditOutcome::Rejected(RejectReason::DuplicateAddress));
        }
        if self.determined_percentage() + u32::from(percentage) > FULL_ALLOCATION {
            return Ok(EditOutcome::Rejected(RejectReason::AllocationExceeded));
        }
        let Some(free) = self.slots.iter().position(Option::is_none) else {
            return Ok(EditOutcome::Rejected(RejectReason::RegistryFull));
        };

        self.slots[free] = Some(Beneficiary {
            payout_address: address,
            percentage,
        });
        Ok(EditOutcome::Applied)
    }

    /// Empty the slot holding `address`, if any.
    pub fn remove(&mut self, address: &Address) -> EditOutcome {
        if address.is_zero() {
            return EditOutcome::Rejected(RejectReason::NotFound);
        }
        match self.position(address) {
            Some(idx) => {
                self.slots[idx] = None;
                EditOutcome::Applied
            }
            None => EditOutcome::Rejected(RejectReason::NotFound),
        }
    }

    /// Slot index currently holding `address`.
    pub fn position(&self, address: &Address) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_some_and(|b| &b.payout_address == address))
    }

    pub fn get(&self, address: &Address) -> Option<&Beneficiary> {
        self.position(address)
            .and_then(|idx| self.slots[idx].as_ref())
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Sum of percentages over occupied slots. Never exceeds 100.
    pub fn determined_percentage(&self) -> u32 {
        self.slots
            .iter()
            .flatten()
            .map(|b| u32::from(b.percentage))
            .sum()
    }

    pub fn is_fully_determined(&self) -> bool {
        self.determined_percentage() == FULL_ALLOCATION
    }

    /// The whole table, empty slots included as [`Beneficiary::EMPTY`].
    pub fn snapshot(&self) -> [Beneficiary; MAX_BENEFICIARIES] {
        self.slots.map(|slot| slot.unwrap_or(Beneficiary::EMPTY))
    }

    /// Occupied slots in slot-index order.
    pub fn active(&self) -> Vec<Beneficiary> {
        self.iter_active().copied().collect()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Beneficiary> {
        self.slots.iter().flatten()
    }

    /// Check a table that did not come through [`BeneficiaryRegistry::add`].
    pub fn validate(&self) -> Result<(), CustodyError> {
        let mut total = 0u32;
        for (idx, b) in self.iter_active().enumerate() {
            if b.payout_address.is_zero() {
                return Err(CustodyError::InconsistentState("beneficiary with empty address"));
            }
            if b.percentage == 0 || u32::from(b.percentage) > FULL_ALLOCATION {
                return Err(CustodyError::InconsistentState("beneficiary percentage out of range"));
            }
            if self
                .iter_active()
                .skip(idx + 1)
                .any(|other| other.payout_address == b.payout_address)
            {
                return Err(CustodyError::InconsistentState("duplicate beneficiary"));
            }
            total += u32::from(b.percentage);
        }
        if total > FULL_ALLOCATION {
            return Err(CustodyError::InconsistentState("allocation exceeds 100%"));
        }
        Ok(())
    }
}
