//! Simulated settlement token.
//!
//! Plain per-address balances plus the amount held in custody. Pulls and
//! pushes conserve supply.

use estate_custody::{Address, Amount, SettlementAsset, SettlementError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedToken {
    balances: BTreeMap<Address, Amount>,
    /// Value currently inside custody.
    custody: Amount,
}

impl SimulatedToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` out of thin air for `holder`.
    pub fn mint(&mut self, holder: Address, amount: Amount) {
        let balance = self.balances.entry(holder).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn custody_balance(&self) -> Amount {
        self.custody
    }

    /// Sum of all participant balances.
    pub fn circulating(&self) -> Amount {
        self.balances.values().sum()
    }
}

impl SettlementAsset for SimulatedToken {
    fn pull(&mut self, from: &Address, amount: Amount) -> Result<(), SettlementError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(SettlementError::InsufficientFunds {
                holder: *from,
                have,
                need: amount,
            });
        }
        let custody = self
            .custody
            .checked_add(amount)
            .ok_or_else(|| SettlementError::Rejected("custody balance overflow".into()))?;
        self.balances.insert(*from, have - amount);
        self.custody = custody;
        Ok(())
    }

    /// Custody's own balance is not checked here: value pushed out may have
    /// come back from the reserve with yield that was never pulled in.
    fn push(&mut self, to: &Address, amount: Amount) -> Result<(), SettlementError> {
        if to.is_zero() {
            return Err(SettlementError::Rejected("transfer to zero address".into()));
        }
        self.custody = self.custody.saturating_sub(amount);
        self.mint(*to, amount);
        Ok(())
    }
}
