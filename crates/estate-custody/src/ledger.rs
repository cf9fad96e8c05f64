//! Principal accounting.
//!
//! `principal` is a cost basis: deposits minus withdrawals. It is not the
//! value actually held, which also includes yield the reserve has accrued
//! and surplus retained in custody from earlier withdrawals.

use crate::error::CustodyError;
use crate::types::Amount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsLedger {
    principal: Amount,
}

impl FundsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> Amount {
        self.principal
    }

    pub fn credit(&mut self, amount: Amount) -> Result<(), CustodyError> {
        self.principal = self
            .principal
            .checked_add(amount)
            .ok_or(CustodyError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, amount: Amount) -> Result<(), CustodyError> {
        self.principal = self
            .principal
            .checked_sub(amount)
            .ok_or(CustodyError::InsufficientBalance {
                requested: amount,
                available: self.principal,
            })?;
        Ok(())
    }

    /// Zeroed by distribution.
    pub fn clear(&mut self) {
        self.principal = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_debit() {
        let mut ledger = FundsLedger::new();
        ledger.credit(1_000).unwrap();
        ledger.debit(400).unwrap();
        assert_eq!(ledger.balance(), 600);

        assert_eq!(
            ledger.debit(601),
            Err(CustodyError::InsufficientBalance {
                requested: 601,
                available: 600
            })
        );
        assert_eq!(ledger.balance(), 600);

        ledger.clear();
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_credit_overflow() {
        let mut ledger = FundsLedger::new();
        ledger.credit(Amount::MAX).unwrap();
        assert_eq!(ledger.credit(1), Err(CustodyError::ArithmeticOverflow));
        assert_eq!(ledger.balance(), Amount::MAX);
    }
}
