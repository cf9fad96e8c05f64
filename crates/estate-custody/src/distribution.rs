//! Pro-rata payout planning.
//!
//! Pure integer arithmetic over the liquidated total:
//!
//! 1. each occupied slot, in slot order, receives `total * pct / 100`
//! 2. if the registry is below 100%, the notary receives
//!    `total * (100 - determined) / 100`
//!
//! Every share truncates toward zero. The truncation dust is not
//! redistributed; it stays in custody.

use crate::error::CustodyError;
use crate::registry::{BeneficiaryRegistry, FULL_ALLOCATION};
use crate::types::{Address, Amount};
use serde::{Deserialize, Serialize};

/// A single transfer out of custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: Address,
    pub amount: Amount,
}

/// Transfers computed for one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutPlan {
    /// Value liquidated for distribution.
    pub total: Amount,
    /// Beneficiary shares in slot order.
    pub shares: Vec<Payout>,
    /// Notary's share of the undetermined percentage, if any.
    pub remainder: Option<Payout>,
}

impl PayoutPlan {
    /// All transfers in execution order.
    pub fn payouts(&self) -> impl Iterator<Item = &Payout> {
        self.shares.iter().chain(self.remainder.iter())
    }

    /// Sum of all transfers.
    pub fn distributed(&self) -> Amount {
        self.payouts().map(|p| p.amount).sum()
    }

    /// Truncation dust left behind.
    pub fn dust(&self) -> Amount {
        self.total.saturating_sub(self.distributed())
    }
}

/// `total * percentage / 100`, truncated.
pub fn share_of(total: Amount, percentage: u32) -> Result<Amount, CustodyError> {
    let share = u128::from(total) * u128::from(percentage) / u128::from(FULL_ALLOCATION);
    Amount::try_from(share).map_err(|_| CustodyError::ArithmeticOverflow)
}

/// Compute the transfers for distributing `total`.
pub fn plan_payouts(
    total: Amount,
    registry: &BeneficiaryRegistry,
    notary: Address,
) -> Result<PayoutPlan, CustodyError> {
    let shares = registry
        .iter_active()
        .map(|b| {
            Ok(Payout {
                recipient: b.payout_address,
                amount: share_of(total, u32::from(b.percentage))?,
            })
        })
        .collect::<Result<Vec<_>, CustodyError>>()?;

    let determined = registry.determined_percentage();
    let remainder = if determined < FULL_ALLOCATION {
        Some(Payout {
            recipient: notary,
            amount: share_of(total, FULL_ALLOCATION - determined)?,
        })
    } else {
        None
    };

    Ok(PayoutPlan {
        total,
        shares,
        remainder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_address;

    #[test]
    fn test_even_split() {
        let mut registry = BeneficiaryRegistry::new();
        registry.add(test_address(10), 50).unwrap();
        registry.add(test_address(11), 50).unwrap();

        let plan = plan_payouts(1_100, &registry, test_address(2)).unwrap();
        assert_eq!(plan.shares.len(), 2);
        assert_eq!(plan.shares[0].amount, 550);
        assert_eq!(plan.shares[1].amount, 550);
        assert!(plan.remainder.is_none());
        assert_eq!(plan.dust(), 0);
    }

    #[test]
    fn test_remainder_goes_to_notary() {
        let notary = test_address(2);
        let mut registry = BeneficiaryRegistry::new();
        registry.add(test_address(10), 25).unwrap();
        registry.add(test_address(11), 15).unwrap();

        let plan = plan_payouts(1_000, &registry, notary).unwrap();
        assert_eq!(plan.shares[0].amount, 250);
        assert_eq!(plan.shares[1].amount, 150);
        assert_eq!(
            plan.remainder,
            Some(Payout {
                recipient: notary,
                amount: 600
            })
        );
        assert_eq!(plan.payouts().count(), 3);
        assert_eq!(plan.distributed(), 1_000);
    }

    #[test]
    fn test_empty_registry_pays_notary_everything() {
        let notary = test_address(2);
        let plan = plan_payouts(777, &BeneficiaryRegistry::new(), notary).unwrap();
        assert!(plan.shares.is_empty());
        assert_eq!(plan.remainder.unwrap().amount, 777);
    }

    #[test]
    fn test_truncation_dust_is_not_redistributed() {
        let mut registry = BeneficiaryRegistry::new();
        registry.add(test_address(10), 33).unwrap();
        registry.add(test_address(11), 33).unwrap();
        registry.add(test_address(12), 34).unwrap();

        // 101 * 33 / 100 = 33 (x2), 101 * 34 / 100 = 34
        let plan = plan_payouts(101, &registry, test_address(2)).unwrap();
        let amounts: Vec<Amount> = plan.shares.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![33, 33, 34]);
        assert_eq!(plan.distributed(), 100);
        assert_eq!(plan.dust(), 1);
    }

    #[test]
    fn test_share_of_large_total() {
        // intermediate product exceeds u64 but the share fits
        assert_eq!(share_of(Amount::MAX, 100).unwrap(), Amount::MAX);
        assert_eq!(share_of(Amount::MAX, 50).unwrap(), Amount::MAX / 2);
        assert_eq!(share_of(0, 50).unwrap(), 0);
    }
}
