//! Simulated yield reserve.
//!
//! Tracks the principal deposited (`basis`) and the current value of the
//! position. Yield raises the position without touching the basis, so a
//! withdrawal of `amount` principal returns `amount * position / basis`.

use estate_custody::{Amount, ReserveAdapter, ReserveError, Timestamp, DAY};
use serde::{Deserialize, Serialize};

/// Seconds in a (365-day) year, for simple-interest accrual.
pub const YEAR: u64 = 365 * DAY;

const BPS_DENOMINATOR: u128 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedReserve {
    /// Simple annual yield in basis points.
    annual_rate_bps: u32,
    basis: Amount,
    position: Amount,
    /// Time up to which yield has been credited.
    last_accrual: Option<Timestamp>,
}

impl SimulatedReserve {
    pub fn new(annual_rate_bps: u32) -> Self {
        Self {
            annual_rate_bps,
            ..Self::default()
        }
    }

    pub fn annual_rate_bps(&self) -> u32 {
        self.annual_rate_bps
    }

    /// Principal currently deposited.
    pub fn basis(&self) -> Amount {
        self.basis
    }

    pub fn last_accrual(&self) -> Option<Timestamp> {
        self.last_accrual
    }

    /// Add `amount` of yield to the position.
    pub fn credit_yield(&mut self, amount: Amount) {
        self.position = self.position.saturating_add(amount);
    }

    /// Credit simple interest on the basis for the time since the last
    /// accrual. Returns the yield credited.
    ///
    /// The first call only starts the clock. When the interval is too short
    /// to earn a whole unit the clock is left where it was, so short polling
    /// intervals still add up.
    pub fn accrue(&mut self, now: Timestamp) -> Amount {
        let Some(since) = self.last_accrual else {
            self.last_accrual = Some(now);
            return 0;
        };
        let elapsed = now.saturating_sub(since);
        let earned = u128::from(self.basis) * u128::from(self.annual_rate_bps) * u128::from(elapsed)
            / (BPS_DENOMINATOR * u128::from(YEAR));
        let earned = Amount::try_from(earned).unwrap_or(Amount::MAX);

        if earned > 0 || self.basis == 0 {
            self.last_accrual = Some(now);
        }
        if earned > 0 {
            self.credit_yield(earned);
            log::debug!("Reserve accrued {} over {}s", earned, elapsed);
        }
        earned
    }
}

impl ReserveAdapter for SimulatedReserve {
    fn deposit(&mut self, amount: Amount) -> Result<(), ReserveError> {
        self.basis = self
            .basis
            .checked_add(amount)
            .ok_or_else(|| ReserveError::Unavailable("basis overflow".into()))?;
        self.position = self
            .position
            .checked_add(amount)
            .ok_or_else(|| ReserveError::Unavailable("position overflow".into()))?;
        Ok(())
    }

    fn withdraw(&mut self, amount: Amount) -> Result<Amount, ReserveError> {
        if amount > self.basis || self.basis == 0 {
            return Err(ReserveError::InsufficientPosition {
                requested: amount,
                available: self.basis,
            });
        }
        let returned =
            u128::from(amount) * u128::from(self.position) / u128::from(self.basis);
        // position >= returned since amount <= basis
        let returned = returned as Amount;
        self.basis -= amount;
        self.position -= returned;
        Ok(returned)
    }

    fn withdraw_all(&mut self) -> Result<Amount, ReserveError> {
        let all = self.position;
        self.basis = 0;
        self.position = 0;
        Ok(all)
    }

    fn position(&self) -> Amount {
        self.position
    }
}
