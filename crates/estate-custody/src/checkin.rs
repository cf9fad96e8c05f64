//! Check-in timing.
//!
//! Liveness is a single timestamp. Two cumulative thresholds are measured
//! from it:
//!
//! ```text
//! |--- ACTIVE ---|--- WARNING ---|--- VERIFICATION ...
//! last           +check_in       +check_in+grace
//! ```
//!
//! A threshold is crossed only when elapsed time is strictly greater than it.

use crate::types::{Timestamp, DAY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Days without a check-in before the estate enters WARNING.
pub const DEFAULT_CHECK_IN_PERIOD_DAYS: u64 = 90;

/// Further days of grace before the estate enters VERIFICATION.
pub const DEFAULT_GRACE_PERIOD_DAYS: u64 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

/// Timing thresholds, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyConfig {
    /// Silence tolerated before WARNING.
    pub check_in_period: u64,
    /// Additional silence tolerated before VERIFICATION.
    pub grace_period: u64,
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self::from_days(DEFAULT_CHECK_IN_PERIOD_DAYS, DEFAULT_GRACE_PERIOD_DAYS)
    }
}

impl CustodyConfig {
    pub fn from_days(check_in_days: u64, grace_days: u64) -> Self {
        Self {
            check_in_period: check_in_days.saturating_mul(DAY),
            grace_period: grace_days.saturating_mul(DAY),
        }
    }

    /// Both periods must be positive and their sum representable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_in_period == 0 {
            return Err(ConfigError::InvalidPeriod(
                "check_in_period must be positive".into(),
            ));
        }
        if self.grace_period == 0 {
            return Err(ConfigError::InvalidPeriod(
                "grace_period must be positive".into(),
            ));
        }
        if self.check_in_period.checked_add(self.grace_period).is_none() {
            return Err(ConfigError::InvalidPeriod(
                "check_in_period + grace_period overflows".into(),
            ));
        }
        Ok(())
    }

    /// Elapsed seconds beyond which WARNING applies.
    pub fn warning_threshold(&self) -> u64 {
        self.check_in_period
    }

    /// Elapsed seconds beyond which VERIFICATION applies.
    pub fn verification_threshold(&self) -> u64 {
        self.check_in_period.saturating_add(self.grace_period)
    }
}

/// Last liveness confirmation from the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInTimer {
    last_check_in: Timestamp,
}

impl CheckInTimer {
    /// Starts the clock at creation time.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            last_check_in: created_at,
        }
    }

    pub fn last_check_in(&self) -> Timestamp {
        self.last_check_in
    }

    /// Record a check-in. The timestamp never moves backwards.
    pub fn record(&mut self, now: Timestamp) {
        self.last_check_in = self.last_check_in.max(now);
    }

    /// Seconds since the last check-in (zero if `now` precedes it).
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.last_check_in)
    }

    /// Seconds left before `threshold` is crossed, zero once it has been.
    ///
    /// Crossing is strict (`elapsed > threshold`), so at exactly
    /// `threshold` one second remains.
    pub fn remaining(&self, now: Timestamp, threshold: u64) -> u64 {
        threshold
            .saturating_add(1)
            .saturating_sub(self.elapsed(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_periods() {
        let config = CustodyConfig::default();
        assert_eq!(config.check_in_period, 90 * DAY);
        assert_eq!(config.grace_period, 30 * DAY);
        assert_eq!(config.verification_threshold(), 120 * DAY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad1 = CustodyConfig {
            check_in_period: 0,
            grace_period: DAY,
        };
        assert!(bad1.validate().is_err());

        let bad2 = CustodyConfig {
            check_in_period: DAY,
            grace_period: 0,
        };
        assert!(bad2.validate().is_err());

        let bad3 = CustodyConfig {
            check_in_period: u64::MAX,
            grace_period: 1,
        };
        assert!(bad3.validate().is_err());
    }

    #[test]
    fn test_elapsed_and_remaining() {
        let timer = CheckInTimer::new(1_000);
        assert_eq!(timer.elapsed(1_000), 0);
        assert_eq!(timer.elapsed(1_500), 500);
        // clock reading before the last check-in
        assert_eq!(timer.elapsed(900), 0);

        assert_eq!(timer.remaining(1_500, 2_000), 1_501);
        assert_eq!(timer.remaining(5_000, 2_000), 0);
    }

    #[test]
    fn test_remaining_matches_strict_crossing() {
        let timer = CheckInTimer::new(0);
        let threshold = 90 * DAY;
        // not crossed at exactly the threshold
        assert_eq!(timer.remaining(threshold, threshold), 1);
        assert_eq!(timer.remaining(threshold + 1, threshold), 0);
        assert_eq!(timer.remaining(threshold + 2, threshold), 0);
        assert_eq!(timer.remaining(u64::MAX, u64::MAX), 1);
    }

    #[test]
    fn test_record_only_moves_forward() {
        let mut timer = CheckInTimer::new(1_000);
        timer.record(2_000);
        assert_eq!(timer.last_check_in(), 2_000);

        timer.record(1_500);
        assert_eq!(timer.last_check_in(), 2_000);
    }
}
